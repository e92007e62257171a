//! Embedded viewer page
//!
//! A single HTML document that opens `/ws`, appends every `text` message to a
//! `<pre>` and turns ANSI SGR escapes (colors, bold, underline, reset) into
//! styled spans.

use axum::response::Html;

/// Viewer page markup
pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>teecast</title>
<style>
body { margin: 0; background: #1d1f21; color: #c5c8c6; }
#content { margin: 0; padding: 8px; font: 13px/1.4 monospace; white-space: pre-wrap; }
.bold { font-weight: bold; }
.italic { font-style: italic; }
.underline { text-decoration: underline; }
.fg-30 { color: #1d1f21; } .fg-31 { color: #cc6666; } .fg-32 { color: #b5bd68; }
.fg-33 { color: #f0c674; } .fg-34 { color: #81a2be; } .fg-35 { color: #b294bb; }
.fg-36 { color: #8abeb7; } .fg-37 { color: #ffffff; }
.bg-40 { background: #1d1f21; } .bg-41 { background: #cc6666; } .bg-42 { background: #b5bd68; }
.bg-43 { background: #f0c674; } .bg-44 { background: #81a2be; } .bg-45 { background: #b294bb; }
.bg-46 { background: #8abeb7; } .bg-47 { background: #ffffff; }
</style>
</head>
<body><pre id="content"></pre></body>
<script>
var content = document.getElementById('content');
var current = content;
var pending = '';
var SGR = /\x1b\[([0-9;]*)m/g;

function style(codes) {
  var classes = [];
  codes.forEach(function (code) {
    var n = parseInt(code || '0', 10);
    if (n === 1) classes.push('bold');
    else if (n === 3) classes.push('italic');
    else if (n === 4) classes.push('underline');
    else if (n >= 30 && n <= 37) classes.push('fg-' + n);
    else if (n >= 40 && n <= 47) classes.push('bg-' + n);
    else if (n >= 90 && n <= 97) classes.push('fg-' + (n - 60), 'bold');
  });
  return classes;
}

function push(text) {
  text = pending + text;
  pending = '';
  // Hold back an escape sequence cut off at the end of this message
  var cut = text.lastIndexOf('\x1b');
  if (cut !== -1 && !/^\x1b\[[0-9;]*m/.test(text.slice(cut)) && /^\x1b(\[[0-9;]*)?$/.test(text.slice(cut))) {
    pending = text.slice(cut);
    text = text.slice(0, cut);
  }
  var last = 0, match;
  SGR.lastIndex = 0;
  while ((match = SGR.exec(text)) !== null) {
    current.appendChild(document.createTextNode(text.slice(last, match.index)));
    var codes = match[1].split(';');
    if (codes.some(function (c) { return c === '' || c === '0'; })) {
      current = content;
    }
    var classes = style(codes);
    if (classes.length > 0) {
      var span = document.createElement('span');
      classes.forEach(function (c) { span.classList.add(c); });
      current.appendChild(span);
      current = span;
    }
    last = SGR.lastIndex;
  }
  current.appendChild(document.createTextNode(text.slice(last)));
  window.scrollTo(0, document.body.scrollHeight);
}

var conn = new WebSocket((location.protocol === 'https:' ? 'wss://' : 'ws://') + location.host + '/ws');
conn.onmessage = function (e) {
  var message = JSON.parse(e.data);
  if (message.type === 'text') {
    push(message.data);
  } else if (message.type === 'end') {
    document.title = 'teecast (ended)';
  } else {
    console.log(message);
  }
};
</script>
</html>
"#;

/// Handler for `GET /`
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

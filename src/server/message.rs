//! Viewer wire messages
//!
//! Every WebSocket text frame sent to a viewer is a JSON object with a `type`
//! discriminator:
//!
//! ```text
//! {"type":"text","data":"..."}   output from the input stream
//! {"type":"end"}                 input finished, no more text will follow
//! ```

use serde::Serialize;

/// Message sent to a viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ViewerMessage {
    /// A piece of the input stream
    Text {
        /// Decoded text
        data: String,
    },
    /// End of the input stream
    End,
}

impl ViewerMessage {
    /// Create a text message
    pub fn text(data: impl Into<String>) -> Self {
        ViewerMessage::Text { data: data.into() }
    }

    /// Serialize to the JSON wire form
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Incremental UTF-8 decoder
///
/// Chunk boundaries fall wherever the input read happened to stop, which can
/// be in the middle of a multi-byte character. The decoder holds back an
/// incomplete trailing sequence until the next chunk completes it. Invalid
/// bytes are replaced with U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk, prefixed by any bytes held back last time
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        let input = if self.pending.is_empty() {
            bytes.to_vec()
        } else {
            let mut joined = std::mem::take(&mut self.pending);
            joined.extend_from_slice(bytes);
            joined
        };

        let mut out = String::with_capacity(input.len());
        let mut rest = input.as_slice();

        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&rest[..valid]));

                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &rest[valid + len..];
                        }
                        None => {
                            // Truncated sequence at the end: wait for more
                            self.pending = rest[valid..].to_vec();
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush held-back bytes at end of stream
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            char::REPLACEMENT_CHARACTER.to_string()
        }
    }

    /// Number of bytes held back
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

//! End-to-end tests: tee -> viewer server -> WebSocket client over TCP

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use teecast::{Tee, ViewerServer};

const WAIT: Duration = Duration::from_secs(5);

const OP_CONTINUATION: u8 = 0x0;
const OP_TEXT: u8 = 0x1;
const OP_CLOSE: u8 = 0x8;

async fn start_server(tee: &Arc<Tee>) -> SocketAddr {
    let server = ViewerServer::bind("127.0.0.1:0".parse().unwrap(), Arc::clone(tee))
        .await
        .unwrap();
    let addr = server.local_addr();

    tokio::spawn(server.run_until(std::future::pending()));

    addr
}

async fn wait_until(mut cond: impl FnMut() -> bool) {
    timeout(WAIT, async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

/// Read an HTTP response head, returning it as text
async fn read_head(stream: &mut TcpStream) -> String {
    let mut head = Vec::new();
    while !head.ends_with(b"\r\n\r\n") {
        head.push(stream.read_u8().await.unwrap());
    }
    String::from_utf8(head).unwrap()
}

async fn connect_viewer(addr: SocketAddr) -> TcpStream {
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let request = format!(
        "GET /ws HTTP/1.1\r\n\
         Host: {}\r\n\
         Upgrade: websocket\r\n\
         Connection: Upgrade\r\n\
         Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\
         Sec-WebSocket-Version: 13\r\n\r\n",
        addr
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let head = read_head(&mut stream).await;
    assert!(head.starts_with("HTTP/1.1 101"), "unexpected response: {}", head);

    stream
}

/// Read one server frame as `(fin, opcode, payload)`
async fn read_raw_frame(stream: &mut TcpStream) -> (bool, u8, Vec<u8>) {
    timeout(WAIT, async {
        let b0 = stream.read_u8().await.unwrap();
        let b1 = stream.read_u8().await.unwrap();

        assert_eq!(b0 & 0x70, 0, "reserved bits set");
        assert_eq!(b1 & 0x80, 0, "server frames must not be masked");

        let len = match b1 & 0x7f {
            126 => stream.read_u16().await.unwrap() as usize,
            127 => stream.read_u64().await.unwrap() as usize,
            n => n as usize,
        };

        let mut payload = vec![0u8; len];
        stream.read_exact(&mut payload).await.unwrap();

        (b0 & 0x80 != 0, b0 & 0x0f, payload)
    })
    .await
    .expect("no frame received")
}

/// Read one complete message, joining continuation frames
async fn read_frame(stream: &mut TcpStream) -> (u8, Vec<u8>) {
    let (mut fin, opcode, mut payload) = read_raw_frame(stream).await;
    assert_ne!(opcode, OP_CONTINUATION, "message starts with a continuation");

    while !fin {
        let (next_fin, next_opcode, more) = read_raw_frame(stream).await;
        assert_eq!(next_opcode, OP_CONTINUATION);
        payload.extend_from_slice(&more);
        fin = next_fin;
    }

    (opcode, payload)
}

async fn read_message(stream: &mut TcpStream) -> serde_json::Value {
    let (opcode, payload) = read_frame(stream).await;
    assert_eq!(opcode, OP_TEXT);
    serde_json::from_slice(&payload).unwrap()
}

#[tokio::test]
async fn test_index_page_served() {
    let tee = Arc::new(Tee::new());
    let addr = start_server(&tee).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();

    let mut response = String::new();
    timeout(WAIT, stream.read_to_string(&mut response))
        .await
        .unwrap()
        .unwrap();

    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains("<pre id=\"content\">"));
}

#[tokio::test]
async fn test_ws_requires_upgrade() {
    let tee = Arc::new(Tee::new());
    let addr = start_server(&tee).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /ws HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();

    let head = timeout(WAIT, read_head(&mut stream)).await.unwrap();
    assert!(head.starts_with("HTTP/1.1 4"), "unexpected response: {}", head);
    assert_eq!(tee.subscriber_count(), 0);
}

#[tokio::test]
async fn test_viewer_receives_stream_then_end() {
    let tee = Arc::new(Tee::new());
    let addr = start_server(&tee).await;

    let mut viewer = connect_viewer(addr).await;

    // Returns only once the viewer has subscribed
    timeout(WAIT, tee.write(b"hello\n")).await.unwrap().unwrap();

    let message = read_message(&mut viewer).await;
    assert_eq!(message["type"], "text");
    assert_eq!(message["data"], "hello\n");

    // A character split across two writes arrives whole
    tee.write(&[0xE2, 0x82]).await.unwrap();
    tee.write(&[0xAC, b'!']).await.unwrap();

    let message = read_message(&mut viewer).await;
    assert_eq!(message["data"], "€!");

    tee.close().await;

    let message = read_message(&mut viewer).await;
    assert_eq!(message["type"], "end");

    let (opcode, _) = read_frame(&mut viewer).await;
    assert_eq!(opcode, OP_CLOSE);
}

#[tokio::test]
async fn test_viewer_receives_large_chunk() {
    let tee = Arc::new(Tee::new());
    let addr = start_server(&tee).await;

    let mut viewer = connect_viewer(addr).await;

    // Larger than a 16-bit frame length
    let line = "x".repeat(70_000);
    timeout(WAIT, tee.write(line.as_bytes())).await.unwrap().unwrap();

    let message = read_message(&mut viewer).await;
    assert_eq!(message["data"].as_str().unwrap().len(), line.len());
}

#[tokio::test]
async fn test_every_viewer_gets_each_chunk() {
    let tee = Arc::new(Tee::new());
    let addr = start_server(&tee).await;

    let mut first = connect_viewer(addr).await;
    let mut second = connect_viewer(addr).await;

    let probe = Arc::clone(&tee);
    wait_until(move || probe.subscriber_count() == 2).await;

    tee.write(b"both").await.unwrap();

    assert_eq!(read_message(&mut first).await["data"], "both");
    assert_eq!(read_message(&mut second).await["data"], "both");
    assert_eq!(tee.stats().deliveries, 2);
}

#[tokio::test]
async fn test_viewer_close_unsubscribes() {
    let tee = Arc::new(Tee::new());
    let addr = start_server(&tee).await;

    let mut viewer = connect_viewer(addr).await;

    let probe = Arc::clone(&tee);
    wait_until(move || probe.subscriber_count() == 1).await;

    // Masked close frame with an empty payload
    viewer
        .write_all(&[0x80 | OP_CLOSE, 0x80, 0x01, 0x02, 0x03, 0x04])
        .await
        .unwrap();

    let probe = Arc::clone(&tee);
    wait_until(move || probe.subscriber_count() == 0).await;
}

#[tokio::test]
async fn test_dropped_connection_does_not_stall_producer() {
    let tee = Arc::new(Tee::new());
    let addr = start_server(&tee).await;

    let mut stays = connect_viewer(addr).await;
    let leaves = connect_viewer(addr).await;

    let probe = Arc::clone(&tee);
    wait_until(move || probe.subscriber_count() == 2).await;

    drop(leaves);

    let probe = Arc::clone(&tee);
    wait_until(move || probe.subscriber_count() == 1).await;

    timeout(WAIT, tee.write(b"still here")).await.unwrap().unwrap();
    assert_eq!(read_message(&mut stays).await["data"], "still here");
}

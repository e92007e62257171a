//! Viewer session
//!
//! One task per WebSocket connection: subscribe to the tee, forward every
//! chunk as a `text` message, and unsubscribe as soon as the viewer goes away.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};

use crate::stats::ViewerStats;
use crate::tee::Tee;

use super::message::{Utf8Decoder, ViewerMessage};

/// Why a viewer session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerExit {
    /// The tee closed; the viewer was told and the socket closed
    InputEnded,
    /// The viewer closed the socket or the socket errored
    Disconnected,
    /// Sending to the viewer failed
    SendFailed,
}

/// Drive one viewer connection until it ends
pub async fn run_viewer(
    mut socket: WebSocket,
    tee: Arc<Tee>,
    viewer_id: u64,
    peer_addr: SocketAddr,
) -> ViewerExit {
    let mut sink = tee.subscribe().await;
    let mut decoder = Utf8Decoder::new();
    let mut stats = ViewerStats::new(viewer_id);

    tracing::info!(
        viewer_id = viewer_id,
        peer = %peer_addr,
        sink_id = %sink.id(),
        "Viewer connected"
    );

    let exit = loop {
        tokio::select! {
            chunk = sink.recv() => {
                let Some(chunk) = chunk else {
                    let tail = decoder.finish();
                    if !tail.is_empty() && send(&mut socket, &ViewerMessage::text(tail)).await.is_err() {
                        break ViewerExit::SendFailed;
                    }
                    if let Err(e) = send(&mut socket, &ViewerMessage::End).await {
                        tracing::debug!(viewer_id = viewer_id, error = %e, "Failed to send end message");
                    } else if let Err(e) = socket.send(Message::Close(None)).await {
                        tracing::debug!(viewer_id = viewer_id, error = %e, "Failed to send close frame");
                    }
                    break ViewerExit::InputEnded;
                };

                stats.record_chunk(chunk.len());

                let text = decoder.decode(&chunk);
                if text.is_empty() {
                    continue;
                }

                if send(&mut socket, &ViewerMessage::text(text)).await.is_err() {
                    break ViewerExit::SendFailed;
                }
                stats.messages_sent += 1;
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break ViewerExit::Disconnected,
                    Some(Err(e)) => {
                        tracing::debug!(viewer_id = viewer_id, error = %e, "Viewer socket error");
                        break ViewerExit::Disconnected;
                    }
                    // Pings are answered by the socket layer; anything else is ignored
                    Some(Ok(_)) => {}
                }
            }
        }
    };

    tee.unsubscribe(sink).await;

    tracing::info!(
        viewer_id = viewer_id,
        peer = %peer_addr,
        exit = ?exit,
        chunks = stats.chunks_received,
        bytes = stats.bytes_received,
        duration_ms = stats.duration().as_millis() as u64,
        "Viewer disconnected"
    );

    exit
}

async fn send(socket: &mut WebSocket, message: &ViewerMessage) -> Result<(), axum::Error> {
    let json = message.to_json().map_err(axum::Error::new)?;
    socket.send(Message::Text(json.into())).await
}

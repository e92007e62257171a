//! Consumer side of a subscription

use tokio::sync::mpsc;

use super::chunk::Chunk;

/// Identifier of a registered sink, unique within one `Tee`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SinkId(pub(super) u64);

impl std::fmt::Display for SinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-subscriber delivery conduit
///
/// Created by [`Tee::subscribe`](super::Tee::subscribe) and drained by exactly
/// one consumer. Only the tee terminates a sink; termination shows up as
/// `None` from [`recv`](Sink::recv) once every delivered chunk has been read.
#[derive(Debug)]
pub struct Sink {
    id: SinkId,
    rx: mpsc::Receiver<Chunk>,
}

impl Sink {
    pub(super) fn new(id: SinkId, rx: mpsc::Receiver<Chunk>) -> Self {
        Self { id, rx }
    }

    /// Get the sink id
    pub fn id(&self) -> SinkId {
        self.id
    }

    /// Receive the next chunk
    ///
    /// Waits until a chunk arrives. Returns `None` when the tee has closed or
    /// dropped this sink. Cancel safe.
    pub async fn recv(&mut self) -> Option<Chunk> {
        self.rx.recv().await
    }

    /// Receive a chunk if one is already buffered
    pub fn try_recv(&mut self) -> Option<Chunk> {
        self.rx.try_recv().ok()
    }

    /// Whether the tee side of this sink has been torn down
    ///
    /// Buffered chunks may still be readable.
    pub fn is_terminated(&self) -> bool {
        self.rx.is_closed()
    }
}

//! Statistics for the tee and its viewers

use std::time::{Duration, Instant};

/// Tee-level statistics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeeStats {
    /// Currently registered sinks
    pub subscriber_count: usize,
    /// Completed write calls
    pub chunks_written: u64,
    /// Bytes accepted by write calls
    pub bytes_written: u64,
    /// Individual chunk deliveries to sinks
    pub deliveries: u64,
    /// Sinks pruned because their consumer went away without unsubscribing
    pub sinks_dropped: u64,
    /// Whether the tee has been closed
    pub closed: bool,
}

impl TeeStats {
    /// Average chunk size in bytes
    pub fn average_chunk_size(&self) -> u64 {
        if self.chunks_written > 0 {
            self.bytes_written / self.chunks_written
        } else {
            0
        }
    }
}

/// Per-viewer statistics
#[derive(Debug, Clone)]
pub struct ViewerStats {
    /// Viewer id
    pub viewer_id: u64,
    /// When the viewer connected
    pub connected_at: Instant,
    /// Chunks received from the tee
    pub chunks_received: u64,
    /// Bytes received from the tee
    pub bytes_received: u64,
    /// Text messages sent over the socket
    pub messages_sent: u64,
}

impl ViewerStats {
    pub fn new(viewer_id: u64) -> Self {
        Self {
            viewer_id,
            connected_at: Instant::now(),
            chunks_received: 0,
            bytes_received: 0,
            messages_sent: 0,
        }
    }

    /// Record a chunk taken from the sink
    pub fn record_chunk(&mut self, len: usize) {
        self.chunks_received += 1;
        self.bytes_received += len as u64;
    }

    /// Get duration since the viewer connected
    pub fn duration(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

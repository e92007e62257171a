//! Tee configuration

/// Default number of chunks a sink may hold before delivery blocks
pub const DEFAULT_SINK_CAPACITY: usize = 1;

/// Tee configuration options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeeConfig {
    /// Chunks buffered per sink before the producer has to wait for the
    /// consumer (minimum 1)
    pub sink_capacity: usize,
}

impl Default for TeeConfig {
    fn default() -> Self {
        Self {
            sink_capacity: DEFAULT_SINK_CAPACITY,
        }
    }
}

impl TeeConfig {
    /// Set per-sink capacity
    pub fn sink_capacity(mut self, capacity: usize) -> Self {
        self.sink_capacity = capacity.max(1);
        self
    }
}

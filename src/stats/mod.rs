//! Runtime statistics

pub mod metrics;

pub use metrics::{TeeStats, ViewerStats};

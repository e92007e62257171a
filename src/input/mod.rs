//! Input side: feeding a byte stream into the tee

pub mod copy;

pub use copy::{pump, PumpSummary, DEFAULT_READ_BUFFER_SIZE};

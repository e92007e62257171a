//! Broadcast tee for live byte streams
//!
//! The tee takes writes from exactly one producer and republishes each write
//! to every currently subscribed sink. Viewers come and go at any time; the
//! producer waits while nobody is watching.
//!
//! # Architecture
//!
//! ```text
//!                               Arc<Tee>
//!                     ┌──────────────────────────┐
//!                     │ sinks: Mutex<HashMap<    │
//!                     │   SinkId, mpsc::Sender>> │
//!                     │ gate: watch<subscribers> │
//!                     └────────────┬─────────────┘
//!                                  │
//!          ┌───────────────────────┼───────────────────────┐
//!          │                       │                       │
//!          ▼                       ▼                       ▼
//!     [Copy loop]              [Viewer]                [Viewer]
//!     pump(stdin)           sink.recv()             sink.recv()
//!          │                       │                       │
//!          └──► tee.write() ──► Chunk ──► WebSocket text frame
//! ```
//!
//! # Delivery
//!
//! Each write is copied once into a [`Chunk`] (backed by `bytes::Bytes`) and
//! handed to the sinks one after another. A sink buffers at most
//! [`TeeConfig::sink_capacity`] chunks; past that, the producer waits for the
//! consumer. Nothing is dropped for a sink that is still subscribed, and a
//! sink that joins late sees only chunks written after it joined.

pub mod chunk;
pub mod config;
pub mod sink;
pub mod store;
pub mod writer;

pub use chunk::Chunk;
pub use config::TeeConfig;
pub use sink::{Sink, SinkId};
pub use store::Tee;
pub use writer::ByteSink;

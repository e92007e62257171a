//! Live broadcast of a byte stream to browser viewers
//!
//! `teecast` reads bytes from one input (typically standard input) and
//! streams them to every connected viewer over a WebSocket. The heart of it
//! is [`Tee`], a fan-out point with one producer and any number of sinks that
//! come and go while the stream runs.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use teecast::{pump, Tee, ViewerServer};
//!
//! # async fn example() -> teecast::Result<()> {
//! let tee = Arc::new(Tee::new());
//! let server = ViewerServer::bind("127.0.0.1:0".parse().unwrap(), Arc::clone(&tee)).await?;
//! println!("{}", server.url());
//!
//! tokio::spawn(server.run_until(std::future::pending()));
//!
//! // Waits for the first viewer, then forwards stdin to all of them
//! pump(tokio::io::stdin(), tee.as_ref(), 4096).await?;
//! tee.close().await;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod error;
pub mod input;
pub mod server;
pub mod stats;
pub mod tee;

pub use error::{Error, Result};
pub use input::{pump, PumpSummary};
pub use server::{ServerConfig, ViewerServer};
pub use tee::{ByteSink, Chunk, Sink, SinkId, Tee, TeeConfig};

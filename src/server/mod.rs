//! Viewer-facing server
//!
//! - `GET /` serves the viewer page
//! - `GET /ws` streams the tee to the viewer as JSON text frames
//!
//! Each WebSocket connection gets its own sink. A viewer that closes the
//! socket, errors, or cannot be written to is unsubscribed right away so the
//! producer never waits on it.

pub mod config;
pub mod listener;
pub mod message;
pub mod page;
pub mod viewer;

pub use config::ServerConfig;
pub use listener::ViewerServer;
pub use message::{Utf8Decoder, ViewerMessage};
pub use viewer::ViewerExit;

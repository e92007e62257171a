//! Error types
//!
//! The broadcast core itself cannot fail under its contract; errors come from
//! the input side, the network side, or configuration.

use std::io;

/// Error type for teecast operations
#[derive(Debug)]
pub enum Error {
    /// I/O error (input stream, socket bind, serving)
    Io(io::Error),
    /// The tee has been closed and accepts no more writes
    Closed,
    /// Invalid configuration
    Config(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Closed => write!(f, "Tee is closed"),
            Error::Config(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

/// Result type for teecast operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Error::Closed.to_string(), "Tee is closed");
        assert_eq!(
            Error::Config("read buffer size must be non-zero".into()).to_string(),
            "Invalid configuration: read buffer size must be non-zero"
        );
    }

    #[test]
    fn test_from_io() {
        let err: Error = io::Error::new(io::ErrorKind::BrokenPipe, "gone").into();
        assert!(matches!(err, Error::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}

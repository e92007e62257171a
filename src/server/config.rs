//! Server configuration

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::input::DEFAULT_READ_BUFFER_SIZE;
use crate::tee::TeeConfig;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (port 0 picks a free port)
    pub bind_addr: SocketAddr,

    /// Input read buffer size, which is also the largest chunk size
    pub read_buffer_size: usize,

    /// Launch a browser on the viewer URL after binding
    pub open_browser: bool,

    /// How long to keep serving after the tee closes so viewers can flush
    pub linger: Duration,

    /// Tee settings
    pub tee: TeeConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            open_browser: true,
            linger: Duration::from_millis(500),
            tee: TeeConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the input read buffer size
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Do not launch a browser
    pub fn no_browser(mut self) -> Self {
        self.open_browser = false;
        self
    }

    /// Set the linger time after end of input
    pub fn linger(mut self, linger: Duration) -> Self {
        self.linger = linger;
        self
    }

    /// Set chunks buffered per viewer
    pub fn sink_capacity(mut self, capacity: usize) -> Self {
        self.tee = self.tee.sink_capacity(capacity);
        self
    }

    /// Check the configuration for values that cannot work
    pub fn validate(&self) -> Result<()> {
        if self.read_buffer_size == 0 {
            return Err(Error::Config("read buffer size must be non-zero".into()));
        }
        Ok(())
    }
}

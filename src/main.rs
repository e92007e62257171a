//! teecast - stream stdin live to the browser
//!
//! # Usage
//!
//! ```bash
//! # Watch a build in the browser
//! make 2>&1 | teecast
//!
//! # Share on the LAN without opening a local browser
//! tail -f app.log | teecast --bind 0.0.0.0:8080 --no-open
//! ```

use std::net::SocketAddr;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use teecast::input::DEFAULT_READ_BUFFER_SIZE;
use teecast::tee::config::DEFAULT_SINK_CAPACITY;
use teecast::ServerConfig;

/// Stream standard input live to browser viewers
#[derive(Parser, Debug)]
#[command(name = "teecast")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Address to serve viewers on (port 0 picks a free port)
    #[arg(short, long, default_value = "127.0.0.1:0")]
    bind: SocketAddr,

    /// Do not open a browser
    #[arg(long)]
    no_open: bool,

    /// Input read size in bytes
    #[arg(long, default_value_t = DEFAULT_READ_BUFFER_SIZE)]
    buffer_size: usize,

    /// Chunks buffered per viewer before input waits for it
    #[arg(long, default_value_t = DEFAULT_SINK_CAPACITY)]
    sink_capacity: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    let mut config = ServerConfig::with_addr(cli.bind)
        .read_buffer_size(cli.buffer_size)
        .sink_capacity(cli.sink_capacity);
    if cli.no_open {
        config = config.no_browser();
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    teecast::app::run(config, tokio::io::stdin(), shutdown).await?;

    Ok(())
}

/// Initialize the tracing subscriber, logging to stderr
fn init_logging(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_new(level).or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .with(filter)
        .init();

    Ok(())
}

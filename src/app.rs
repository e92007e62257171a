//! Program orchestration
//!
//! Wires the pieces together for one run: bind the viewer server, announce
//! the URL, pump the input into the tee, then close the tee and stop serving.

use std::future::Future;
use std::process::Stdio;
use std::sync::Arc;

use tokio::io::AsyncRead;
use tokio::process::Command;
use tokio::sync::oneshot;

use crate::error::Result;
use crate::input::{pump, PumpSummary};
use crate::server::{ServerConfig, ViewerServer};
use crate::tee::Tee;

/// Stream `input` to viewers until it ends or `shutdown` completes
///
/// Prints the viewer URL on stdout once the server is bound. Returns what was
/// forwarded, or the input error that ended the run. The tee is closed in
/// every case before the server stops.
pub async fn run<R, F>(config: ServerConfig, input: R, shutdown: F) -> Result<PumpSummary>
where
    R: AsyncRead + Unpin,
    F: Future<Output = ()>,
{
    config.validate()?;

    let tee = Arc::new(Tee::with_config(config.tee.clone()));
    let server = ViewerServer::bind(config.bind_addr, Arc::clone(&tee)).await?;

    let url = server.url();
    println!("{}", url);

    if config.open_browser {
        open_browser(&url);
    }

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server_task = tokio::spawn(server.run_until(async move {
        let _ = stop_rx.await;
    }));

    let result = tokio::select! {
        result = pump(input, tee.as_ref(), config.read_buffer_size) => result,
        _ = shutdown => {
            tracing::info!("Shutdown signal received");
            let stats = tee.stats();
            Ok(PumpSummary {
                chunks: stats.chunks_written,
                bytes: stats.bytes_written,
            })
        }
    };

    match &result {
        Ok(summary) => {
            let stats = tee.stats();
            tracing::info!(
                chunks = summary.chunks,
                bytes = summary.bytes,
                avg_chunk = stats.average_chunk_size(),
                deliveries = stats.deliveries,
                viewers = stats.subscriber_count,
                "Input finished"
            );
        }
        Err(e) => tracing::error!(error = %e, "Input failed"),
    }

    tee.close().await;

    // Let viewer tasks flush the end-of-stream message
    tokio::time::sleep(config.linger).await;

    let _ = stop_tx.send(());
    match server_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "Viewer server error"),
        Err(e) => tracing::warn!(error = %e, "Viewer server task failed"),
    }

    result
}

/// Launch the platform browser on `url`
///
/// Failure is logged, not returned: the URL has already been printed.
pub fn open_browser(url: &str) {
    let mut command = browser_command(url);

    match command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(_) => tracing::debug!(url = url, "Browser launched"),
        Err(e) => tracing::warn!(url = url, error = %e, "Failed to launch browser"),
    }
}

#[cfg(target_os = "macos")]
fn browser_command(url: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(url);
    command
}

#[cfg(windows)]
fn browser_command(url: &str) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", "", url]);
    command
}

#[cfg(all(unix, not(target_os = "macos")))]
fn browser_command(url: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(url);
    command
}

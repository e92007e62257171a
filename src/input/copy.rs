//! Copy loop from a byte stream into a [`ByteSink`]

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::Result;
use crate::tee::ByteSink;

/// Default read buffer size
pub const DEFAULT_READ_BUFFER_SIZE: usize = 4096;

/// Totals for one completed copy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpSummary {
    /// Non-empty reads forwarded to the sink
    pub chunks: u64,
    /// Bytes forwarded to the sink
    pub bytes: u64,
}

/// Copy `reader` into `sink` until end of input
///
/// Reads up to `buf_size` bytes at a time into one reused buffer and passes
/// every non-empty read to `sink.write`. Returns the totals at end of input,
/// or the first read or write error. Interrupted reads are retried.
pub async fn pump<R, W>(mut reader: R, sink: &W, buf_size: usize) -> Result<PumpSummary>
where
    R: AsyncRead + Unpin,
    W: ByteSink,
{
    let mut buf = vec![0u8; buf_size.max(1)];
    let mut summary = PumpSummary::default();

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        let written = sink.write(&buf[..n]).await?;

        summary.chunks += 1;
        summary.bytes += written as u64;

        tracing::trace!(bytes = n, total = summary.bytes, "Forwarded input");
    }

    tracing::debug!(
        chunks = summary.chunks,
        bytes = summary.bytes,
        "End of input"
    );

    Ok(summary)
}

//! Byte sink abstraction
//!
//! The copy loop only needs something that accepts byte slices. Keeping that
//! behind a trait lets the same loop feed a [`Tee`], a test double, or any
//! other destination.

use std::future::Future;
use std::sync::Arc;

use crate::error::Result;

use super::store::Tee;

/// Destination for a stream of byte slices
///
/// `write` consumes the slice before returning; callers are free to reuse
/// their buffer afterwards.
pub trait ByteSink: Send + Sync {
    /// Accept `data`, returning how many bytes were taken
    fn write(&self, data: &[u8]) -> impl Future<Output = Result<usize>> + Send;
}

impl ByteSink for Tee {
    fn write(&self, data: &[u8]) -> impl Future<Output = Result<usize>> + Send {
        Tee::write(self, data)
    }
}

impl<T: ByteSink> ByteSink for Arc<T> {
    fn write(&self, data: &[u8]) -> impl Future<Output = Result<usize>> + Send {
        (**self).write(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn feed<W: ByteSink>(sink: &W, parts: &[&[u8]]) -> Result<usize> {
        let mut total = 0;
        for part in parts {
            total += sink.write(part).await?;
        }
        Ok(total)
    }

    #[tokio::test]
    async fn test_tee_as_byte_sink() {
        let tee = Arc::new(Tee::new());
        let mut sink = tee.subscribe().await;

        let consumer = tokio::spawn(async move {
            let mut out = Vec::new();
            while let Some(chunk) = sink.recv().await {
                out.extend_from_slice(&chunk);
            }
            out
        });

        let total = feed(&tee, &[&b"ab"[..], &b"cd"[..], &b"e"[..]]).await.unwrap();
        assert_eq!(total, 5);

        tee.close().await;
        assert_eq!(consumer.await.unwrap(), b"abcde");
    }
}

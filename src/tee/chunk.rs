//! Chunk type
//!
//! A chunk is the unit of delivery: the bytes of one producer write, copied
//! once out of the producer's buffer and then shared read-only by every sink.

use std::ops::Deref;

use bytes::Bytes;

/// Immutable copy of the bytes passed to one write call
///
/// Cheap to clone: all sinks share the same allocation through `Bytes`
/// reference counting, but none of them alias the producer's buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk(Bytes);

impl Chunk {
    /// Copy `data` into a new chunk
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(data))
    }

    /// Get the chunk contents
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the chunk, returning the underlying buffer
    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the chunk holds no bytes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for Chunk {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Chunk {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

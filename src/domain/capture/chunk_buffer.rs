//! Bounded append-only buffer of encoded chunks

use bytes::{Bytes, BytesMut};
use thiserror::Error;

/// Reasons a chunk was not accepted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkBufferError {
    #[error("Recording exceeded the {limit} byte buffer limit")]
    Overflow { limit: usize },

    #[error("Chunk arrived after the final chunk")]
    Sealed,
}

/// Encoded chunks for one recording session, in arrival order.
/// Only ever appended to; consumed once into a single byte buffer.
#[derive(Debug)]
pub struct ChunkBuffer {
    chunks: Vec<Bytes>,
    total_bytes: usize,
    limit: usize,
    sealed: bool,
    overflowed: bool,
}

impl ChunkBuffer {
    /// Create a buffer holding at most `limit` bytes
    pub fn new(limit: usize) -> Self {
        Self {
            chunks: Vec::new(),
            total_bytes: 0,
            limit,
            sealed: false,
            overflowed: false,
        }
    }

    /// Append a chunk. `is_final` seals the buffer after this chunk.
    pub fn push(&mut self, chunk: impl Into<Bytes>, is_final: bool) -> Result<(), ChunkBufferError> {
        if self.sealed {
            return Err(ChunkBufferError::Sealed);
        }

        let chunk = chunk.into();
        if !chunk.is_empty() {
            if self.total_bytes + chunk.len() > self.limit {
                self.overflowed = true;
                return Err(ChunkBufferError::Overflow { limit: self.limit });
            }
            self.total_bytes += chunk.len();
            self.chunks.push(chunk);
        }

        if is_final {
            self.sealed = true;
        }
        Ok(())
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Concatenate all chunks, rejecting an overflowed recording
    pub fn into_bytes(self) -> Result<Bytes, ChunkBufferError> {
        if self.overflowed {
            return Err(ChunkBufferError::Overflow { limit: self.limit });
        }
        if self.chunks.len() == 1 {
            return Ok(self.chunks.into_iter().next().unwrap_or_default());
        }
        let mut out = BytesMut::with_capacity(self.total_bytes);
        for chunk in self.chunks {
            out.extend_from_slice(&chunk);
        }
        Ok(out.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenates_in_arrival_order() {
        let mut buffer = ChunkBuffer::new(1024);
        buffer.push(vec![1, 2], false).unwrap();
        buffer.push(vec![3], false).unwrap();
        buffer.push(vec![4, 5], true).unwrap();
        assert_eq!(buffer.chunk_count(), 3);
        assert_eq!(buffer.into_bytes().unwrap().as_ref(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn empty_chunks_are_ignored() {
        let mut buffer = ChunkBuffer::new(1024);
        buffer.push(Vec::<u8>::new(), false).unwrap();
        assert_eq!(buffer.chunk_count(), 0);
        assert!(!buffer.is_sealed());
    }

    #[test]
    fn empty_final_chunk_still_seals() {
        let mut buffer = ChunkBuffer::new(1024);
        buffer.push(vec![1], false).unwrap();
        buffer.push(Vec::<u8>::new(), true).unwrap();
        assert!(buffer.is_sealed());
        assert_eq!(buffer.push(vec![2], false), Err(ChunkBufferError::Sealed));
    }

    #[test]
    fn overflow_rejects_and_poisons_buffer() {
        let mut buffer = ChunkBuffer::new(4);
        buffer.push(vec![0; 3], false).unwrap();
        assert_eq!(
            buffer.push(vec![0; 2], false),
            Err(ChunkBufferError::Overflow { limit: 4 })
        );
        assert!(buffer.overflowed());
        assert_eq!(buffer.total_bytes(), 3);
        assert!(buffer.into_bytes().is_err());
    }

    #[test]
    fn no_chunks_yields_empty_bytes() {
        let buffer = ChunkBuffer::new(16);
        assert!(buffer.into_bytes().unwrap().is_empty());
    }
}

//! Double-SHA256 hashing
//!
//! [`Hash256Writer`] is the streaming accumulator every commitment in this crate is
//! built from: bytes are written in order, then finalization applies SHA256 twice.
//! Finalizing consumes the writer, so an accumulator cannot be reused.

use crate::types::Hash;
use sha2::{Digest, Sha256};

/// Streaming double-SHA256 accumulator
#[derive(Clone, Default)]
pub struct Hash256Writer {
    inner: Sha256,
}

impl Hash256Writer {
    pub fn new() -> Self {
        Self {
            inner: Sha256::new(),
        }
    }

    /// Append bytes, builder style
    #[must_use]
    pub fn write(mut self, data: &[u8]) -> Self {
        self.inner.update(data);
        self
    }

    /// Append bytes in place
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// SHA256(SHA256(all written bytes))
    pub fn finalize(self) -> Hash {
        let first = self.inner.finalize();
        let second = Sha256::digest(first);
        let mut out = [0u8; 32];
        out.copy_from_slice(&second);
        out
    }
}

impl std::fmt::Debug for Hash256Writer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hash256Writer").finish_non_exhaustive()
    }
}

/// Double SHA256 (txids, merkle nodes, commitments)
#[inline]
pub fn hash256(data: &[u8]) -> Hash {
    Hash256Writer::new().write(data).finalize()
}

/// Parent merkle node of two children
#[inline]
pub fn hash256_pair(left: &Hash, right: &Hash) -> Hash {
    Hash256Writer::new().write(left).write(right).finalize()
}

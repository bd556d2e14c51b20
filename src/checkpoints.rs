//! Checkpoint registry
//!
//! Two compiled-in tables per network: hard block checkpoints (height to block
//! hash) and assumeutxo snapshots (height and block hash to a UTXO-set digest and
//! the chain transaction count). Lookups never fail; a missing entry is `None`.

use crate::types::*;
use serde::Serialize;
use std::fmt;
use tracing::trace;

/// Digest of a serialized UTXO set snapshot
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AssumeutxoHash(pub Hash);

impl AssumeutxoHash {
    pub const fn from_hex(s: &str) -> Self {
        AssumeutxoHash(hash_from_hex(s))
    }
}

impl fmt::Display for AssumeutxoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hash_to_hex(&self.0))
    }
}

impl fmt::Debug for AssumeutxoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssumeutxoHash({self})")
    }
}

/// A snapshot a node may load instead of replaying history up to `height`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssumeutxoData {
    pub height: Natural,
    /// Digest of the serialized UTXO set at `height`
    pub state_digest: AssumeutxoHash,
    /// Transactions in the chain up to and including the snapshot block
    pub chain_tx_count: u64,
    pub block_hash: BlockHash,
}

/// Read-only view over one network's checkpoint tables
#[derive(Debug, Clone, Copy)]
pub struct CheckpointRegistry<'a> {
    checkpoints: &'a [(Natural, BlockHash)],
    assumeutxo: &'a [AssumeutxoData],
}

impl<'a> CheckpointRegistry<'a> {
    pub const fn new(
        checkpoints: &'a [(Natural, BlockHash)],
        assumeutxo: &'a [AssumeutxoData],
    ) -> Self {
        Self {
            checkpoints,
            assumeutxo,
        }
    }

    /// Snapshot recorded at `height`
    pub fn checkpoint_for_height(&self, height: Natural) -> Option<&'a AssumeutxoData> {
        let found = self.assumeutxo.iter().find(|data| data.height == height);
        trace!(height, found = found.is_some(), "assumeutxo lookup by height");
        found
    }

    /// Snapshot whose block hash is `hash`
    pub fn checkpoint_for_hash(&self, hash: &BlockHash) -> Option<&'a AssumeutxoData> {
        let found = self.assumeutxo.iter().find(|data| data.block_hash == *hash);
        trace!(%hash, found = found.is_some(), "assumeutxo lookup by hash");
        found
    }

    /// Hard checkpoint at `height`
    pub fn block_checkpoint(&self, height: Natural) -> Option<BlockHash> {
        self.checkpoints
            .iter()
            .find(|(h, _)| *h == height)
            .map(|(_, hash)| *hash)
    }

    /// Highest hard checkpoint height; 0 when the table is empty
    pub fn last_checkpoint_height(&self) -> Natural {
        self.checkpoints
            .iter()
            .map(|(height, _)| *height)
            .max()
            .unwrap_or(0)
    }

    /// `false` only when a hard checkpoint at `height` names a different block
    pub fn matches_checkpoint(&self, height: Natural, hash: &BlockHash) -> bool {
        self.block_checkpoint(height)
            .map_or(true, |expected| expected == *hash)
    }

    pub fn assumeutxo_entries(&self) -> &'a [AssumeutxoData] {
        self.assumeutxo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: AssumeutxoData = AssumeutxoData {
        height: 10,
        state_digest: AssumeutxoHash([0xaa; 32]),
        chain_tx_count: 11,
        block_hash: BlockHash([0xbb; 32]),
    };

    const CHECKPOINTS: [(Natural, BlockHash); 2] =
        [(0, BlockHash([1; 32])), (500, BlockHash([2; 32]))];

    #[test]
    fn test_lookups_agree() {
        let registry = CheckpointRegistry::new(&CHECKPOINTS, std::slice::from_ref(&SNAPSHOT));
        let by_height = registry.checkpoint_for_height(10).unwrap();
        let by_hash = registry.checkpoint_for_hash(&BlockHash([0xbb; 32])).unwrap();
        assert_eq!(by_height, by_hash);
        assert_eq!(by_height.chain_tx_count, 11);

        assert!(registry.checkpoint_for_height(11).is_none());
        assert!(registry.checkpoint_for_hash(&BlockHash([0xaa; 32])).is_none());
    }

    #[test]
    fn test_block_checkpoints() {
        let registry = CheckpointRegistry::new(&CHECKPOINTS, &[]);
        assert_eq!(registry.block_checkpoint(500), Some(BlockHash([2; 32])));
        assert_eq!(registry.block_checkpoint(499), None);
        assert_eq!(registry.last_checkpoint_height(), 500);

        assert!(registry.matches_checkpoint(0, &BlockHash([1; 32])));
        assert!(!registry.matches_checkpoint(0, &BlockHash([2; 32])));
        assert!(registry.matches_checkpoint(7, &BlockHash([9; 32])));
    }

    #[test]
    fn test_empty_registry() {
        let registry = CheckpointRegistry::new(&[], &[]);
        assert_eq!(registry.last_checkpoint_height(), 0);
        assert!(registry.checkpoint_for_height(0).is_none());
        assert!(registry.assumeutxo_entries().is_empty());
    }

    #[test]
    fn test_digest_display_is_reversed() {
        let mut raw = [0u8; 32];
        raw[0] = 0x49;
        raw[31] = 0xb8;
        let digest = AssumeutxoHash(raw);
        let text = digest.to_string();
        assert!(text.starts_with("b8"));
        assert!(text.ends_with("49"));
    }
}

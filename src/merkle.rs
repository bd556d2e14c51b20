//! Merkle tree construction over transaction identifiers
//!
//! The tree pairs adjacent nodes left to right and pairs a trailing odd node with
//! itself. That rule means `[a, b, c]` and `[a, b, c, c]` commit to the same root
//! (CVE-2012-2459), so the root walk also reports whether any level held two equal
//! siblings. Callers validating blocks must reject on that flag; see
//! [`crate::block::check_block_mutation`].

use crate::crypto::hash256_pair;
use crate::transaction::{txid, wtxid};
use crate::types::*;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Root of a merkle walk together with the duplicate-sibling flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MerkleComputation {
    pub root: Hash,
    /// Some level contained an even position equal to its right neighbour
    pub mutated: bool,
}

/// Merkle root over `leaves`; the zero digest when empty
///
/// ```
/// use griffion_consensus::crypto::hash256_pair;
/// use griffion_consensus::merkle::merkle_root;
/// use griffion_consensus::types::ZERO_HASH;
///
/// assert_eq!(merkle_root(&[]), ZERO_HASH);
/// assert_eq!(merkle_root(&[[7; 32]]), [7; 32]);
/// assert_eq!(merkle_root(&[[1; 32], [2; 32]]), hash256_pair(&[1; 32], &[2; 32]));
/// ```
pub fn merkle_root(leaves: &[Hash]) -> Hash {
    compute_merkle_root(leaves.to_vec()).root
}

/// Build the tree bottom-up, reusing the leaf buffer for every level.
pub fn compute_merkle_root(mut hashes: Vec<Hash>) -> MerkleComputation {
    let mut mutated = false;

    while hashes.len() > 1 {
        for pos in (0..hashes.len() - 1).step_by(2) {
            if hashes[pos] == hashes[pos + 1] {
                mutated = true;
            }
        }

        if hashes.len() & 1 != 0 {
            hashes.push(hashes[hashes.len() - 1]);
        }

        let parents = hashes.len() / 2;
        for i in 0..parents {
            hashes[i] = hash256_pair(&hashes[2 * i], &hashes[2 * i + 1]);
        }
        hashes.truncate(parents);
    }

    MerkleComputation {
        root: hashes.first().copied().unwrap_or(ZERO_HASH),
        mutated,
    }
}

/// Base identifiers of `transactions`, in block order
pub fn transaction_ids(transactions: &[Transaction]) -> Vec<Hash> {
    #[cfg(feature = "rayon")]
    {
        transactions.par_iter().map(txid).collect()
    }

    #[cfg(not(feature = "rayon"))]
    {
        transactions.iter().map(txid).collect()
    }
}

/// Witness identifiers of `transactions`, with position 0 mapped to zero
///
/// Position 0 is where the coinbase sits; its wtxid cannot appear in the tree that
/// the coinbase itself commits to.
pub fn witness_ids(transactions: &[Transaction]) -> Vec<Hash> {
    let id = |(index, tx): (usize, &Transaction)| {
        if index == 0 {
            ZERO_HASH
        } else {
            wtxid(tx)
        }
    };

    #[cfg(feature = "rayon")]
    {
        transactions.par_iter().enumerate().map(id).collect()
    }

    #[cfg(not(feature = "rayon"))]
    {
        transactions.iter().enumerate().map(id).collect()
    }
}

/// Merkle root over the base transaction identifiers, with the duplicate flag
pub fn block_merkle_root(transactions: &[Transaction]) -> MerkleComputation {
    compute_merkle_root(transaction_ids(transactions))
}

/// Merkle root over witness identifiers; the first transaction contributes the zero digest
pub fn witness_merkle_root(transactions: &[Transaction]) -> Hash {
    compute_merkle_root(witness_ids(transactions)).root
}

/// Sibling path proving `leaves[index]` under [`merkle_root`]`(leaves)`.
///
/// Empty when `index` is out of range or the tree has a single leaf.
pub fn merkle_branch(leaves: &[Hash], index: usize) -> Vec<Hash> {
    if index >= leaves.len() {
        return Vec::new();
    }

    let mut branch = Vec::new();
    let mut level = leaves.to_vec();
    let mut index = index;
    while level.len() > 1 {
        let sibling = (index ^ 1).min(level.len() - 1);
        branch.push(level[sibling]);

        if level.len() & 1 != 0 {
            level.push(level[level.len() - 1]);
        }
        level = level
            .chunks_exact(2)
            .map(|pair| hash256_pair(&pair[0], &pair[1]))
            .collect();
        index >>= 1;
    }
    branch
}

/// Fold a sibling path back into a root
pub fn merkle_root_from_branch(leaf: Hash, branch: &[Hash], index: usize) -> Hash {
    let mut node = leaf;
    let mut index = index;
    for sibling in branch {
        node = if index & 1 != 0 {
            hash256_pair(sibling, &node)
        } else {
            hash256_pair(&node, sibling)
        };
        index >>= 1;
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::is_coinbase;

    fn leaf(n: u8) -> Hash {
        [n; 32]
    }

    #[test]
    fn test_odd_count_duplicates_last() {
        let (a, b, c) = (leaf(1), leaf(2), leaf(3));
        let expected = hash256_pair(&hash256_pair(&a, &b), &hash256_pair(&c, &c));
        let odd = compute_merkle_root(vec![a, b, c]);
        assert_eq!(odd.root, expected);
        assert!(!odd.mutated);

        // The same root with the duplicate spelled out, flagged
        let padded = compute_merkle_root(vec![a, b, c, c]);
        assert_eq!(padded.root, expected);
        assert!(padded.mutated);
    }

    #[test]
    fn test_duplicate_detected_on_inner_level() {
        let (a, b) = (leaf(1), leaf(2));
        // [a, b, a, b]: leaves differ pairwise, the two parents collide
        let result = compute_merkle_root(vec![a, b, a, b]);
        assert!(result.mutated);
        let parent = hash256_pair(&a, &b);
        assert_eq!(result.root, hash256_pair(&parent, &parent));
    }

    #[test]
    fn test_odd_position_equality_is_not_mutation() {
        let (a, b) = (leaf(1), leaf(2));
        // positions 1 and 2 are equal but never siblings
        assert!(!compute_merkle_root(vec![a, b, b, a]).mutated);
    }

    #[test]
    fn test_single_leaf_is_root() {
        let result = compute_merkle_root(vec![leaf(9)]);
        assert_eq!(result.root, leaf(9));
        assert!(!result.mutated);
        assert_eq!(compute_merkle_root(Vec::new()).root, ZERO_HASH);
    }

    #[test]
    fn test_branch_reproduces_root() {
        for count in 1..=11u8 {
            let leaves: Vec<Hash> = (0..count).map(leaf).collect();
            let root = merkle_root(&leaves);
            for (index, l) in leaves.iter().enumerate() {
                let branch = merkle_branch(&leaves, index);
                assert_eq!(merkle_root_from_branch(*l, &branch, index), root);
            }
        }
    }

    #[test]
    fn test_witness_root_zeroes_first_position() {
        let first = Transaction {
            inputs: vec![TransactionInput {
                prevout: OutPoint {
                    hash: [5; 32],
                    index: 0,
                },
                witness: vec![vec![1]],
                ..Default::default()
            }],
            ..Default::default()
        };
        let second = Transaction {
            lock_time: 9,
            ..first.clone()
        };
        assert!(!is_coinbase(&first));

        let txs = [first, second];
        assert_eq!(witness_ids(&txs)[0], ZERO_HASH);
        assert_eq!(
            witness_merkle_root(&txs),
            hash256_pair(&ZERO_HASH, &wtxid(&txs[1]))
        );
        assert_eq!(witness_merkle_root(&[]), ZERO_HASH);
    }

    #[test]
    fn test_branch_out_of_range() {
        assert!(merkle_branch(&[leaf(1), leaf(2)], 2).is_empty());
        assert!(merkle_branch(&[], 0).is_empty());
    }
}

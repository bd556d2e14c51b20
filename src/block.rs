//! Block mutation detection
//!
//! A block is *mutated* when its header commitments do not pin down its transaction
//! list: a different list (duplicated transactions, a 64-byte transaction posing as
//! an inner merkle node, altered witness data) would produce the same header. Such a
//! block must not be marked invalid by hash, since the honest version may still
//! arrive; callers drop the copy and keep listening.

use crate::constants::MERKLE_NODE_SIZE;
use crate::error::BlockMutation;
use crate::merkle::block_merkle_root;
use crate::segwit::{check_witness_commitment, WitnessCommitmentStatus};
use crate::transaction::{base_size, has_witness, is_coinbase};
use crate::types::*;
use tracing::debug;

/// Check that the block's commitments bind its transactions.
///
/// Rules, in order:
/// 1. the recomputed merkle root equals the header's, and no tree level holds two
///    equal siblings
/// 2. a block without a leading coinbase must not contain a 64-byte transaction;
///    such blocks skip the witness rules
/// 3. with `check_witness_root`, a commitment output must match the witness root,
///    and a block without one must not carry witness data
pub fn check_block_mutation(
    block: &Block,
    check_witness_root: bool,
) -> Result<(), BlockMutation> {
    check_merkle_root(block)
        .and_then(|()| check_coinbase_shape(block))
        .and_then(|coinbase_first| {
            if coinbase_first && check_witness_root {
                check_witness(block)
            } else {
                Ok(())
            }
        })
        .map_err(|reason| log_mutation(block, reason))
}

/// `true` when some other transaction list could match this block's commitments
pub fn is_block_mutated(block: &Block, check_witness_root: bool) -> bool {
    check_block_mutation(block, check_witness_root).is_err()
}

/// [`check_block_mutation`] that reuses the block's memoized verdicts.
///
/// Sub-checks already passed at the block's current content generation are
/// skipped; newly passed ones are recorded. Failures are never recorded, so a
/// later probe after fixing the block re-runs everything that failed.
pub fn check_block_mutation_cached(
    block: &mut Block,
    check_witness_root: bool,
) -> Result<(), BlockMutation> {
    if check_witness_root && block.cache().is_checked() {
        return Ok(());
    }

    if !block.cache().is_merkle_root_checked() {
        check_merkle_root(block).map_err(|reason| log_mutation(block, reason))?;
        block.cache_mut().mark_merkle_root_checked();
    }

    let coinbase_first =
        check_coinbase_shape(block).map_err(|reason| log_mutation(block, reason))?;
    if !coinbase_first || !check_witness_root {
        return Ok(());
    }

    if !block.cache().is_witness_commitment_checked() {
        check_witness(block).map_err(|reason| log_mutation(block, reason))?;
        block.cache_mut().mark_witness_commitment_checked();
    }
    block.cache_mut().mark_checked();
    Ok(())
}

fn log_mutation(block: &Block, reason: BlockMutation) -> BlockMutation {
    debug!(
        %reason,
        merkle_root = %hash_to_hex(block.merkle_root()),
        transactions = block.transactions().len(),
        generation = block.cache().generation(),
        "block mutated"
    );
    reason
}

fn check_merkle_root(block: &Block) -> Result<(), BlockMutation> {
    let computed = block_merkle_root(block.transactions());
    if computed.root != *block.merkle_root() {
        return Err(BlockMutation::BadMerkleRoot);
    }
    // Root matched, but a duplicated subtree would have matched too
    if computed.mutated {
        return Err(BlockMutation::DuplicateTransactions);
    }
    Ok(())
}

/// Returns whether the block starts with a coinbase
fn check_coinbase_shape(block: &Block) -> Result<bool, BlockMutation> {
    let transactions = block.transactions();
    if transactions.first().is_some_and(is_coinbase) {
        return Ok(true);
    }
    // Without a coinbase a 64-byte transaction can be an inner node in disguise
    if transactions.iter().any(|tx| base_size(tx) == MERKLE_NODE_SIZE) {
        return Err(BlockMutation::SixtyFourByteTransaction);
    }
    Ok(false)
}

fn check_witness(block: &Block) -> Result<(), BlockMutation> {
    match check_witness_commitment(block) {
        WitnessCommitmentStatus::Valid => Ok(()),
        WitnessCommitmentStatus::Malformed => Err(BlockMutation::WitnessNonceSize),
        WitnessCommitmentStatus::Mismatched => Err(BlockMutation::WitnessMerkleMismatch),
        WitnessCommitmentStatus::Absent => {
            if block.transactions().iter().any(has_witness) {
                Err(BlockMutation::UnexpectedWitness)
            } else {
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segwit::generate_witness_commitment;

    fn coinbase() -> Transaction {
        Transaction {
            inputs: vec![TransactionInput {
                script_sig: vec![0x02, 0x10, 0x00],
                ..Default::default()
            }],
            outputs: vec![TransactionOutput {
                value: 50,
                script_pubkey: vec![0x51],
            }],
            ..Default::default()
        }
    }

    fn spend(n: u8) -> Transaction {
        Transaction {
            inputs: vec![TransactionInput {
                prevout: OutPoint {
                    hash: [n; 32],
                    index: 0,
                },
                ..Default::default()
            }],
            outputs: vec![TransactionOutput {
                value: 1,
                script_pubkey: vec![0x51, 0x52, 0x53],
            }],
            ..Default::default()
        }
    }

    fn committed(transactions: Vec<Transaction>) -> Block {
        let root = block_merkle_root(&transactions).root;
        Block::from_transactions(transactions).with_merkle_root(root)
    }

    #[test]
    fn test_empty_block() {
        assert!(!is_block_mutated(&Block::default(), true));
        let claimed = Block::default().with_merkle_root([1; 32]);
        assert_eq!(
            check_block_mutation(&claimed, false),
            Err(BlockMutation::BadMerkleRoot)
        );
    }

    #[test]
    fn test_duplicate_tail_reported() {
        let block = committed(vec![coinbase(), spend(1), spend(2)]);
        assert!(!is_block_mutated(&block, true));

        let mut txs = block.transactions().to_vec();
        txs.push(spend(2));
        let padded = block.clone().with_transactions(txs);
        assert_eq!(
            check_block_mutation(&padded, true),
            Err(BlockMutation::DuplicateTransactions)
        );
    }

    #[test]
    fn test_cached_check_skips_passed_subchecks() {
        let mut block = committed(vec![coinbase(), spend(1)]);
        assert_eq!(check_block_mutation_cached(&mut block, true), Ok(()));
        assert!(block.cache().is_checked());
        assert!(block.cache().is_merkle_root_checked());

        // Content changes drop the verdicts
        block.push_transaction(spend(2));
        assert!(!block.cache().is_checked());
        assert_eq!(
            check_block_mutation_cached(&mut block, true),
            Err(BlockMutation::BadMerkleRoot)
        );
        assert!(!block.cache().is_merkle_root_checked());

        let root = block_merkle_root(block.transactions()).root;
        block.set_merkle_root(root);
        assert_eq!(check_block_mutation_cached(&mut block, true), Ok(()));

        // Swapping one transaction in place drops them too
        assert!(block.replace_transaction(1, spend(3)).is_some());
        assert!(!block.cache().is_checked());
        assert_eq!(
            check_block_mutation_cached(&mut block, true),
            Err(BlockMutation::BadMerkleRoot)
        );
    }

    #[test]
    fn test_cached_check_without_witness_root_does_not_mark_checked() {
        let mut block = committed(vec![coinbase()]);
        assert_eq!(check_block_mutation_cached(&mut block, false), Ok(()));
        assert!(block.cache().is_merkle_root_checked());
        assert!(!block.cache().is_checked());
    }

    #[test]
    fn test_witness_checks_follow_commitment() {
        let mut with_witness = spend(1);
        with_witness.inputs[0].witness = vec![vec![0x30; 71]];
        let bare = committed(vec![coinbase(), with_witness]);
        assert_eq!(
            check_block_mutation(&bare, true),
            Err(BlockMutation::UnexpectedWitness)
        );
        assert_eq!(check_block_mutation(&bare, false), Ok(()));

        let fixed = generate_witness_commitment(&bare);
        assert_eq!(check_block_mutation(&fixed, true), Ok(()));
    }
}

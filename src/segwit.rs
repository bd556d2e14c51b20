//! Witness commitment verification and generation
//!
//! A block carrying witness data commits to it from the coinbase: the last coinbase
//! output whose script starts with [`WITNESS_COMMITMENT_HEADER`] holds
//! `hash256(witness_root || reserved_value)`, where `reserved_value` is the single
//! 32-byte element of the coinbase input's witness stack.

use crate::constants::{
    MINIMUM_WITNESS_COMMITMENT, WITNESS_COMMITMENT_HEADER, WITNESS_RESERVED_VALUE_SIZE,
};
use crate::crypto::Hash256Writer;
use crate::merkle::{block_merkle_root, witness_merkle_root};
use crate::transaction::is_coinbase;
use crate::types::*;

/// Outcome of checking a block's witness commitment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WitnessCommitmentStatus {
    /// Commitment present and equal to the recomputed value
    Valid,
    /// No commitment output, or no coinbase to carry one
    Absent,
    /// Commitment present but the coinbase witness is not one 32-byte element
    Malformed,
    /// Commitment present and different from the recomputed value
    Mismatched,
}

/// True for `OP_RETURN <36 bytes: aa21a9ed || commitment>` scripts
pub fn is_witness_commitment_script(script: &[u8]) -> bool {
    script.len() >= MINIMUM_WITNESS_COMMITMENT && script.starts_with(&WITNESS_COMMITMENT_HEADER)
}

/// Index of the commitment output in `coinbase`; the last match wins
pub fn witness_commitment_index(coinbase: &Transaction) -> Option<usize> {
    coinbase
        .outputs
        .iter()
        .rposition(|output| is_witness_commitment_script(&output.script_pubkey))
}

/// 32-byte payload following the commitment header
pub fn extract_witness_commitment(script: &[u8]) -> Option<Hash> {
    if !is_witness_commitment_script(script) {
        return None;
    }
    let start = WITNESS_COMMITMENT_HEADER.len();
    let mut commitment = [0u8; 32];
    commitment.copy_from_slice(&script[start..start + 32]);
    Some(commitment)
}

/// Reserved value carried by the coinbase input's witness.
///
/// A coinbase without witness data yields the zero value. Returns `None` when the
/// stack is present but is not exactly one 32-byte element.
pub fn witness_reserved_value(coinbase: &Transaction) -> Option<Hash> {
    let witness = match coinbase.inputs.first() {
        Some(input) => &input.witness,
        None => return Some(ZERO_HASH),
    };
    match witness.as_slice() {
        [] => Some(ZERO_HASH),
        [item] if item.len() == WITNESS_RESERVED_VALUE_SIZE => {
            let mut value = [0u8; 32];
            value.copy_from_slice(item);
            Some(value)
        }
        _ => None,
    }
}

/// `hash256(witness_root || reserved_value)`
pub fn compute_witness_commitment(witness_root: &Hash, reserved_value: &Hash) -> Hash {
    Hash256Writer::new()
        .write(witness_root)
        .write(reserved_value)
        .finalize()
}

/// Check the witness commitment of `block` against its transactions
pub fn check_witness_commitment(block: &Block) -> WitnessCommitmentStatus {
    let coinbase = match block.transactions().first() {
        Some(tx) if is_coinbase(tx) => tx,
        _ => return WitnessCommitmentStatus::Absent,
    };
    let index = match witness_commitment_index(coinbase) {
        Some(index) => index,
        None => return WitnessCommitmentStatus::Absent,
    };
    let reserved_value = match witness_reserved_value(coinbase) {
        Some(value) => value,
        None => return WitnessCommitmentStatus::Malformed,
    };

    let witness_root = witness_merkle_root(block.transactions());
    let expected = compute_witness_commitment(&witness_root, &reserved_value);
    match extract_witness_commitment(&coinbase.outputs[index].script_pubkey) {
        Some(found) if found == expected => WitnessCommitmentStatus::Valid,
        _ => WitnessCommitmentStatus::Mismatched,
    }
}

/// Commitment output script for `commitment`
pub fn witness_commitment_script(commitment: &Hash) -> ByteString {
    let mut script = Vec::with_capacity(MINIMUM_WITNESS_COMMITMENT);
    script.extend_from_slice(&WITNESS_COMMITMENT_HEADER);
    script.extend_from_slice(commitment);
    script
}

/// Rebuild `block` with a correct witness commitment.
///
/// The coinbase gets a zero reserved value unless it already carries a well-formed
/// one, its last commitment output is rewritten (or a zero-value one appended), and
/// the header's merkle root is recomputed since the coinbase txid changed. Blocks
/// without a leading coinbase are returned unchanged.
pub fn generate_witness_commitment(block: &Block) -> Block {
    let mut coinbase = match block.transactions().first() {
        Some(tx) if is_coinbase(tx) => tx.clone(),
        _ => return block.clone(),
    };

    let reserved_value = witness_reserved_value(&coinbase).unwrap_or(ZERO_HASH);
    coinbase.inputs[0].witness = vec![reserved_value.to_vec()];

    // The coinbase contributes zero to the witness root, so it can be computed first
    let witness_root = witness_merkle_root(block.transactions());
    let script = witness_commitment_script(&compute_witness_commitment(
        &witness_root,
        &reserved_value,
    ));
    match witness_commitment_index(&coinbase) {
        Some(index) => coinbase.outputs[index].script_pubkey = script,
        None => coinbase.outputs.push(TransactionOutput {
            value: 0,
            script_pubkey: script,
        }),
    }

    let mut transactions = block.transactions().to_vec();
    transactions[0] = coinbase;
    let mut header = block.header().clone();
    header.merkle_root = block_merkle_root(&transactions).root;
    Block::new(header, transactions)
}

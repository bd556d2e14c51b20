//! Error types for block integrity validation

use std::borrow::Cow;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Clone)]
pub enum ConsensusError {
    #[error("Serialization error: {0}")]
    Serialization(Cow<'static, str>),

    #[error("Invalid hash: {0}")]
    InvalidHash(Cow<'static, str>),

    #[error("Configuration error: {0}")]
    Config(Cow<'static, str>),

    #[error("Block is mutated: {0}")]
    BlockMutated(#[from] BlockMutation),
}

/// Reason a block's commitments fail to bind its transaction list.
///
/// The variant names follow the reject reasons peers exchange, so a verdict can be
/// reported upstream without translation.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum BlockMutation {
    #[error("bad-txnmrklroot: hashMerkleRoot mismatch")]
    BadMerkleRoot,

    #[error("bad-txns-duplicate: duplicate transaction")]
    DuplicateTransactions,

    #[error("bad-txns-64-byte: 64-byte transaction in block without coinbase")]
    SixtyFourByteTransaction,

    #[error("bad-witness-nonce-size: invalid witness reserved value size")]
    WitnessNonceSize,

    #[error("bad-witness-merkle-match: witness merkle commitment mismatch")]
    WitnessMerkleMismatch,

    #[error("unexpected-witness: witness data found in block without commitment")]
    UnexpectedWitness,
}

pub type Result<T> = std::result::Result<T, ConsensusError>;

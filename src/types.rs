//! Core types for block integrity validation

use crate::constants::{NULL_OUTPOINT_INDEX, SEQUENCE_FINAL};
use crate::error::{ConsensusError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Hash type: 256-bit digest, stored in internal (wire) byte order
pub type Hash = [u8; 32];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Natural number type (heights, counts)
pub type Natural = u64;

/// Amount in smallest currency units (can be negative in intermediate arithmetic)
pub type Amount = i64;

/// Witness stack attached to one transaction input
pub type Witness = Vec<ByteString>;

/// The all-zero digest
pub const ZERO_HASH: Hash = [0u8; 32];

/// Parse a display-order (byte-reversed) hex digest at compile time.
///
/// Accepts an optional `0x` prefix. A malformed literal is a compile error when used
/// in a `const` or `static` initializer.
pub const fn hash_from_hex(s: &str) -> Hash {
    let bytes = s.as_bytes();
    let start = if bytes.len() >= 2 && bytes[0] == b'0' && (bytes[1] == b'x' || bytes[1] == b'X') {
        2
    } else {
        0
    };
    assert!(bytes.len() - start == 64, "hash literal must have 64 hex digits");

    let mut out = [0u8; 32];
    let mut i = 0;
    while i < 32 {
        let hi = hex_nibble(bytes[start + 2 * i]);
        let lo = hex_nibble(bytes[start + 2 * i + 1]);
        out[31 - i] = (hi << 4) | lo;
        i += 1;
    }
    out
}

const fn hex_nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => panic!("invalid hex digit in hash literal"),
    }
}

/// Parse a display-order hex digest supplied at runtime
pub fn parse_hash_hex(s: &str) -> Result<Hash> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.len() != 64 {
        return Err(ConsensusError::InvalidHash(Cow::Owned(format!(
            "expected 64 hex digits, got {}",
            digits.len()
        ))));
    }
    let mut out = [0u8; 32];
    hex::decode_to_slice(digits, &mut out)
        .map_err(|e| ConsensusError::InvalidHash(Cow::Owned(e.to_string())))?;
    out.reverse();
    Ok(out)
}

/// Display-order hex of a digest
pub fn hash_to_hex(hash: &Hash) -> String {
    let mut reversed = *hash;
    reversed.reverse();
    hex::encode(reversed)
}

/// Block hash: newtype wrapper for type safety
///
/// Prevents mixing up block hashes with other Hash values (e.g. transaction hashes,
/// merkle roots). Displays in network (byte-reversed) order.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockHash(pub Hash);

impl BlockHash {
    /// Create a BlockHash from a display-order hex literal at compile time
    pub const fn from_hex(s: &str) -> Self {
        BlockHash(hash_from_hex(s))
    }

    #[inline]
    pub fn as_hash(&self) -> &Hash {
        &self.0
    }
}

impl From<Hash> for BlockHash {
    #[inline]
    fn from(hash: Hash) -> Self {
        BlockHash(hash)
    }
}

impl std::str::FromStr for BlockHash {
    type Err = ConsensusError;

    fn from_str(s: &str) -> Result<Self> {
        parse_hash_hex(s).map(BlockHash)
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hash_to_hex(&self.0))
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash({self})")
    }
}

/// OutPoint: reference to a previous transaction output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub hash: Hash,
    pub index: u32,
}

impl OutPoint {
    /// The null reference spent by coinbase inputs
    pub const fn null() -> Self {
        OutPoint {
            hash: ZERO_HASH,
            index: NULL_OUTPOINT_INDEX,
        }
    }

    pub fn is_null(&self) -> bool {
        self.hash == ZERO_HASH && self.index == NULL_OUTPOINT_INDEX
    }
}

/// Transaction input
///
/// The witness is excluded from the txid preimage but included in the wtxid one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub prevout: OutPoint,
    pub script_sig: ByteString,
    pub sequence: u32,
    #[serde(default)]
    pub witness: Witness,
}

impl Default for TransactionInput {
    fn default() -> Self {
        TransactionInput {
            prevout: OutPoint::null(),
            script_sig: Vec::new(),
            sequence: SEQUENCE_FINAL,
            witness: Vec::new(),
        }
    }
}

/// Transaction output
///
/// The default output carries the null value (-1), the placeholder for an output
/// whose amount has not been set yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub value: Amount,
    pub script_pubkey: ByteString,
}

impl Default for TransactionOutput {
    fn default() -> Self {
        TransactionOutput {
            value: -1,
            script_pubkey: Vec::new(),
        }
    }
}

/// Transaction: an immutable value; modifying one yields a new transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u32,
}

impl Default for Transaction {
    fn default() -> Self {
        Transaction {
            version: 2,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
        }
    }
}

/// Block header
///
/// Griffion headers carry a 64-bit nonce, the block height and the mix digest
/// produced by the proof-of-work function. Header hashing belongs to the
/// proof-of-work layer and is not performed here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_block_hash: Hash,
    pub merkle_root: Hash,
    pub timestamp: u32,
    pub bits: u32,
    pub nonce: u64,
    pub height: u32,
    pub mix_hash: Hash,
}

/// Memoized block verdicts, keyed to the block content generation.
///
/// A verdict only counts while it was recorded at the block's current generation.
/// Every content mutation bumps the generation, so stale verdicts die without the
/// caller having to clear anything.
#[derive(Debug, Clone, Default)]
pub struct ValidityCache {
    generation: u64,
    checked: Option<u64>,
    checked_merkle_root: Option<u64>,
    checked_witness_commitment: Option<u64>,
}

impl ValidityCache {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drop every recorded verdict
    pub fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn is_checked(&self) -> bool {
        self.checked == Some(self.generation)
    }

    pub fn is_merkle_root_checked(&self) -> bool {
        self.checked_merkle_root == Some(self.generation)
    }

    pub fn is_witness_commitment_checked(&self) -> bool {
        self.checked_witness_commitment == Some(self.generation)
    }

    pub fn mark_checked(&mut self) {
        self.checked = Some(self.generation);
    }

    pub fn mark_merkle_root_checked(&mut self) {
        self.checked_merkle_root = Some(self.generation);
    }

    pub fn mark_witness_commitment_checked(&mut self) {
        self.checked_witness_commitment = Some(self.generation);
    }
}

/// Block: header plus ordered transactions.
///
/// Content is reachable only through methods that invalidate the validity cache,
/// so a memoized verdict never outlives the content it was computed for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Block {
    header: BlockHeader,
    transactions: Vec<Transaction>,
    #[serde(skip)]
    cache: ValidityCache,
}

impl Block {
    pub fn new(header: BlockHeader, transactions: Vec<Transaction>) -> Self {
        Block {
            header,
            transactions,
            cache: ValidityCache::default(),
        }
    }

    /// Block with a default header and the given transactions
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        Self::new(BlockHeader::default(), transactions)
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn merkle_root(&self) -> &Hash {
        &self.header.merkle_root
    }

    pub fn cache(&self) -> &ValidityCache {
        &self.cache
    }

    pub(crate) fn cache_mut(&mut self) -> &mut ValidityCache {
        &mut self.cache
    }

    /// Same block with a different claimed merkle root
    #[must_use]
    pub fn with_merkle_root(mut self, merkle_root: Hash) -> Self {
        self.set_merkle_root(merkle_root);
        self
    }

    /// Same header with a different transaction list
    #[must_use]
    pub fn with_transactions(mut self, transactions: Vec<Transaction>) -> Self {
        self.set_transactions(transactions);
        self
    }

    pub fn set_merkle_root(&mut self, merkle_root: Hash) {
        self.header.merkle_root = merkle_root;
        self.cache.invalidate();
    }

    pub fn set_transactions(&mut self, transactions: Vec<Transaction>) {
        self.transactions = transactions;
        self.cache.invalidate();
    }

    pub fn push_transaction(&mut self, tx: Transaction) {
        self.transactions.push(tx);
        self.cache.invalidate();
    }

    /// Replace the transaction at `index`; returns the old one, or `None` when out of range
    pub fn replace_transaction(&mut self, index: usize, tx: Transaction) -> Option<Transaction> {
        let slot = self.transactions.get_mut(index)?;
        let old = std::mem::replace(slot, tx);
        self.cache.invalidate();
        Some(old)
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header && self.transactions == other.transactions
    }
}

impl Eq for Block {}

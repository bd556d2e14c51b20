//! Griffion consensus constants

use crate::types::{Amount, Natural};

/// Smallest units per GRIFF
pub const COIN: Amount = 100_000_000;

/// Maximum money supply: 11,000,000,000 GRIFF in smallest units
///
/// This is a sanity bound used by consensus-critical code, and also the point at
/// which issuance stops. Changing it forks the chain.
pub const MAX_MONEY: Amount = 11_000_000_000 * COIN;

/// Genesis and initial block subsidy: 5000 GRIFF
pub const INITIAL_SUBSIDY: Amount = 5_000 * COIN;

/// Halving interval on main and test networks (about two years of one-minute blocks)
pub const HALVING_INTERVAL: Natural = 1_051_200;

/// Halving interval on the regression test network
pub const REGTEST_HALVING_INTERVAL: Natural = 1_051;

/// Number of halvings after which the subsidy stops shrinking
pub const TAIL_EMISSION_HALVINGS: Natural = 7;

/// Shifting an i64 by this many bits or more leaves nothing
pub const MAX_HALVINGS: Natural = 64;

/// Serialized size (without witness) that makes a transaction indistinguishable
/// from an inner merkle node
pub const MERKLE_NODE_SIZE: usize = 64;

/// OP_RETURN opcode
pub const OP_RETURN: u8 = 0x6a;

/// Witness commitment output prefix: OP_RETURN, push 36, magic 0xaa21a9ed
pub const WITNESS_COMMITMENT_HEADER: [u8; 6] = [OP_RETURN, 0x24, 0xaa, 0x21, 0xa9, 0xed];

/// Minimum script length of a witness commitment output (prefix + 32-byte payload)
pub const MINIMUM_WITNESS_COMMITMENT: usize = 38;

/// Size of the witness reserved value carried by the coinbase input
pub const WITNESS_RESERVED_VALUE_SIZE: usize = 32;

/// Previous-output index of a null outpoint
pub const NULL_OUTPOINT_INDEX: u32 = 0xffff_ffff;

/// Sequence number for final inputs
pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

/// Upper bound on any element count read off the wire before allocation
pub const MAX_WIRE_ITEMS: u64 = 1_000_000;

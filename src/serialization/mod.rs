//! Griffion wire format serialization/deserialization
//!
//! Transactions are hashed over their wire encoding, so these functions define txids
//! and wtxids. All integers are little-endian.

pub mod transaction;
pub mod varint;

pub use transaction::{
    deserialize_transaction, deserialize_transaction_no_witness, serialize_transaction,
    serialize_transaction_with_witness, serialized_size, TransactionParseError,
};
pub use varint::{decode_varint, encode_varint, varint_size, VarIntError};

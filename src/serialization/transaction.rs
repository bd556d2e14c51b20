//! Transaction wire format serialization/deserialization
//!
//! Base format (txid preimage):
//! - Version (4 bytes, little-endian, signed)
//! - Input count (VarInt), then per input: previous output hash (32 bytes),
//!   previous output index (4 bytes), script length (VarInt), script, sequence (4 bytes)
//! - Output count (VarInt), then per output: value (8 bytes), script length (VarInt), script
//! - Lock time (4 bytes)
//!
//! Extended format (wtxid preimage), used only when some input has a witness:
//! marker `0x00` and flag `0x01` after the version, and after the outputs one witness
//! stack per input (item count, then length-prefixed items).

use super::varint::{decode_varint, encode_varint_into, varint_size};
use crate::constants::MAX_WIRE_ITEMS;
use crate::error::{ConsensusError, Result};
use crate::transaction::has_witness;
use crate::types::*;
use std::borrow::Cow;
use thiserror::Error;

/// Error type for transaction parsing failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionParseError {
    #[error("Insufficient bytes to parse transaction")]
    InsufficientBytes,
    #[error("Invalid input count")]
    InvalidInputCount,
    #[error("Invalid output count")]
    InvalidOutputCount,
    #[error("Invalid witness item count")]
    InvalidWitnessCount,
    #[error("Unknown transaction optional data")]
    UnknownOptionalData,
    #[error("Superfluous witness record")]
    SuperfluousWitness,
    #[error("Trailing bytes after transaction")]
    TrailingBytes,
}

impl From<TransactionParseError> for ConsensusError {
    fn from(e: TransactionParseError) -> Self {
        ConsensusError::Serialization(Cow::Owned(e.to_string()))
    }
}

/// Serialize without witness data (txid preimage)
pub fn serialize_transaction(tx: &Transaction) -> Vec<u8> {
    let mut out = Vec::with_capacity(serialized_size(tx, false));
    write_transaction(&mut out, tx, false);
    out
}

/// Serialize with witness data when present (wtxid preimage)
///
/// Identical to [`serialize_transaction`] for transactions without witnesses.
pub fn serialize_transaction_with_witness(tx: &Transaction) -> Vec<u8> {
    let with_witness = has_witness(tx);
    let mut out = Vec::with_capacity(serialized_size(tx, with_witness));
    write_transaction(&mut out, tx, with_witness);
    out
}

/// Serialized length, computed without allocating
pub fn serialized_size(tx: &Transaction, with_witness: bool) -> usize {
    let inputs: usize = tx
        .inputs
        .iter()
        .map(|i| 32 + 4 + varint_size(i.script_sig.len() as u64) + i.script_sig.len() + 4)
        .sum();
    let outputs: usize = tx
        .outputs
        .iter()
        .map(|o| 8 + varint_size(o.script_pubkey.len() as u64) + o.script_pubkey.len())
        .sum();
    let mut size = 4
        + varint_size(tx.inputs.len() as u64)
        + inputs
        + varint_size(tx.outputs.len() as u64)
        + outputs
        + 4;

    if with_witness && has_witness(tx) {
        size += 2;
        for input in &tx.inputs {
            size += varint_size(input.witness.len() as u64);
            size += input
                .witness
                .iter()
                .map(|item| varint_size(item.len() as u64) + item.len())
                .sum::<usize>();
        }
    }
    size
}

fn write_transaction(out: &mut Vec<u8>, tx: &Transaction, with_witness: bool) {
    out.extend_from_slice(&tx.version.to_le_bytes());

    if with_witness {
        // Marker and flag
        out.extend_from_slice(&[0x00, 0x01]);
    }

    encode_varint_into(out, tx.inputs.len() as u64);
    for input in &tx.inputs {
        out.extend_from_slice(&input.prevout.hash);
        out.extend_from_slice(&input.prevout.index.to_le_bytes());
        encode_varint_into(out, input.script_sig.len() as u64);
        out.extend_from_slice(&input.script_sig);
        out.extend_from_slice(&input.sequence.to_le_bytes());
    }

    encode_varint_into(out, tx.outputs.len() as u64);
    for output in &tx.outputs {
        out.extend_from_slice(&output.value.to_le_bytes());
        encode_varint_into(out, output.script_pubkey.len() as u64);
        out.extend_from_slice(&output.script_pubkey);
    }

    if with_witness {
        for input in &tx.inputs {
            encode_varint_into(out, input.witness.len() as u64);
            for item in &input.witness {
                encode_varint_into(out, item.len() as u64);
                out.extend_from_slice(item);
            }
        }
    }

    out.extend_from_slice(&tx.lock_time.to_le_bytes());
}

/// Deserialize a transaction, accepting the extended witness layout.
///
/// The whole buffer must be consumed.
pub fn deserialize_transaction(data: &[u8]) -> Result<Transaction> {
    deserialize_exact(data, true)
}

/// Deserialize a transaction in base layout only.
///
/// Needed for transactions with no inputs, whose base encoding would otherwise be
/// read as a witness marker.
pub fn deserialize_transaction_no_witness(data: &[u8]) -> Result<Transaction> {
    deserialize_exact(data, false)
}

fn deserialize_exact(data: &[u8], allow_witness: bool) -> Result<Transaction> {
    let mut reader = Reader::new(data);
    let tx = read_transaction(&mut reader, allow_witness)?;
    if !reader.is_empty() {
        return Err(TransactionParseError::TrailingBytes.into());
    }
    Ok(tx)
}

fn read_transaction(reader: &mut Reader<'_>, allow_witness: bool) -> Result<Transaction> {
    let version = i32::from_le_bytes(reader.array()?);

    let mut inputs = read_inputs(reader)?;
    let mut flags = 0u8;
    let outputs;
    if inputs.is_empty() && allow_witness {
        // Empty input vector is the extended-format marker
        flags = reader.byte()?;
        if flags != 0 {
            inputs = read_inputs(reader)?;
            outputs = read_outputs(reader)?;
        } else {
            outputs = Vec::new();
        }
    } else {
        outputs = read_outputs(reader)?;
    }

    if flags & 1 != 0 && allow_witness {
        flags ^= 1;
        for input in inputs.iter_mut() {
            input.witness = read_witness(reader)?;
        }
        if inputs.iter().all(|input| input.witness.is_empty()) {
            return Err(TransactionParseError::SuperfluousWitness.into());
        }
    }
    if flags != 0 {
        return Err(TransactionParseError::UnknownOptionalData.into());
    }

    let lock_time = u32::from_le_bytes(reader.array()?);

    Ok(Transaction {
        version,
        inputs,
        outputs,
        lock_time,
    })
}

fn read_inputs(reader: &mut Reader<'_>) -> Result<Vec<TransactionInput>> {
    let count = reader.count(TransactionParseError::InvalidInputCount)?;
    let mut inputs = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let hash: Hash = reader.array()?;
        let index = u32::from_le_bytes(reader.array()?);
        let script_sig = reader.var_bytes()?;
        let sequence = u32::from_le_bytes(reader.array()?);
        inputs.push(TransactionInput {
            prevout: OutPoint { hash, index },
            script_sig,
            sequence,
            witness: Vec::new(),
        });
    }
    Ok(inputs)
}

fn read_outputs(reader: &mut Reader<'_>) -> Result<Vec<TransactionOutput>> {
    let count = reader.count(TransactionParseError::InvalidOutputCount)?;
    let mut outputs = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let value = i64::from_le_bytes(reader.array()?);
        let script_pubkey = reader.var_bytes()?;
        outputs.push(TransactionOutput {
            value,
            script_pubkey,
        });
    }
    Ok(outputs)
}

fn read_witness(reader: &mut Reader<'_>) -> Result<Witness> {
    let count = reader.count(TransactionParseError::InvalidWitnessCount)?;
    let mut stack = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        stack.push(reader.var_bytes()?);
    }
    Ok(stack)
}

/// Forward-only cursor over a byte slice
struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Reader { data }
    }

    fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.data.len() < len {
            return Err(TransactionParseError::InsufficientBytes.into());
        }
        let (head, tail) = self.data.split_at(len);
        self.data = tail;
        Ok(head)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn byte(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn varint(&mut self) -> Result<u64> {
        let (value, len) = decode_varint(self.data)?;
        self.data = &self.data[len..];
        Ok(value)
    }

    fn count(&mut self, too_large: TransactionParseError) -> Result<usize> {
        let count = self.varint()?;
        if count > MAX_WIRE_ITEMS {
            return Err(too_large.into());
        }
        Ok(count as usize)
    }

    fn var_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.varint()?;
        let len = usize::try_from(len).map_err(|_| TransactionParseError::InsufficientBytes)?;
        Ok(self.take(len)?.to_vec())
    }
}

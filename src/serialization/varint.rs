//! VarInt (CompactSize) encoding/decoding
//!
//! Encoding rules:
//! - If value < 0xfd: single byte
//! - If value <= 0xffff: 0xfd prefix + 2 bytes (little-endian)
//! - If value <= 0xffffffff: 0xfe prefix + 4 bytes (little-endian)
//! - Otherwise: 0xff prefix + 8 bytes (little-endian)
//!
//! Decoding rejects non-canonical encodings, matching the reference node.

use crate::error::{ConsensusError, Result};
use std::borrow::Cow;
use thiserror::Error;

/// Error type for VarInt decoding failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VarIntError {
    #[error("Insufficient bytes to decode VarInt")]
    InsufficientBytes,
    #[error("Non-canonical VarInt encoding")]
    NonCanonical,
}

impl From<VarIntError> for ConsensusError {
    fn from(e: VarIntError) -> Self {
        ConsensusError::Serialization(Cow::Owned(e.to_string()))
    }
}

/// Append the VarInt encoding of `value` to `out`
pub fn encode_varint_into(out: &mut Vec<u8>, value: u64) {
    if value < 0xfd {
        out.push(value as u8);
    } else if value <= 0xffff {
        out.push(0xfd);
        out.extend_from_slice(&(value as u16).to_le_bytes());
    } else if value <= 0xffff_ffff {
        out.push(0xfe);
        out.extend_from_slice(&(value as u32).to_le_bytes());
    } else {
        out.push(0xff);
        out.extend_from_slice(&value.to_le_bytes());
    }
}

/// Encode a u64 value as a VarInt
///
/// ```
/// use griffion_consensus::serialization::varint::encode_varint;
///
/// assert_eq!(encode_varint(0), vec![0]);
/// assert_eq!(encode_varint(252), vec![252]);
/// assert_eq!(encode_varint(253), vec![0xfd, 253, 0]);
/// assert_eq!(encode_varint(65536), vec![0xfe, 0, 0, 1, 0]);
/// ```
pub fn encode_varint(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(varint_size(value));
    encode_varint_into(&mut out, value);
    out
}

/// Number of bytes the VarInt encoding of `value` occupies
pub fn varint_size(value: u64) -> usize {
    match value {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

/// Decode a VarInt, returning the value and the number of bytes consumed
///
/// ```
/// use griffion_consensus::serialization::varint::decode_varint;
///
/// assert_eq!(decode_varint(&[252]).unwrap(), (252, 1));
/// assert_eq!(decode_varint(&[0xfd, 253, 0]).unwrap(), (253, 3));
/// assert!(decode_varint(&[0xfd, 1, 0]).is_err());
/// assert!(decode_varint(&[]).is_err());
/// ```
pub fn decode_varint(data: &[u8]) -> Result<(u64, usize)> {
    let (&first, rest) = data.split_first().ok_or(VarIntError::InsufficientBytes)?;

    let (value, len, min) = match first {
        b if b < 0xfd => return Ok((b as u64, 1)),
        0xfd => {
            let bytes: [u8; 2] = read_array(rest)?;
            (u16::from_le_bytes(bytes) as u64, 3, 0xfd)
        }
        0xfe => {
            let bytes: [u8; 4] = read_array(rest)?;
            (u32::from_le_bytes(bytes) as u64, 5, 0x1_0000)
        }
        _ => {
            let bytes: [u8; 8] = read_array(rest)?;
            (u64::from_le_bytes(bytes), 9, 0x1_0000_0000)
        }
    };

    if value < min {
        return Err(VarIntError::NonCanonical.into());
    }
    Ok((value, len))
}

fn read_array<const N: usize>(data: &[u8]) -> std::result::Result<[u8; N], VarIntError> {
    data.get(..N)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(VarIntError::InsufficientBytes)
}

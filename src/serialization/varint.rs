//! Bitcoin VarInt encoding/decoding
//!
//! Encoding rules:
//! - value < 0xfd: single byte
//! - value <= 0xffff: 0xfd prefix + 2 bytes (little-endian)
//! - value <= 0xffffffff: 0xfe prefix + 4 bytes (little-endian)
//! - otherwise: 0xff prefix + 8 bytes (little-endian)
//!
//! Decoding rejects non-canonical encodings (a value that would fit a shorter
//! form).

use crate::error::{ConsensusError, Result};
use std::borrow::Cow;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
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

/// Number of bytes `encode_varint(value)` produces.
#[inline]
pub fn varint_size(value: u64) -> usize {
    match value {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

/// Append the VarInt encoding of `value` to `out`.
pub fn write_varint(out: &mut Vec<u8>, value: u64) {
    match value {
        0..=0xfc => out.push(value as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(value as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(value as u32).to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&value.to_le_bytes());
        }
    }
}

/// Encode a u64 value as a Bitcoin VarInt
///
/// ```
/// use novo_consensus::serialization::varint::encode_varint;
///
/// assert_eq!(encode_varint(252), vec![252]);
/// assert_eq!(encode_varint(253), vec![0xfd, 253, 0]);
/// assert_eq!(encode_varint(65536), vec![0xfe, 0, 0, 1, 0]);
/// ```
pub fn encode_varint(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(varint_size(value));
    write_varint(&mut out, value);
    out
}

/// Decode a Bitcoin VarInt, returning the value and the number of bytes consumed.
pub fn decode_varint(data: &[u8]) -> Result<(u64, usize)> {
    let (&prefix, rest) = data.split_first().ok_or(VarIntError::InsufficientBytes)?;
    let (width, min) = match prefix {
        0..=0xfc => return Ok((prefix as u64, 1)),
        0xfd => (2, 0xfd),
        0xfe => (4, 0x1_0000),
        0xff => (8, 0x1_0000_0000),
    };
    let bytes = rest.get(..width).ok_or(VarIntError::InsufficientBytes)?;
    let mut le = [0u8; 8];
    le[..width].copy_from_slice(bytes);
    let value = u64::from_le_bytes(le);
    if value < min {
        return Err(VarIntError::NonCanonical.into());
    }
    Ok((value, 1 + width))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_boundaries() {
        assert_eq!(encode_varint(0), vec![0]);
        assert_eq!(encode_varint(0xfc), vec![0xfc]);
        assert_eq!(encode_varint(0xfd), vec![0xfd, 0xfd, 0]);
        assert_eq!(encode_varint(0xffff), vec![0xfd, 255, 255]);
        assert_eq!(encode_varint(0x1_0000), vec![0xfe, 0, 0, 1, 0]);
        assert_eq!(encode_varint(0xffff_ffff), vec![0xfe, 255, 255, 255, 255]);
        assert_eq!(
            encode_varint(0x1_0000_0000),
            vec![0xff, 0, 0, 0, 0, 1, 0, 0, 0]
        );
        for v in [0u64, 0xfc, 0xfd, 0xffff, 0x1_0000, u64::MAX] {
            assert_eq!(encode_varint(v).len(), varint_size(v));
        }
    }

    #[test]
    fn test_decode_boundaries() {
        assert_eq!(decode_varint(&[252]), Ok((252, 1)));
        assert_eq!(decode_varint(&[0xfd, 253, 0]), Ok((253, 3)));
        assert_eq!(decode_varint(&[0xfe, 0, 0, 1, 0, 0xaa]), Ok((65536, 5)));
        assert_eq!(
            decode_varint(&[0xff, 255, 255, 255, 255, 255, 255, 255, 255]),
            Ok((u64::MAX, 9))
        );
    }

    #[test]
    fn test_decode_insufficient_bytes() {
        assert!(decode_varint(&[]).is_err());
        assert!(decode_varint(&[0xfd, 0]).is_err());
        assert!(decode_varint(&[0xfe, 0, 0, 0]).is_err());
        assert!(decode_varint(&[0xff, 0, 0, 0, 0, 0, 0, 0]).is_err());
    }

    #[test]
    fn test_decode_rejects_non_canonical() {
        assert!(decode_varint(&[0xfd, 252, 0]).is_err());
        assert!(decode_varint(&[0xfe, 255, 255, 0, 0]).is_err());
        assert!(decode_varint(&[0xff, 255, 255, 255, 255, 0, 0, 0, 0]).is_err());
    }
}

//! Transaction wire format serialization/deserialization
//!
//! Layout:
//! - Version (4 bytes, little-endian, signed)
//! - Input count (VarInt), then per input: prevout hash (32), prevout index (4),
//!   scriptSig length (VarInt), scriptSig, sequence (4)
//! - Output count (VarInt), then per output: value (8), scriptPubKey length
//!   (VarInt), scriptPubKey
//! - Lock time (4 bytes, little-endian)

use super::varint::{decode_varint, varint_size, write_varint};
use crate::error::{ConsensusError, Result};
use crate::types::*;
use std::borrow::Cow;
use thiserror::Error;

/// Upper bound on counts accepted while decoding, far above anything a
/// consensus-sized transaction can hold.
const MAX_DECODED_COUNT: u64 = 1 << 24;

/// Capacity reserved up front; a declared count is not trusted further.
const PREALLOC_LIMIT: u64 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransactionParseError {
    #[error("Insufficient bytes to parse transaction")]
    InsufficientBytes,
    #[error("Invalid input count")]
    InvalidInputCount,
    #[error("Invalid output count")]
    InvalidOutputCount,
    #[error("Trailing bytes after transaction")]
    TrailingBytes,
}

impl From<TransactionParseError> for ConsensusError {
    fn from(e: TransactionParseError) -> Self {
        ConsensusError::Serialization(Cow::Owned(e.to_string()))
    }
}

/// Forward-only cursor over wire bytes.
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Reader { data, offset: 0 }
    }

    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or(TransactionParseError::InsufficientBytes)?;
        let bytes = &self.data[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    pub(crate) fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub(crate) fn u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    pub(crate) fn varint(&mut self) -> Result<u64> {
        let (value, len) = decode_varint(&self.data[self.offset..])?;
        self.offset += len;
        Ok(value)
    }

    fn var_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.varint()?;
        let len = usize::try_from(len).map_err(|_| TransactionParseError::InsufficientBytes)?;
        Ok(self.take(len)?.to_vec())
    }
}

/// Serialized size of one output.
pub fn serialized_output_size(output: &TransactionOutput) -> usize {
    8 + varint_size(output.script_pubkey.len() as u64) + output.script_pubkey.len()
}

/// Serialized size of a transaction without building the bytes.
pub fn serialized_transaction_size(tx: &Transaction) -> usize {
    let inputs: usize = tx
        .inputs
        .iter()
        .map(|i| 36 + varint_size(i.script_sig.len() as u64) + i.script_sig.len() + 4)
        .sum();
    let outputs: usize = tx.outputs.iter().map(serialized_output_size).sum();
    4 + varint_size(tx.inputs.len() as u64)
        + inputs
        + varint_size(tx.outputs.len() as u64)
        + outputs
        + 4
}

pub fn write_outpoint(out: &mut Vec<u8>, prevout: &OutPoint) {
    out.extend_from_slice(&prevout.hash);
    out.extend_from_slice(&prevout.index.to_le_bytes());
}

pub fn write_output(out: &mut Vec<u8>, output: &TransactionOutput) {
    out.extend_from_slice(&output.value.to_le_bytes());
    write_varint(out, output.script_pubkey.len() as u64);
    out.extend_from_slice(&output.script_pubkey);
}

/// Append the wire encoding of `tx` to `out`.
pub fn write_transaction(out: &mut Vec<u8>, tx: &Transaction) {
    out.extend_from_slice(&tx.version.to_le_bytes());

    write_varint(out, tx.inputs.len() as u64);
    for input in &tx.inputs {
        write_outpoint(out, &input.prevout);
        write_varint(out, input.script_sig.len() as u64);
        out.extend_from_slice(&input.script_sig);
        out.extend_from_slice(&input.sequence.to_le_bytes());
    }

    write_varint(out, tx.outputs.len() as u64);
    for output in &tx.outputs {
        write_output(out, output);
    }

    out.extend_from_slice(&tx.lock_time.to_le_bytes());
}

/// Serialize a transaction to wire format
pub fn serialize_transaction(tx: &Transaction) -> Vec<u8> {
    let mut out = Vec::with_capacity(serialized_transaction_size(tx));
    write_transaction(&mut out, tx);
    out
}

pub(crate) fn read_transaction(reader: &mut Reader<'_>) -> Result<Transaction> {
    let version = i32::from_le_bytes(reader.array()?);

    let input_count = reader.varint()?;
    if input_count > MAX_DECODED_COUNT {
        return Err(TransactionParseError::InvalidInputCount.into());
    }
    let mut inputs = Vec::with_capacity(input_count.min(PREALLOC_LIMIT) as usize);
    for _ in 0..input_count {
        let hash = reader.array::<32>()?;
        let index = reader.u32_le()?;
        let script_sig = reader.var_bytes()?;
        let sequence = reader.u32_le()?;
        inputs.push(TransactionInput {
            prevout: OutPoint { hash, index },
            script_sig,
            sequence,
        });
    }

    let output_count = reader.varint()?;
    if output_count > MAX_DECODED_COUNT {
        return Err(TransactionParseError::InvalidOutputCount.into());
    }
    let mut outputs = Vec::with_capacity(output_count.min(PREALLOC_LIMIT) as usize);
    for _ in 0..output_count {
        let value = i64::from_le_bytes(reader.array()?);
        let script_pubkey = reader.var_bytes()?;
        outputs.push(TransactionOutput {
            value,
            script_pubkey,
        });
    }

    let lock_time = reader.u32_le()?;

    Ok(Transaction {
        version,
        inputs,
        outputs,
        lock_time,
    })
}

/// Deserialize a transaction from wire format. The whole slice must be consumed.
pub fn deserialize_transaction(data: &[u8]) -> Result<Transaction> {
    let mut reader = Reader::new(data);
    let tx = read_transaction(&mut reader)?;
    if reader.offset() != data.len() {
        return Err(TransactionParseError::TrailingBytes.into());
    }
    Ok(tx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tx() -> Transaction {
        Transaction {
            version: 1,
            inputs: vec![TransactionInput {
                prevout: OutPoint {
                    hash: [1; 32],
                    index: 7,
                },
                script_sig: vec![0x51],
                sequence: 0xffff_fffe,
            }],
            outputs: vec![TransactionOutput {
                value: 50_000,
                script_pubkey: vec![0x51],
            }],
            lock_time: 99,
        }
    }

    #[test]
    fn test_wire_layout() {
        let bytes = serialize_transaction(&sample_tx());
        assert_eq!(&bytes[..4], &[1, 0, 0, 0]);
        assert_eq!(bytes[4], 1);
        assert_eq!(&bytes[37..41], &[7, 0, 0, 0]);
        assert_eq!(&bytes[bytes.len() - 4..], &[99, 0, 0, 0]);
        assert_eq!(bytes.len(), serialized_transaction_size(&sample_tx()));
    }

    #[test]
    fn test_deserialize_restores_transaction() {
        let tx = sample_tx();
        assert_eq!(deserialize_transaction(&serialize_transaction(&tx)).unwrap(), tx);
    }

    #[test]
    fn test_negative_version_survives() {
        let mut tx = sample_tx();
        tx.version = -3;
        let bytes = serialize_transaction(&tx);
        assert_eq!(deserialize_transaction(&bytes).unwrap().version, -3);
    }

    #[test]
    fn test_deserialize_insufficient_bytes() {
        assert!(deserialize_transaction(&[]).is_err());
        assert!(deserialize_transaction(&[0, 0, 0, 0]).is_err());
        assert!(deserialize_transaction(&[0, 0, 0, 0, 1]).is_err());
        let bytes = serialize_transaction(&sample_tx());
        assert!(deserialize_transaction(&bytes[..bytes.len() - 1]).is_err());
    }

    #[test]
    fn test_deserialize_rejects_trailing_bytes() {
        let mut bytes = serialize_transaction(&sample_tx());
        bytes.push(0);
        assert_eq!(
            deserialize_transaction(&bytes),
            Err(TransactionParseError::TrailingBytes.into())
        );
    }
}

//! Block header and block wire format serialization/deserialization

use super::transaction::{read_transaction, write_transaction, Reader, TransactionParseError};
use super::varint::write_varint;
use crate::error::{ConsensusError, Result};
use crate::types::*;
use std::borrow::Cow;
use thiserror::Error;

pub const BLOCK_HEADER_SIZE: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BlockParseError {
    #[error("Insufficient bytes to parse block header")]
    InsufficientBytes,
    #[error("Invalid transaction count")]
    InvalidTransactionCount,
}

impl From<BlockParseError> for ConsensusError {
    fn from(e: BlockParseError) -> Self {
        ConsensusError::Serialization(Cow::Owned(e.to_string()))
    }
}

/// Serialize a block header to its 80-byte wire form
///
/// - Version (4 bytes, little-endian)
/// - Previous block hash (32 bytes)
/// - Merkle root (32 bytes)
/// - Timestamp, bits, nonce (4 bytes each, little-endian)
pub fn serialize_block_header(header: &BlockHeader) -> [u8; BLOCK_HEADER_SIZE] {
    let mut out = [0u8; BLOCK_HEADER_SIZE];
    out[0..4].copy_from_slice(&header.version.to_le_bytes());
    out[4..36].copy_from_slice(&header.prev_block_hash);
    out[36..68].copy_from_slice(&header.merkle_root);
    out[68..72].copy_from_slice(&header.timestamp.to_le_bytes());
    out[72..76].copy_from_slice(&header.bits.to_le_bytes());
    out[76..80].copy_from_slice(&header.nonce.to_le_bytes());
    out
}

fn read_block_header(reader: &mut Reader<'_>) -> Result<BlockHeader> {
    Ok(BlockHeader {
        version: i32::from_le_bytes(reader.array()?),
        prev_block_hash: reader.array()?,
        merkle_root: reader.array()?,
        timestamp: reader.u32_le()?,
        bits: reader.u32_le()?,
        nonce: reader.u32_le()?,
    })
}

/// Deserialize a block header from the first 80 bytes of `data`
pub fn deserialize_block_header(data: &[u8]) -> Result<BlockHeader> {
    if data.len() < BLOCK_HEADER_SIZE {
        return Err(BlockParseError::InsufficientBytes.into());
    }
    read_block_header(&mut Reader::new(data))
}

/// Header followed by the transaction count and every transaction.
pub fn serialize_block(block: &Block) -> Vec<u8> {
    let mut out = Vec::with_capacity(BLOCK_HEADER_SIZE + 1 + block.transactions.len() * 256);
    out.extend_from_slice(&serialize_block_header(&block.header));
    write_varint(&mut out, block.transactions.len() as u64);
    for tx in block.transactions.iter() {
        write_transaction(&mut out, tx);
    }
    out
}

/// Deserialize a complete block. A block must contain at least one
/// transaction and the slice must be consumed exactly.
pub fn deserialize_block(data: &[u8]) -> Result<Block> {
    if data.len() < BLOCK_HEADER_SIZE {
        return Err(BlockParseError::InsufficientBytes.into());
    }
    let mut reader = Reader::new(data);
    let header = read_block_header(&mut reader)?;

    let tx_count = reader.varint()?;
    // Every transaction needs at least 10 bytes on the wire.
    if tx_count == 0 || tx_count > (data.len() / 10) as u64 {
        return Err(BlockParseError::InvalidTransactionCount.into());
    }
    let mut transactions = Vec::with_capacity(tx_count as usize);
    for _ in 0..tx_count {
        transactions.push(read_transaction(&mut reader)?);
    }
    if reader.offset() != data.len() {
        return Err(TransactionParseError::TrailingBytes.into());
    }

    Ok(Block {
        header,
        transactions: transactions.into_boxed_slice(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> BlockHeader {
        BlockHeader {
            version: 1,
            prev_block_hash: [0x11; 32],
            merkle_root: [0x22; 32],
            timestamp: 0x0102_0304,
            bits: 0x1d00_ffff,
            nonce: 42,
        }
    }

    #[test]
    fn test_header_layout() {
        let bytes = serialize_block_header(&header());
        assert_eq!(&bytes[0..4], &[1, 0, 0, 0]);
        assert_eq!(bytes[4], 0x11);
        assert_eq!(bytes[36], 0x22);
        assert_eq!(&bytes[68..72], &[4, 3, 2, 1]);
        assert_eq!(&bytes[72..76], &[0xff, 0xff, 0x00, 0x1d]);
        assert_eq!(deserialize_block_header(&bytes).unwrap(), header());
    }

    #[test]
    fn test_header_too_short() {
        assert!(deserialize_block_header(&[0u8; 79]).is_err());
    }

    #[test]
    fn test_block_requires_transactions() {
        let mut bytes = serialize_block_header(&header()).to_vec();
        bytes.push(0);
        assert_eq!(
            deserialize_block(&bytes),
            Err(BlockParseError::InvalidTransactionCount.into())
        );
    }

    #[test]
    fn test_block_bytes_restore_block() {
        let tx = Transaction {
            version: 1,
            inputs: vec![TransactionInput {
                prevout: OutPoint::null(),
                script_sig: vec![0x01, 0x01],
                sequence: u32::MAX,
            }],
            outputs: vec![TransactionOutput {
                value: 1,
                script_pubkey: vec![0x51],
            }],
            lock_time: 0,
        };
        let block = Block {
            header: header(),
            transactions: vec![tx.clone(), tx].into_boxed_slice(),
        };
        let bytes = serialize_block(&block);
        assert_eq!(deserialize_block(&bytes).unwrap(), block);
    }
}

//! Core transaction and block types

use serde::{Deserialize, Serialize};

/// Hash type: 256-bit hash in internal (little-endian) byte order
pub type Hash = [u8; 32];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Amount in base units
pub type Amount = i64;

/// Decode a display-order hex string (as printed by explorers) into internal order.
pub fn hash_from_display_hex(s: &str) -> Option<Hash> {
    let mut bytes = hex::decode(s).ok()?;
    if bytes.len() != 32 {
        return None;
    }
    bytes.reverse();
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Some(out)
}

/// Encode an internal-order hash as a display-order hex string.
pub fn hash_to_display_hex(hash: &Hash) -> String {
    let mut bytes = *hash;
    bytes.reverse();
    hex::encode(bytes)
}

/// Reference to a previous transaction output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutPoint {
    pub hash: Hash,
    pub index: u32,
}

impl OutPoint {
    /// The null outpoint spent by coinbase inputs
    pub fn null() -> Self {
        OutPoint {
            hash: [0u8; 32],
            index: u32::MAX,
        }
    }

    pub fn is_null(&self) -> bool {
        self.hash == [0u8; 32] && self.index == u32::MAX
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub prevout: OutPoint,
    pub script_sig: ByteString,
    pub sequence: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub value: Amount,
    pub script_pubkey: ByteString,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u32,
}

/// 80-byte block header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_block_hash: Hash,
    pub merkle_root: Hash,
    pub timestamp: u32,
    pub bits: u32,
    pub nonce: u32,
}

/// Transactions are never modified after block creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Box<[Transaction]>,
}

/// Unspent output together with the height of the block that created it
///
/// A height of [`crate::constants::MEMPOOL_HEIGHT`] marks a coin created by an
/// unconfirmed transaction; a height of 0 marks a coin whose height is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub output: TransactionOutput,
    pub height: u32,
    pub is_coinbase: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_hex_is_reversed() {
        let hex = "0000000000b3de1ef5bd7c20708dbafc3df0441877fa4a59cda22b4c2d4f39ce";
        let hash = hash_from_display_hex(hex).unwrap();
        assert_eq!(hash[31], 0x00);
        assert_eq!(hash[0], 0xce);
        assert_eq!(hash_to_display_hex(&hash), hex);
    }

    #[test]
    fn test_null_outpoint() {
        assert!(OutPoint::null().is_null());
        let op = OutPoint {
            hash: [1; 32],
            index: 0,
        };
        assert!(!op.is_null());
    }

    #[test]
    fn test_bad_hex_rejected() {
        assert!(hash_from_display_hex("zz").is_none());
        assert!(hash_from_display_hex("00").is_none());
    }
}

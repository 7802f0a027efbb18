//! Transaction digest signed by CHECKSIG
//!
//! The digest commits to the amount of the output being spent, so a signer
//! can sign offline without the previous transaction. Its preimage is:
//!
//! ```text
//! version || hashPrevouts || hashSequence || prevout || scriptCode
//!         || amount || sequence || hashOutputs || locktime || sighash type
//! ```
//!
//! `hashPrevouts`, `hashSequence` and `hashOutputs` are double-SHA256
//! aggregates that the hash type may blank to zero.

use crate::crypto::{hash256, Hash256Writer};
use crate::error::{ConsensusError, Result};
use crate::serialization::transaction::{write_outpoint, write_output};
use crate::serialization::varint::write_varint;
use crate::types::*;

pub const SIGHASH_ALL: u32 = 0x01;
pub const SIGHASH_NONE: u32 = 0x02;
pub const SIGHASH_SINGLE: u32 = 0x03;
pub const SIGHASH_ANYONECANPAY: u32 = 0x80;

/// Hash type byte appended to every signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SigHashType(u32);

impl SigHashType {
    pub const ALL: SigHashType = SigHashType(SIGHASH_ALL);

    pub fn new(raw: u32) -> Self {
        SigHashType(raw)
    }

    /// The hash type carried in the last byte of a signature. An empty
    /// signature has hash type 0.
    pub fn from_signature(sig: &[u8]) -> Self {
        SigHashType(sig.last().copied().unwrap_or(0) as u32)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn with_anyone_can_pay(self) -> Self {
        SigHashType(self.0 | SIGHASH_ANYONECANPAY)
    }

    /// ALL, NONE or SINGLE, with the modifier bits masked off.
    pub fn base_type(self) -> u32 {
        self.0 & 0x1f
    }

    pub fn has_anyone_can_pay(self) -> bool {
        self.0 & SIGHASH_ANYONECANPAY != 0
    }

    /// Only ALL, NONE and SINGLE (optionally with ANYONECANPAY) are defined.
    pub fn is_defined(self) -> bool {
        let without_acp = self.0 & !SIGHASH_ANYONECANPAY;
        (SIGHASH_ALL..=SIGHASH_SINGLE).contains(&without_acp)
    }
}

impl Default for SigHashType {
    fn default() -> Self {
        SigHashType::ALL
    }
}

/// Aggregates shared by every input of a transaction, computed once when
/// several inputs are verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecomputedTransactionData {
    pub hash_prevouts: Hash,
    pub hash_sequence: Hash,
    pub hash_outputs: Hash,
}

impl PrecomputedTransactionData {
    pub fn new(tx: &Transaction) -> Self {
        PrecomputedTransactionData {
            hash_prevouts: hash_prevouts(tx),
            hash_sequence: hash_sequence(tx),
            hash_outputs: hash_all_outputs(tx),
        }
    }
}

fn hash_prevouts(tx: &Transaction) -> Hash {
    let mut buf = Vec::with_capacity(tx.inputs.len() * 36);
    for input in &tx.inputs {
        write_outpoint(&mut buf, &input.prevout);
    }
    hash256(&buf)
}

fn hash_sequence(tx: &Transaction) -> Hash {
    let mut writer = Hash256Writer::new();
    for input in &tx.inputs {
        writer.write(&input.sequence.to_le_bytes());
    }
    writer.finish()
}

fn hash_all_outputs(tx: &Transaction) -> Hash {
    let mut buf = Vec::new();
    for output in &tx.outputs {
        write_output(&mut buf, output);
    }
    hash256(&buf)
}

#[cold]
fn make_input_index_error(n_in: usize) -> ConsensusError {
    ConsensusError::InvalidInputIndex(n_in)
}

/// Digest signed for input `n_in` spending `amount` under `script_code`.
///
/// SINGLE without an output at `n_in` commits to a zero `hashOutputs`.
pub fn signature_hash(
    script_code: &[u8],
    tx: &Transaction,
    n_in: usize,
    sighash_type: SigHashType,
    amount: Amount,
    cache: Option<&PrecomputedTransactionData>,
) -> Result<Hash> {
    let input = tx.inputs.get(n_in).ok_or_else(|| make_input_index_error(n_in))?;
    let base = sighash_type.base_type();
    let acp = sighash_type.has_anyone_can_pay();

    let hash_prevouts = if acp {
        [0u8; 32]
    } else {
        cache.map_or_else(|| hash_prevouts(tx), |c| c.hash_prevouts)
    };

    let hash_sequence = if acp || base == SIGHASH_SINGLE || base == SIGHASH_NONE {
        [0u8; 32]
    } else {
        cache.map_or_else(|| hash_sequence(tx), |c| c.hash_sequence)
    };

    let hash_outputs = if base != SIGHASH_SINGLE && base != SIGHASH_NONE {
        cache.map_or_else(|| hash_all_outputs(tx), |c| c.hash_outputs)
    } else if base == SIGHASH_SINGLE && n_in < tx.outputs.len() {
        let mut buf = Vec::new();
        write_output(&mut buf, &tx.outputs[n_in]);
        hash256(&buf)
    } else {
        [0u8; 32]
    };

    let mut preimage = Vec::with_capacity(156 + script_code.len() + 9);
    preimage.extend_from_slice(&tx.version.to_le_bytes());
    preimage.extend_from_slice(&hash_prevouts);
    preimage.extend_from_slice(&hash_sequence);
    write_outpoint(&mut preimage, &input.prevout);
    write_varint(&mut preimage, script_code.len() as u64);
    preimage.extend_from_slice(script_code);
    preimage.extend_from_slice(&amount.to_le_bytes());
    preimage.extend_from_slice(&input.sequence.to_le_bytes());
    preimage.extend_from_slice(&hash_outputs);
    preimage.extend_from_slice(&tx.lock_time.to_le_bytes());
    preimage.extend_from_slice(&sighash_type.raw().to_le_bytes());

    Ok(hash256(&preimage))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx() -> Transaction {
        Transaction {
            version: 1,
            inputs: (0..3)
                .map(|i| TransactionInput {
                    prevout: OutPoint {
                        hash: [i as u8 + 1; 32],
                        index: i,
                    },
                    script_sig: vec![],
                    sequence: 0xffff_fff0 + i,
                })
                .collect(),
            outputs: (0..2)
                .map(|i| TransactionOutput {
                    value: 1000 * (i + 1),
                    script_pubkey: vec![0x51 + i as u8],
                })
                .collect(),
            lock_time: 0,
        }
    }

    #[test]
    fn test_sighash_type_classification() {
        assert!(SigHashType::new(0x01).is_defined());
        assert!(SigHashType::new(0x83).is_defined());
        assert!(!SigHashType::new(0x00).is_defined());
        assert!(!SigHashType::new(0x04).is_defined());
        assert!(!SigHashType::new(0x41).is_defined());
        assert_eq!(SigHashType::new(0x83).base_type(), SIGHASH_SINGLE);
        assert!(SigHashType::ALL.with_anyone_can_pay().has_anyone_can_pay());
        assert_eq!(SigHashType::from_signature(&[0x30, 0x01]).raw(), 1);
        assert_eq!(SigHashType::from_signature(&[]).raw(), 0);
    }

    #[test]
    fn test_cache_matches_direct_computation() {
        let t = tx();
        let cache = PrecomputedTransactionData::new(&t);
        for n_in in 0..3 {
            for raw in [0x01, 0x02, 0x03, 0x81, 0x82, 0x83] {
                let ty = SigHashType::new(raw);
                assert_eq!(
                    signature_hash(&[0xac], &t, n_in, ty, 500, None).unwrap(),
                    signature_hash(&[0xac], &t, n_in, ty, 500, Some(&cache)).unwrap()
                );
            }
        }
    }

    #[test]
    fn test_amount_is_committed() {
        let t = tx();
        let a = signature_hash(&[0xac], &t, 0, SigHashType::ALL, 1, None).unwrap();
        let b = signature_hash(&[0xac], &t, 0, SigHashType::ALL, 2, None).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_anyone_can_pay_ignores_other_inputs() {
        let t = tx();
        let mut other = t.clone();
        other.inputs[1].prevout.index = 77;
        let ty = SigHashType::ALL.with_anyone_can_pay();
        assert_eq!(
            signature_hash(&[], &t, 0, ty, 0, None).unwrap(),
            signature_hash(&[], &other, 0, ty, 0, None).unwrap()
        );
        assert_ne!(
            signature_hash(&[], &t, 0, SigHashType::ALL, 0, None).unwrap(),
            signature_hash(&[], &other, 0, SigHashType::ALL, 0, None).unwrap()
        );
    }

    #[test]
    fn test_single_without_matching_output() {
        let t = tx();
        let ty = SigHashType::new(SIGHASH_SINGLE);
        // Input 2 has no output 2, so outputs are not committed.
        let mut other = t.clone();
        other.outputs[0].value = 9;
        assert_eq!(
            signature_hash(&[], &t, 2, ty, 0, None).unwrap(),
            signature_hash(&[], &other, 2, ty, 0, None).unwrap()
        );
        assert_ne!(
            signature_hash(&[], &t, 0, ty, 0, None).unwrap(),
            signature_hash(&[], &other, 0, ty, 0, None).unwrap()
        );
    }

    #[test]
    fn test_input_index_out_of_range() {
        assert_eq!(
            signature_hash(&[], &tx(), 3, SigHashType::ALL, 0, None),
            Err(ConsensusError::InvalidInputIndex(3))
        );
    }
}

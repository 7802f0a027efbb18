//! Transaction identity and size checks
//!
//! Version 2 transactions are identified by a "rich" hash that commits to
//! per-input and per-output digests instead of the flat serialization. This
//! lets a stateful output be proven by its code and state digests without
//! revealing the full script.

use crate::constants::{MIN_TX_SIZE_CONSENSUS, RICH_TX_VERSION};
use crate::crypto::{hash256, sha256, Hash256Writer};
use crate::error::{ConsensusError, Result};
use crate::limits::LimitsView;
use crate::script::state_iterator;
use crate::serialization::transaction::{serialize_transaction, serialized_transaction_size};
use crate::serialization::transaction::write_outpoint;
use crate::types::*;
use sha2::{Digest, Sha256};

#[cold]
fn make_size_error(reason: &'static str) -> ConsensusError {
    ConsensusError::TransactionValidation(reason.into())
}

/// A coinbase has exactly one input spending the null outpoint.
pub fn is_coinbase(tx: &Transaction) -> bool {
    tx.inputs.len() == 1 && tx.inputs[0].prevout.is_null()
}

/// Serialized size in bytes.
pub fn total_size(tx: &Transaction) -> usize {
    serialized_transaction_size(tx)
}

/// Reject transactions smaller than the consensus minimum or larger than the
/// maximum for the chosen regime.
pub fn check_transaction_size(
    limits: &dyn LimitsView,
    tx: &Transaction,
    is_consensus: bool,
) -> Result<()> {
    let size = total_size(tx) as u64;
    if size < MIN_TX_SIZE_CONSENSUS {
        return Err(make_size_error("bad-txns-undersize"));
    }
    if size > limits.max_tx_size(is_consensus) {
        return Err(make_size_error("bad-txns-oversize"));
    }
    Ok(())
}

/// SHA256(concat over inputs of SHA256(prevout || SHA256(scriptSig) || sequence))
pub fn hash_inputs(tx: &Transaction) -> Hash {
    let mut outer = Sha256::new();
    let mut buf = Vec::with_capacity(36 + 32 + 4);
    for input in &tx.inputs {
        buf.clear();
        write_outpoint(&mut buf, &input.prevout);
        buf.extend_from_slice(&sha256(&input.script_sig));
        buf.extend_from_slice(&input.sequence.to_le_bytes());
        outer.update(sha256(&buf));
    }
    outer.finalize().into()
}

/// Digest of one output. Stateful scripts also commit to their code and
/// state parts separately.
pub fn hash_output(output: &TransactionOutput) -> Hash {
    let script = &output.script_pubkey;
    let mut inner = Sha256::new();
    inner.update(output.value.to_le_bytes());
    inner.update(sha256(script));
    if let Some(split) = state_iterator(script) {
        inner.update(sha256(&script[..split]));
        inner.update(sha256(&script[split..]));
    }
    inner.finalize().into()
}

/// SHA256(concat over outputs of `hash_output`)
pub fn hash_outputs(tx: &Transaction) -> Hash {
    let mut outer = Sha256::new();
    for output in &tx.outputs {
        outer.update(hash_output(output));
    }
    outer.finalize().into()
}

/// Transaction id in internal byte order.
pub fn txid(tx: &Transaction) -> Hash {
    if tx.version != RICH_TX_VERSION {
        return hash256(&serialize_transaction(tx));
    }
    let mut writer = Hash256Writer::new();
    writer
        .write(&tx.version.to_le_bytes())
        .write(&(tx.inputs.len() as u32).to_le_bytes())
        .write(&hash_inputs(tx))
        .write(&(tx.outputs.len() as u32).to_le_bytes())
        .write(&hash_outputs(tx))
        .write(&tx.lock_time.to_le_bytes());
    writer.finish()
}

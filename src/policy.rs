//! Standardness policy
//!
//! Rules a node applies before relaying or mining a transaction. None of them
//! make a mined block invalid. Limits come from the same [`LimitsView`] the
//! interpreter reads, in the policy regime.

use crate::cancellation::CancellationToken;
use crate::constants::{
    DUST_RELAY_TX_FEE, MAX_STANDARD_VERSION, MEMPOOL_HEIGHT, MIN_TX_SIZE_CONSENSUS,
};
use crate::limits::LimitsView;
use crate::opcodes::*;
use crate::script::{
    is_dust_return_script, is_pay_to_script_hash, is_push_only, is_unspendable, Instructions,
};
use crate::script_num::ScriptNum;
use crate::serialization::transaction::serialized_output_size;
use crate::transaction::{is_coinbase, total_size};
use crate::types::*;
use std::collections::HashMap;
use tracing::debug;

/// Bytes needed to spend a typical output, added to its own size when
/// deciding whether it is dust.
const SPEND_INPUT_SIZE: u64 = 148;

/// Longest number push accepted for a multisig key or signature count.
const MAX_MULTISIG_COUNT_PUSH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxOutType {
    NonStandard,
    PubKey,
    PubKeyHash,
    ScriptHash,
    MultiSig,
    NullData,
}

impl TxOutType {
    pub fn name(self) -> &'static str {
        match self {
            TxOutType::NonStandard => "nonstandard",
            TxOutType::PubKey => "pubkey",
            TxOutType::PubKeyHash => "pubkeyhash",
            TxOutType::ScriptHash => "scripthash",
            TxOutType::MultiSig => "multisig",
            TxOutType::NullData => "nulldata",
        }
    }
}

/// Length implied by a public key's first byte.
fn valid_pubkey_size(key: &[u8]) -> bool {
    match key.first() {
        Some(0x02 | 0x03) => key.len() == 33,
        Some(0x04 | 0x06 | 0x07) => key.len() == 65,
        _ => false,
    }
}

/// A multisig count given as OP_1..OP_16 or as a minimal number push.
fn multisig_count(opcode: Opcode, data: &[u8]) -> Option<(u64, Vec<u8>)> {
    match opcode {
        Opcode::PushNum(n) => Some((n as u64, vec![n])),
        Opcode::PushBytes(_) | Opcode::PushData1 | Opcode::PushData2 | Opcode::PushData4 => {
            let n = ScriptNum::from_bytes(data, true, MAX_MULTISIG_COUNT_PUSH).ok()?;
            if n.is_negative() {
                return None;
            }
            Some((n.to_i64_saturating() as u64, data.to_vec()))
        }
        _ => None,
    }
}

/// `<m> <key>... <n> OP_CHECKMULTISIG` with `1 <= m <= n == key count`.
fn match_multisig(script: &[u8]) -> Option<Vec<Vec<u8>>> {
    let ins = Instructions::new(script)
        .collect::<crate::error::Result<Vec<_>>>()
        .ok()?;
    let (last, rest) = ins.split_last()?;
    if last.opcode != Opcode::CheckMultiSig || rest.len() < 2 {
        return None;
    }
    let (m, m_bytes) = multisig_count(rest[0].opcode, rest[0].data)?;
    let n_ins = &rest[rest.len() - 1];
    let (n, n_bytes) = multisig_count(n_ins.opcode, n_ins.data)?;

    let keys = &rest[1..rest.len() - 1];
    if !keys.iter().all(|k| k.opcode.is_push() && valid_pubkey_size(k.data)) {
        return None;
    }
    if m < 1 || m > n || n != keys.len() as u64 {
        return None;
    }

    let mut solutions = Vec::with_capacity(keys.len() + 2);
    solutions.push(m_bytes);
    solutions.extend(keys.iter().map(|k| k.data.to_vec()));
    solutions.push(n_bytes);
    Some(solutions)
}

/// Classify `script` against the standard templates.
///
/// Returns the template and the data it carries: the key for PubKey, the hash
/// for PubKeyHash and ScriptHash, and `m`, the keys and `n` for MultiSig.
/// `None` means no template matched.
pub fn solver(script: &[u8]) -> Option<(TxOutType, Vec<Vec<u8>>)> {
    if is_pay_to_script_hash(script) {
        return Some((TxOutType::ScriptHash, vec![script[2..22].to_vec()]));
    }

    if matches!(script, [OP_RETURN, ..] | [OP_FALSE, OP_RETURN, ..]) {
        return Some((TxOutType::NullData, Vec::new()));
    }

    match script {
        [len @ (33 | 65), body @ .., OP_CHECKSIG] if body.len() == *len as usize => {
            if valid_pubkey_size(body) {
                return Some((TxOutType::PubKey, vec![body.to_vec()]));
            }
        }
        [OP_DUP, OP_HASH160, 20, hash @ .., OP_EQUALVERIFY, OP_CHECKSIG] if hash.len() == 20 => {
            return Some((TxOutType::PubKeyHash, vec![hash.to_vec()]));
        }
        _ => {}
    }

    match_multisig(script).map(|solutions| (TxOutType::MultiSig, solutions))
}

/// Template of `script` and whether an output using it is relayed.
///
/// Bare multisig is standard up to 3 keys whatever the consensus limit.
/// Null data needs the data carrier option.
pub fn is_standard(limits: &dyn LimitsView, script: &[u8]) -> (TxOutType, bool) {
    let Some((kind, solutions)) = solver(script) else {
        return (TxOutType::NonStandard, false);
    };

    let standard = match kind {
        TxOutType::MultiSig => {
            let count = |bytes: &Vec<u8>| {
                ScriptNum::from_bytes(bytes, false, MAX_MULTISIG_COUNT_PUSH)
                    .map(|n| n.to_i64_saturating())
                    .unwrap_or(0)
            };
            let m = solutions.first().map_or(0, count);
            let n = solutions.last().map_or(0, count);
            (1..=3).contains(&n) && (1..=n).contains(&m)
        }
        TxOutType::NullData => limits.accept_datacarrier(),
        _ => true,
    };
    (kind, standard)
}

/// Fee for `size` bytes at `fee_per_kb`. A nonzero rate never rounds a
/// nonempty size down to a free transaction.
pub fn fee_for_size(fee_per_kb: Amount, size: u64) -> Amount {
    let fee = (fee_per_kb as i128 * size as i128 / 1000) as Amount;
    if fee == 0 && size != 0 {
        return fee_per_kb.signum();
    }
    fee
}

/// Smallest value at which `output` is worth spending.
///
/// `dust_limit_factor` is a percentage of the fee needed to spend the output.
pub fn dust_threshold(
    output: &TransactionOutput,
    dust_relay_fee_per_kb: Amount,
    dust_limit_factor: i64,
) -> Amount {
    if is_unspendable(&output.script_pubkey) {
        return 0;
    }
    let size = serialized_output_size(output) as u64 + SPEND_INPUT_SIZE;
    dust_limit_factor * fee_for_size(dust_relay_fee_per_kb, size) / 100
}

pub fn is_dust(
    output: &TransactionOutput,
    dust_relay_fee_per_kb: Amount,
    dust_limit_factor: i64,
) -> bool {
    output.value < dust_threshold(output, dust_relay_fee_per_kb, dust_limit_factor)
}

fn check_standard_tx(limits: &dyn LimitsView, tx: &Transaction) -> Result<(), &'static str> {
    if tx.version < 1 || tx.version > MAX_STANDARD_VERSION {
        return Err("version");
    }

    let size = total_size(tx) as u64;
    if size < MIN_TX_SIZE_CONSENSUS || size > limits.max_tx_size(false) {
        return Err("tx-size");
    }

    if tx.inputs.iter().any(|input| !is_push_only(&input.script_sig)) {
        return Err("scriptsig-not-pushonly");
    }

    if tx.outputs.is_empty() {
        return Err("no-outputs");
    }

    let mut data_size = 0u64;
    let mut nonstandard_output = false;
    for output in &tx.outputs {
        let (kind, standard) = is_standard(limits, &output.script_pubkey);
        nonstandard_output |= !standard;

        if kind == TxOutType::NullData {
            data_size += output.script_pubkey.len() as u64;
        } else if kind == TxOutType::MultiSig && !limits.permit_bare_multisig() {
            return Err("bare-multisig");
        } else if is_dust(output, DUST_RELAY_TX_FEE, limits.dust_limit_factor()) {
            return Err("dust");
        }
    }

    if data_size > limits.data_carrier_size() {
        return Err("datacarrier-size-exceeded");
    }
    if nonstandard_output {
        return Err("scriptpubkey");
    }
    Ok(())
}

/// Relay policy for a whole transaction. The error is the short reject
/// reason reported to peers.
pub fn is_standard_tx(limits: &dyn LimitsView, tx: &Transaction) -> Result<(), &'static str> {
    check_standard_tx(limits, tx).map_err(|reason| {
        debug!(reason, "transaction is non-standard");
        reason
    })
}

/// Read access to unspent outputs.
///
/// Lookups may block; a missing coin is reported as `None`.
pub trait CoinsView {
    fn get_coin(&self, outpoint: &OutPoint) -> Option<Coin>;
}

impl CoinsView for HashMap<OutPoint, Coin> {
    fn get_coin(&self, outpoint: &OutPoint) -> Option<Coin> {
        self.get(outpoint).cloned()
    }
}

/// A single zero-value output that burns dust to the miner.
pub fn is_dust_return_txn(tx: &Transaction) -> bool {
    tx.outputs.len() == 1
        && tx.outputs[0].value == 0
        && is_dust_return_script(&tx.outputs[0].script_pubkey)
}

/// Whether `tx` shrinks the coin set enough to be mined without a fee.
///
/// A donation ([`is_dust_return_txn`]) needs no confirmations and uses its
/// own input count as the factor. `None` when a spent coin is unknown.
pub fn is_consolidation_txn(
    limits: &dyn LimitsView,
    tx: &Transaction,
    coins: &dyn CoinsView,
    tip_height: u32,
) -> Option<bool> {
    if limits.min_consolidation_factor() == 0 {
        return Some(false);
    }

    let is_donation = is_dust_return_txn(tx);
    let factor = if is_donation {
        tx.inputs.len() as u64
    } else {
        limits.min_consolidation_factor()
    };
    let min_conf = if is_donation {
        0
    } else {
        limits.min_conf_consolidation_input()
    };
    let max_script_sig = limits.max_consolidation_input_script_size();
    let standard_inputs_only = !limits.accept_non_std_consolidation_input();

    if is_coinbase(tx) {
        return Some(false);
    }
    if (tx.inputs.len() as u64) < factor.saturating_mul(tx.outputs.len() as u64) {
        return Some(false);
    }

    let mut spent_script_size = 0u64;
    for input in &tx.inputs {
        let coin = coins.get_coin(&input.prevout)?;

        if min_conf > 0 {
            if coin.height == MEMPOOL_HEIGHT {
                return Some(false);
            }
            // Height 0 is an unknown height and is not checked.
            let confirmations = tip_height as i64 + 1 - coin.height as i64;
            if coin.height != 0 && confirmations < min_conf as i64 {
                return Some(false);
            }
        }

        if input.script_sig.len() as u64 > max_script_sig {
            return Some(false);
        }
        if standard_inputs_only && !is_standard(limits, &coin.output.script_pubkey).1 {
            return Some(false);
        }
        spent_script_size += coin.output.script_pubkey.len() as u64;
    }

    let new_script_size: u64 = tx
        .outputs
        .iter()
        .map(|o| o.script_pubkey.len() as u64)
        .sum();
    Some(spent_script_size >= factor.saturating_mul(new_script_size))
}

/// Every spent output must match a standard template.
///
/// `None` when a coin is missing or `token` is cancelled.
pub fn are_inputs_standard(
    token: &CancellationToken,
    _limits: &dyn LimitsView,
    tx: &Transaction,
    coins: &dyn CoinsView,
) -> Option<bool> {
    if is_coinbase(tx) {
        return Some(true);
    }
    for input in &tx.inputs {
        if token.is_cancelled() {
            return None;
        }
        let coin = coins.get_coin(&input.prevout)?;
        if solver(&coin.output.script_pubkey).is_none() {
            return Some(false);
        }
    }
    Some(true)
}

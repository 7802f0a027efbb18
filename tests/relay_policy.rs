//! Relay policy driven by node configuration
//!
//! Loads a `NodeConfig`, builds the limits registry from it and checks that
//! the standardness and consolidation rules follow the configured values.

use std::collections::HashMap;

use novo_consensus::cancellation::CancellationToken;
use novo_consensus::config::NodeConfig;
use novo_consensus::constants::{MEMPOOL_HEIGHT, TESTNET_DEFAULT_MAX_BLOCK_SIZE};
use novo_consensus::limits::{GlobalConfig, LimitsView};
use novo_consensus::opcodes::*;
use novo_consensus::policy::{
    are_inputs_standard, dust_threshold, is_consolidation_txn, is_standard_tx,
};
use novo_consensus::script::ScriptBuilder;
use novo_consensus::sigop::transaction_sig_op_count;
use novo_consensus::types::*;
use novo_consensus::Network;

fn p2pkh(tag: u8) -> Vec<u8> {
    ScriptBuilder::new()
        .push_opcode(OP_DUP)
        .push_opcode(OP_HASH160)
        .push_data(&[tag; 20])
        .push_opcode(OP_EQUALVERIFY)
        .push_opcode(OP_CHECKSIG)
        .into_bytes()
}

fn signed_input(n: u8) -> TransactionInput {
    TransactionInput {
        prevout: OutPoint {
            hash: [n; 32],
            index: 0,
        },
        script_sig: ScriptBuilder::new()
            .push_data(&[0x30; 72])
            .push_data(&[0x02; 33])
            .into_bytes(),
        sequence: u32::MAX,
    }
}

fn tx(inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>) -> Transaction {
    Transaction {
        version: 1,
        inputs,
        outputs,
        lock_time: 0,
    }
}

fn pay(value: Amount, tag: u8) -> TransactionOutput {
    TransactionOutput {
        value,
        script_pubkey: p2pkh(tag),
    }
}

fn default_limits() -> GlobalConfig {
    NodeConfig::default().build_limits().unwrap()
}

#[test]
fn test_config_selects_network_block_sizes() {
    let config = NodeConfig::from_json_str(r#"{ "network": "test" }"#).unwrap();
    assert_eq!(config.network, Network::Test);
    let limits = config.build_limits().unwrap();
    assert_eq!(limits.max_block_size(), TESTNET_DEFAULT_MAX_BLOCK_SIZE);
    assert_eq!(
        limits.max_send_queues_bytes(),
        TESTNET_DEFAULT_MAX_BLOCK_SIZE * config.block_size.factor_max_send_queues_bytes
    );
}

#[test]
fn test_plain_payment_is_standard() {
    let limits = default_limits();
    let payment = tx(vec![signed_input(1)], vec![pay(100_000, 2)]);
    assert_eq!(is_standard_tx(&limits, &payment), Ok(()));
}

#[test]
fn test_dust_boundary() {
    let limits = default_limits();
    // 34 output bytes plus 148 to spend, at 8000 per kB, times 300%.
    let threshold = dust_threshold(&pay(0, 2), 8000, limits.dust_limit_factor());
    assert_eq!(threshold, 4368);

    let at = tx(vec![signed_input(1)], vec![pay(threshold, 2)]);
    assert_eq!(is_standard_tx(&limits, &at), Ok(()));

    let below = tx(vec![signed_input(1)], vec![pay(threshold - 1, 2)]);
    assert_eq!(is_standard_tx(&limits, &below), Err("dust"));
}

#[test]
fn test_bare_multisig_follows_config() {
    let multisig = ScriptBuilder::new()
        .push_int(1)
        .push_data(&[0x02; 33])
        .push_data(&[0x03; 33])
        .push_int(2)
        .push_opcode(OP_CHECKMULTISIG)
        .into_bytes();
    let payment = tx(
        vec![signed_input(1)],
        vec![TransactionOutput {
            value: 100_000,
            script_pubkey: multisig,
        }],
    );

    assert_eq!(is_standard_tx(&default_limits(), &payment), Ok(()));

    let config =
        NodeConfig::from_json_str(r#"{ "tx_policy": { "permit_bare_multisig": false } }"#)
            .unwrap();
    let limits = config.build_limits().unwrap();
    assert_eq!(is_standard_tx(&limits, &payment), Err("bare-multisig"));
}

#[test]
fn test_data_carrier_size_limit() {
    let data = ScriptBuilder::new()
        .push_opcode(OP_FALSE)
        .push_opcode(OP_RETURN)
        .push_data(&[0xab; 20])
        .into_bytes();
    let payment = tx(
        vec![signed_input(1)],
        vec![
            pay(100_000, 2),
            TransactionOutput {
                value: 0,
                script_pubkey: data,
            },
        ],
    );
    assert_eq!(is_standard_tx(&default_limits(), &payment), Ok(()));

    let config =
        NodeConfig::from_json_str(r#"{ "tx_policy": { "data_carrier_size": 10 } }"#).unwrap();
    let limits = config.build_limits().unwrap();
    assert_eq!(
        is_standard_tx(&limits, &payment),
        Err("datacarrier-size-exceeded")
    );

    let config =
        NodeConfig::from_json_str(r#"{ "tx_policy": { "accept_datacarrier": false } }"#).unwrap();
    let limits = config.build_limits().unwrap();
    assert_eq!(is_standard_tx(&limits, &payment), Err("scriptpubkey"));
}

#[test]
fn test_structural_rejections() {
    let limits = default_limits();

    let mut wrong_version = tx(vec![signed_input(1)], vec![pay(100_000, 2)]);
    wrong_version.version = 3;
    assert_eq!(is_standard_tx(&limits, &wrong_version), Err("version"));

    let mut not_push_only = tx(vec![signed_input(1)], vec![pay(100_000, 2)]);
    not_push_only.inputs[0].script_sig.push(OP_DUP);
    assert_eq!(
        is_standard_tx(&limits, &not_push_only),
        Err("scriptsig-not-pushonly")
    );

    let no_outputs = tx(vec![signed_input(1)], Vec::new());
    assert_eq!(is_standard_tx(&limits, &no_outputs), Err("no-outputs"));

    let mut tiny = tx(vec![signed_input(1)], vec![pay(100_000, 2)]);
    tiny.inputs[0].script_sig.clear();
    tiny.outputs[0].script_pubkey = vec![OP_1];
    assert_eq!(is_standard_tx(&limits, &tiny), Err("tx-size"));
}

fn coins_for(inputs: &[TransactionInput], height: u32) -> HashMap<OutPoint, Coin> {
    inputs
        .iter()
        .enumerate()
        .map(|(i, input)| {
            (
                input.prevout,
                Coin {
                    output: pay(1_000, i as u8),
                    height,
                    is_coinbase: false,
                },
            )
        })
        .collect()
}

#[test]
fn test_consolidation_needs_factor_inputs() {
    let limits = default_limits();
    let inputs: Vec<_> = (0..20).map(signed_input).collect();
    let coins = coins_for(&inputs, 100);

    let consolidation = tx(inputs.clone(), vec![pay(19_000, 1)]);
    assert_eq!(
        is_consolidation_txn(&limits, &consolidation, &coins, 200),
        Some(true)
    );

    let short = tx(inputs[..19].to_vec(), vec![pay(18_000, 1)]);
    assert_eq!(is_consolidation_txn(&limits, &short, &coins, 200), Some(false));
}

#[test]
fn test_consolidation_confirmations() {
    let limits = default_limits();
    let inputs: Vec<_> = (0..20).map(signed_input).collect();
    let consolidation = tx(inputs.clone(), vec![pay(19_000, 1)]);

    let recent = coins_for(&inputs, 198);
    assert_eq!(
        is_consolidation_txn(&limits, &consolidation, &recent, 200),
        Some(false)
    );

    let unconfirmed = coins_for(&inputs, MEMPOOL_HEIGHT);
    assert_eq!(
        is_consolidation_txn(&limits, &consolidation, &unconfirmed, 200),
        Some(false)
    );

    // Zero falls back to the default confirmation count.
    let config = NodeConfig::from_json_str(
        r#"{ "consolidation": { "min_conf_consolidation_input": 0 } }"#,
    )
    .unwrap();
    let relaxed = config.build_limits().unwrap();
    assert_eq!(relaxed.min_conf_consolidation_input(), 6);

    // A dust donation needs no confirmations.
    let donation = tx(
        inputs,
        vec![TransactionOutput {
            value: 0,
            script_pubkey: vec![OP_FALSE, OP_RETURN, 0x04, b'd', b'u', b's', b't'],
        }],
    );
    assert_eq!(
        is_consolidation_txn(&limits, &donation, &unconfirmed, 200),
        Some(true)
    );
}

#[test]
fn test_consolidation_disabled_by_zero_factor() {
    let config = NodeConfig::from_json_str(
        r#"{ "consolidation": { "min_consolidation_factor": 0 } }"#,
    )
    .unwrap();
    let limits = config.build_limits().unwrap();
    let inputs: Vec<_> = (0..20).map(signed_input).collect();
    let coins = coins_for(&inputs, 100);
    let consolidation = tx(inputs, vec![pay(19_000, 1)]);
    assert_eq!(
        is_consolidation_txn(&limits, &consolidation, &coins, 200),
        Some(false)
    );
}

#[test]
fn test_missing_coin_is_unknown() {
    let limits = default_limits();
    let inputs: Vec<_> = (0..20).map(signed_input).collect();
    let mut coins = coins_for(&inputs, 100);
    coins.remove(&inputs[7].prevout);
    let consolidation = tx(inputs, vec![pay(19_000, 1)]);

    assert_eq!(
        is_consolidation_txn(&limits, &consolidation, &coins, 200),
        None
    );
    assert_eq!(
        are_inputs_standard(&CancellationToken::new(), &limits, &consolidation, &coins),
        None
    );
}

#[test]
fn test_inputs_standard_and_cancellation() {
    let limits = default_limits();
    let inputs: Vec<_> = (0..3).map(signed_input).collect();
    let mut coins = coins_for(&inputs, 100);
    let spend = tx(inputs.clone(), vec![pay(2_000, 1)]);
    let token = CancellationToken::new();

    assert_eq!(are_inputs_standard(&token, &limits, &spend, &coins), Some(true));

    coins.get_mut(&inputs[1].prevout).unwrap().output.script_pubkey = vec![OP_1, OP_DROP];
    assert_eq!(are_inputs_standard(&token, &limits, &spend, &coins), Some(false));

    token.cancel();
    assert_eq!(are_inputs_standard(&token, &limits, &spend, &coins), None);
}

#[test]
fn test_payment_sigops() {
    let payment = tx(vec![signed_input(1)], vec![pay(100_000, 2), pay(5_000, 3)]);
    assert_eq!(transaction_sig_op_count(&payment), (2, false));
}

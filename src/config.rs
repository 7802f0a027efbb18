//! Node configuration for the limits registry
//!
//! Settings can be loaded from a JSON file, from `NOVO_*` environment
//! variables, or built programmatically, then pushed into a
//! [`LimitsAdmin`] through its validated setters. Values the setters take as
//! signed integers are signed here too, so a negative setting reaches the
//! setter and fails there with the node's own message.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chainparams::{ChainParams, Network};
use crate::constants::*;
use crate::error::{ConsensusError, Result};
use crate::limits::{GlobalConfig, LimitsAdmin};
use crate::types::Amount;

/// Script evaluation limits. Zero selects the consensus value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptLimitsConfig {
    #[serde(default = "default_max_script_size_policy")]
    pub max_script_size_policy: i64,

    #[serde(default = "default_max_ops_per_script_policy")]
    pub max_ops_per_script_policy: i64,

    #[serde(default = "default_max_pubkeys_per_multisig_policy")]
    pub max_pubkeys_per_multisig_policy: i64,

    #[serde(default = "default_max_script_num_length_policy")]
    pub max_script_num_length_policy: i64,

    /// Zero keeps the built-in consensus limit.
    #[serde(default)]
    pub max_stack_memory_usage_consensus: i64,

    #[serde(default = "default_max_stack_memory_usage_policy")]
    pub max_stack_memory_usage_policy: i64,
}

fn default_max_script_size_policy() -> i64 {
    DEFAULT_MAX_SCRIPT_SIZE_POLICY as i64
}

fn default_max_ops_per_script_policy() -> i64 {
    DEFAULT_OPS_PER_SCRIPT_POLICY as i64
}

fn default_max_pubkeys_per_multisig_policy() -> i64 {
    DEFAULT_PUBKEYS_PER_MULTISIG_POLICY as i64
}

fn default_max_script_num_length_policy() -> i64 {
    DEFAULT_SCRIPT_NUM_LENGTH_POLICY as i64
}

fn default_max_stack_memory_usage_policy() -> i64 {
    DEFAULT_STACK_MEMORY_USAGE_POLICY as i64
}

impl Default for ScriptLimitsConfig {
    fn default() -> Self {
        Self {
            max_script_size_policy: default_max_script_size_policy(),
            max_ops_per_script_policy: default_max_ops_per_script_policy(),
            max_pubkeys_per_multisig_policy: default_max_pubkeys_per_multisig_policy(),
            max_script_num_length_policy: default_max_script_num_length_policy(),
            max_stack_memory_usage_consensus: 0,
            max_stack_memory_usage_policy: default_max_stack_memory_usage_policy(),
        }
    }
}

/// Relay and mining policy for individual transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxPolicyConfig {
    #[serde(default = "default_max_tx_size_policy")]
    pub max_tx_size_policy: i64,

    #[serde(default = "default_max_tx_sigops_count_policy")]
    pub max_tx_sigops_count_policy: i64,

    /// Satoshis per 1000 bytes.
    #[serde(default = "default_min_relay_fee")]
    pub min_relay_fee_per_kb: Amount,

    #[serde(default = "default_block_min_fee")]
    pub block_min_fee_per_kb: Amount,

    /// Percentage of the relay-fee dust threshold, 0 to 300.
    #[serde(default = "default_dust_limit_factor")]
    pub dust_limit_factor: i64,

    #[serde(default = "default_data_carrier_size")]
    pub data_carrier_size: u64,

    #[serde(default = "default_true")]
    pub accept_datacarrier: bool,

    #[serde(default = "default_true")]
    pub permit_bare_multisig: bool,

    #[serde(default = "default_limit_ancestor_count")]
    pub limit_ancestor_count: i64,

    #[serde(default = "default_limit_secondary_mempool_ancestor_count")]
    pub limit_secondary_mempool_ancestor_count: i64,
}

fn default_max_tx_size_policy() -> i64 {
    DEFAULT_MAX_TX_SIZE_POLICY as i64
}

fn default_max_tx_sigops_count_policy() -> i64 {
    DEFAULT_TX_SIGOPS_COUNT_POLICY as i64
}

fn default_min_relay_fee() -> Amount {
    DEFAULT_MIN_RELAY_TX_FEE
}

fn default_block_min_fee() -> Amount {
    DEFAULT_BLOCK_MIN_TX_FEE
}

fn default_dust_limit_factor() -> i64 {
    DEFAULT_DUST_LIMIT_FACTOR
}

fn default_data_carrier_size() -> u64 {
    DEFAULT_DATA_CARRIER_SIZE
}

fn default_limit_ancestor_count() -> i64 {
    DEFAULT_ANCESTOR_LIMIT as i64
}

fn default_limit_secondary_mempool_ancestor_count() -> i64 {
    DEFAULT_SECONDARY_MEMPOOL_ANCESTOR_LIMIT as i64
}

fn default_true() -> bool {
    true
}

impl Default for TxPolicyConfig {
    fn default() -> Self {
        Self {
            max_tx_size_policy: default_max_tx_size_policy(),
            max_tx_sigops_count_policy: default_max_tx_sigops_count_policy(),
            min_relay_fee_per_kb: default_min_relay_fee(),
            block_min_fee_per_kb: default_block_min_fee(),
            dust_limit_factor: default_dust_limit_factor(),
            data_carrier_size: default_data_carrier_size(),
            accept_datacarrier: DEFAULT_ACCEPT_DATACARRIER,
            permit_bare_multisig: DEFAULT_PERMIT_BAREMULTISIG,
            limit_ancestor_count: default_limit_ancestor_count(),
            limit_secondary_mempool_ancestor_count:
                default_limit_secondary_mempool_ancestor_count(),
        }
    }
}

/// Free relay of transactions that shrink the UTXO set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidationConfig {
    /// Zero disables consolidation detection.
    #[serde(default = "default_min_consolidation_factor")]
    pub min_consolidation_factor: i64,

    #[serde(default = "default_max_consolidation_input_script_size")]
    pub max_consolidation_input_script_size: i64,

    #[serde(default = "default_min_conf_consolidation_input")]
    pub min_conf_consolidation_input: i64,

    #[serde(default)]
    pub accept_non_std_consolidation_input: bool,
}

fn default_min_consolidation_factor() -> i64 {
    DEFAULT_MIN_CONSOLIDATION_FACTOR as i64
}

fn default_max_consolidation_input_script_size() -> i64 {
    DEFAULT_MAX_CONSOLIDATION_INPUT_SCRIPT_SIZE as i64
}

fn default_min_conf_consolidation_input() -> i64 {
    DEFAULT_MIN_CONF_CONSOLIDATION_INPUT as i64
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            min_consolidation_factor: default_min_consolidation_factor(),
            max_consolidation_input_script_size: default_max_consolidation_input_script_size(),
            min_conf_consolidation_input: default_min_conf_consolidation_input(),
            accept_non_std_consolidation_input: DEFAULT_ACCEPT_NON_STD_CONSOLIDATION_INPUT,
        }
    }
}

/// Block size settings. `None` keeps the network default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSizeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_block_size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_generated_block_size: Option<u64>,

    #[serde(default = "default_factor_max_send_queues_bytes")]
    pub factor_max_send_queues_bytes: u64,
}

fn default_factor_max_send_queues_bytes() -> u64 {
    DEFAULT_FACTOR_MAX_SEND_QUEUES_BYTES
}

impl Default for BlockSizeConfig {
    fn default() -> Self {
        Self {
            max_block_size: None,
            max_generated_block_size: None,
            factor_max_send_queues_bytes: default_factor_max_send_queues_bytes(),
        }
    }
}

/// Script validation time budgets in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationDurationConfig {
    #[serde(default = "default_max_std_txn_validation_duration")]
    pub max_std_txn_validation_duration_ms: i64,

    #[serde(default = "default_max_non_std_txn_validation_duration")]
    pub max_non_std_txn_validation_duration_ms: i64,

    #[serde(default = "default_max_txn_chain_validation_budget")]
    pub max_txn_chain_validation_budget_ms: i64,
}

fn default_max_std_txn_validation_duration() -> i64 {
    DEFAULT_MAX_STD_TXN_VALIDATION_DURATION as i64
}

fn default_max_non_std_txn_validation_duration() -> i64 {
    DEFAULT_MAX_NON_STD_TXN_VALIDATION_DURATION as i64
}

fn default_max_txn_chain_validation_budget() -> i64 {
    DEFAULT_MAX_TXN_CHAIN_VALIDATION_BUDGET as i64
}

impl Default for ValidationDurationConfig {
    fn default() -> Self {
        Self {
            max_std_txn_validation_duration_ms: default_max_std_txn_validation_duration(),
            max_non_std_txn_validation_duration_ms: default_max_non_std_txn_validation_duration(),
            max_txn_chain_validation_budget_ms: default_max_txn_chain_validation_budget(),
        }
    }
}

fn default_network() -> Network {
    Network::Main
}

/// Complete node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default = "default_network")]
    pub network: Network,

    #[serde(default)]
    pub script: ScriptLimitsConfig,

    #[serde(default)]
    pub tx_policy: TxPolicyConfig,

    #[serde(default)]
    pub consolidation: ConsolidationConfig,

    #[serde(default)]
    pub block_size: BlockSizeConfig,

    #[serde(default)]
    pub validation: ValidationDurationConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            script: ScriptLimitsConfig::default(),
            tx_policy: TxPolicyConfig::default(),
            consolidation: ConsolidationConfig::default(),
            block_size: BlockSizeConfig::default(),
            validation: ValidationDurationConfig::default(),
        }
    }
}

#[cold]
fn config_error(msg: String) -> ConsensusError {
    ConsensusError::Config(msg.into())
}

fn parse_var<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| config_error(format!("invalid value '{raw}' for {name}")))
}

fn override_from<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    target: &mut T,
) -> Result<()> {
    if let Some(raw) = lookup(name) {
        *target = parse_var(name, &raw)?;
    }
    Ok(())
}

fn override_option<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    target: &mut Option<T>,
) -> Result<()> {
    if let Some(raw) = lookup(name) {
        *target = Some(parse_var(name, &raw)?);
    }
    Ok(())
}

impl NodeConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| config_error(format!("invalid config: {e}")))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| config_error(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    /// Defaults overridden by `NOVO_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `NOVO_*` name.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        let l = &lookup;

        override_from(l, "NOVO_NETWORK", &mut config.network)?;

        let script = &mut config.script;
        override_from(l, "NOVO_MAX_SCRIPT_SIZE_POLICY", &mut script.max_script_size_policy)?;
        override_from(l, "NOVO_MAX_OPS_PER_SCRIPT_POLICY", &mut script.max_ops_per_script_policy)?;
        override_from(
            l,
            "NOVO_MAX_PUBKEYS_PER_MULTISIG_POLICY",
            &mut script.max_pubkeys_per_multisig_policy,
        )?;
        override_from(
            l,
            "NOVO_MAX_SCRIPT_NUM_LENGTH_POLICY",
            &mut script.max_script_num_length_policy,
        )?;
        override_from(
            l,
            "NOVO_MAX_STACK_MEMORY_USAGE_CONSENSUS",
            &mut script.max_stack_memory_usage_consensus,
        )?;
        override_from(
            l,
            "NOVO_MAX_STACK_MEMORY_USAGE_POLICY",
            &mut script.max_stack_memory_usage_policy,
        )?;

        let tx = &mut config.tx_policy;
        override_from(l, "NOVO_MAX_TX_SIZE_POLICY", &mut tx.max_tx_size_policy)?;
        override_from(l, "NOVO_MAX_TX_SIGOPS_COUNT_POLICY", &mut tx.max_tx_sigops_count_policy)?;
        override_from(l, "NOVO_MIN_RELAY_FEE_PER_KB", &mut tx.min_relay_fee_per_kb)?;
        override_from(l, "NOVO_BLOCK_MIN_FEE_PER_KB", &mut tx.block_min_fee_per_kb)?;
        override_from(l, "NOVO_DUST_LIMIT_FACTOR", &mut tx.dust_limit_factor)?;
        override_from(l, "NOVO_DATA_CARRIER_SIZE", &mut tx.data_carrier_size)?;
        override_from(l, "NOVO_ACCEPT_DATACARRIER", &mut tx.accept_datacarrier)?;
        override_from(l, "NOVO_PERMIT_BARE_MULTISIG", &mut tx.permit_bare_multisig)?;
        override_from(l, "NOVO_LIMIT_ANCESTOR_COUNT", &mut tx.limit_ancestor_count)?;
        override_from(
            l,
            "NOVO_LIMIT_SECONDARY_MEMPOOL_ANCESTOR_COUNT",
            &mut tx.limit_secondary_mempool_ancestor_count,
        )?;

        let cons = &mut config.consolidation;
        override_from(l, "NOVO_MIN_CONSOLIDATION_FACTOR", &mut cons.min_consolidation_factor)?;
        override_from(
            l,
            "NOVO_MAX_CONSOLIDATION_INPUT_SCRIPT_SIZE",
            &mut cons.max_consolidation_input_script_size,
        )?;
        override_from(
            l,
            "NOVO_MIN_CONF_CONSOLIDATION_INPUT",
            &mut cons.min_conf_consolidation_input,
        )?;
        override_from(
            l,
            "NOVO_ACCEPT_NON_STD_CONSOLIDATION_INPUT",
            &mut cons.accept_non_std_consolidation_input,
        )?;

        let blocks = &mut config.block_size;
        override_option(l, "NOVO_MAX_BLOCK_SIZE", &mut blocks.max_block_size)?;
        override_option(
            l,
            "NOVO_MAX_GENERATED_BLOCK_SIZE",
            &mut blocks.max_generated_block_size,
        )?;
        override_from(
            l,
            "NOVO_FACTOR_MAX_SEND_QUEUES_BYTES",
            &mut blocks.factor_max_send_queues_bytes,
        )?;

        let validation = &mut config.validation;
        override_from(
            l,
            "NOVO_MAX_STD_TXN_VALIDATION_DURATION_MS",
            &mut validation.max_std_txn_validation_duration_ms,
        )?;
        override_from(
            l,
            "NOVO_MAX_NON_STD_TXN_VALIDATION_DURATION_MS",
            &mut validation.max_non_std_txn_validation_duration_ms,
        )?;
        override_from(
            l,
            "NOVO_MAX_TXN_CHAIN_VALIDATION_BUDGET_MS",
            &mut validation.max_txn_chain_validation_budget_ms,
        )?;

        Ok(config)
    }

    /// Push every setting through the validated setters of `limits`,
    /// stopping at the first rejected value.
    pub fn apply(&self, limits: &dyn LimitsAdmin) -> Result<()> {
        let script = &self.script;
        limits.set_max_script_size_policy(script.max_script_size_policy)?;
        limits.set_max_ops_per_script_policy(script.max_ops_per_script_policy)?;
        limits.set_max_pubkeys_per_multisig_policy(script.max_pubkeys_per_multisig_policy)?;
        limits.set_max_script_num_length_policy(script.max_script_num_length_policy)?;
        limits.set_max_stack_memory_usage(
            script.max_stack_memory_usage_consensus,
            script.max_stack_memory_usage_policy,
        )?;

        let tx = &self.tx_policy;
        limits.set_max_tx_size_policy(tx.max_tx_size_policy)?;
        limits.set_max_tx_sigops_count_policy(tx.max_tx_sigops_count_policy)?;
        limits.set_min_fee_per_kb(tx.min_relay_fee_per_kb);
        limits.set_block_min_fee_per_kb(tx.block_min_fee_per_kb);
        limits.set_dust_limit_factor(tx.dust_limit_factor)?;
        limits.set_data_carrier_size(tx.data_carrier_size);
        limits.set_accept_datacarrier(tx.accept_datacarrier);
        limits.set_permit_bare_multisig(tx.permit_bare_multisig);
        limits.set_limit_ancestor_count(tx.limit_ancestor_count)?;
        limits.set_limit_secondary_mempool_ancestor_count(
            tx.limit_secondary_mempool_ancestor_count,
        )?;

        let cons = &self.consolidation;
        limits.set_min_consolidation_factor(cons.min_consolidation_factor)?;
        limits.set_max_consolidation_input_script_size(cons.max_consolidation_input_script_size)?;
        limits.set_min_conf_consolidation_input(cons.min_conf_consolidation_input)?;
        limits.set_accept_non_std_consolidation_input(cons.accept_non_std_consolidation_input)?;

        let blocks = &self.block_size;
        if let Some(size) = blocks.max_block_size {
            limits.set_max_block_size(size)?;
        }
        if let Some(size) = blocks.max_generated_block_size {
            limits.set_max_generated_block_size(size)?;
        }
        limits.set_factor_max_send_queues_bytes(blocks.factor_max_send_queues_bytes);

        let validation = &self.validation;
        limits.set_max_std_txn_validation_duration(validation.max_std_txn_validation_duration_ms)?;
        limits.set_max_non_std_txn_validation_duration(
            validation.max_non_std_txn_validation_duration_ms,
        )?;
        limits.set_max_txn_chain_validation_budget(validation.max_txn_chain_validation_budget_ms)?;

        info!(network = %self.network, "configuration applied");
        Ok(())
    }

    pub fn chain_params(&self) -> &'static ChainParams {
        ChainParams::get(self.network)
    }

    /// Registry for the configured network with every setting applied.
    pub fn build_limits(&self) -> Result<GlobalConfig> {
        let limits = GlobalConfig::for_network(self.chain_params());
        self.apply(&limits)?;
        Ok(limits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::LimitsView;
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_apply_cleanly() {
        let limits = NodeConfig::default().build_limits().unwrap();
        assert_eq!(limits.max_block_size(), MAIN_DEFAULT_MAX_BLOCK_SIZE);
        assert_eq!(limits.max_tx_size(false), DEFAULT_MAX_TX_SIZE_POLICY);
        assert_eq!(limits.min_fee_per_kb(), DEFAULT_MIN_RELAY_TX_FEE);
        assert_eq!(limits.dust_limit_factor(), DEFAULT_DUST_LIMIT_FACTOR);
        assert_eq!(
            limits.max_std_txn_validation_duration(),
            Duration::from_millis(DEFAULT_MAX_STD_TXN_VALIDATION_DURATION)
        );
    }

    #[test]
    fn test_empty_json_gives_defaults() {
        assert_eq!(NodeConfig::from_json_str("{}").unwrap(), NodeConfig::default());
    }

    #[test]
    fn test_partial_json_overrides() {
        let config = NodeConfig::from_json_str(
            r#"{
                "network": "regtest",
                "tx_policy": { "dust_limit_factor": 100, "accept_datacarrier": false },
                "block_size": { "max_block_size": 64000000 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.network, Network::Regtest);
        assert_eq!(config.tx_policy.dust_limit_factor, 100);
        assert!(!config.tx_policy.accept_datacarrier);
        assert_eq!(config.tx_policy.max_tx_size_policy, default_max_tx_size_policy());

        let limits = config.build_limits().unwrap();
        assert_eq!(limits.max_block_size(), 64_000_000);
        assert_eq!(limits.max_generated_block_size(), REGTEST_DEFAULT_MAX_GENERATED_BLOCK_SIZE);
        assert!(!limits.accept_datacarrier());
    }

    #[test]
    fn test_negative_value_reaches_setter() {
        let config =
            NodeConfig::from_json_str(r#"{ "tx_policy": { "max_tx_size_policy": -1 } }"#).unwrap();
        let err = config.build_limits().unwrap_err();
        assert_eq!(
            err,
            ConsensusError::Config("Policy value for max tx size must not be less than 0".into())
        );
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        assert!(matches!(
            NodeConfig::from_json_str("{ not json"),
            Err(ConsensusError::Config(_))
        ));
        assert!(matches!(
            NodeConfig::from_json_str(r#"{ "network": "moon" }"#),
            Err(ConsensusError::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let config = NodeConfig::from_lookup(lookup(&[
            ("NOVO_NETWORK", "stn"),
            ("NOVO_DUST_LIMIT_FACTOR", "0"),
            ("NOVO_PERMIT_BARE_MULTISIG", "false"),
            ("NOVO_MAX_GENERATED_BLOCK_SIZE", "2000000"),
        ]))
        .unwrap();
        assert_eq!(config.network, Network::Stn);
        assert_eq!(config.tx_policy.dust_limit_factor, 0);
        assert!(!config.tx_policy.permit_bare_multisig);
        assert_eq!(config.block_size.max_generated_block_size, Some(2_000_000));
        assert_eq!(config.block_size.max_block_size, None);

        let limits = config.build_limits().unwrap();
        assert_eq!(limits.max_block_size(), STN_DEFAULT_MAX_BLOCK_SIZE);
        assert_eq!(limits.max_generated_block_size(), 2_000_000);
    }

    #[test]
    fn test_env_rejects_unparsable() {
        let err = NodeConfig::from_lookup(lookup(&[("NOVO_DUST_LIMIT_FACTOR", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("NOVO_DUST_LIMIT_FACTOR"));
    }

    #[test]
    fn test_apply_stops_at_first_rejection() {
        let mut config = NodeConfig::default();
        config.script.max_script_size_policy = -5;
        config.tx_policy.dust_limit_factor = 100;
        let limits = GlobalConfig::for_network(config.chain_params());
        assert!(config.apply(&limits).is_err());
        // The later dust setting was never reached.
        assert_eq!(limits.dust_limit_factor(), DEFAULT_DUST_LIMIT_FACTOR);
    }

    #[test]
    fn test_json_file_round_trip() {
        let config = NodeConfig {
            network: Network::Test,
            ..NodeConfig::default()
        };
        let path = std::env::temp_dir().join(format!("novo-config-{}.json", std::process::id()));
        std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
        let loaded = NodeConfig::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
        assert!(NodeConfig::from_json_file("/nonexistent/novo.json").is_err());
    }
}

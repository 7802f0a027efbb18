//! Consensus and policy limits registry
//!
//! Every tunable that script evaluation and standardness consult lives here.
//! Dual-valued tunables expose both a consensus value (network rule) and a
//! policy value (local relay/mining choice) through a single getter taking
//! `is_consensus`.
//!
//! Validation code depends only on [`LimitsView`]. Startup and administrative
//! code holds a [`LimitsAdmin`], whose setters validate the new value fully
//! before taking the write lock, so a rejected call leaves the registry
//! untouched.
//!
//! The registry is an ordinary value: construct one with
//! [`GlobalConfig::new`] or [`GlobalConfig::for_network`] and pass it to the
//! code that needs it. Reads and writes may happen from any thread.

use crate::chainparams::ChainParams;
use crate::constants::*;
use crate::error::{ConsensusError, Result};
use crate::types::Amount;
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-network block size defaults installed once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultBlockSizeParams {
    pub max_block_size: u64,
    pub max_generated_block_size: u64,
}

/// Read-only access to the limits registry.
pub trait LimitsView: Send + Sync {
    fn max_tx_size(&self, is_consensus: bool) -> u64;
    fn max_script_size(&self, is_consensus: bool) -> u64;
    fn max_ops_per_script(&self, is_consensus: bool) -> u64;
    fn max_pubkeys_per_multisig(&self, is_consensus: bool) -> u64;
    fn max_script_num_length(&self, is_consensus: bool) -> u64;
    fn max_stack_memory_usage(&self, is_consensus: bool) -> u64;

    fn max_tx_sigops_count_policy(&self) -> u64;
    /// Sigops allowed in a block of `block_size` bytes: 75 000 per started MB.
    fn max_block_sigops_consensus(&self, block_size: u64) -> u64;

    fn min_fee_per_kb(&self) -> Amount;
    fn block_min_fee_per_kb(&self) -> Amount;
    fn dust_limit_factor(&self) -> i64;
    fn data_carrier_size(&self) -> u64;
    fn accept_datacarrier(&self) -> bool;
    fn permit_bare_multisig(&self) -> bool;

    fn min_consolidation_factor(&self) -> u64;
    fn max_consolidation_input_script_size(&self) -> u64;
    fn min_conf_consolidation_input(&self) -> u64;
    fn accept_non_std_consolidation_input(&self) -> bool;

    fn limit_ancestor_count(&self) -> u64;
    fn limit_secondary_mempool_ancestor_count(&self) -> u64;

    fn max_std_txn_validation_duration(&self) -> Duration;
    fn max_non_std_txn_validation_duration(&self) -> Duration;
    fn max_txn_chain_validation_budget(&self) -> Duration;

    /// # Panics
    /// If [`LimitsAdmin::set_default_block_size_params`] was never called.
    fn max_block_size(&self) -> u64;
    /// # Panics
    /// If [`LimitsAdmin::set_default_block_size_params`] was never called.
    fn max_generated_block_size(&self) -> u64;

    fn factor_max_send_queues_bytes(&self) -> u64;
    /// `factor × max_block_size`, saturating at `u64::MAX`.
    fn max_send_queues_bytes(&self) -> u64;
}

/// Validated mutation of the limits registry.
///
/// Setters taking a signed value reject negatives themselves so that a
/// misconfigured node reports the real problem.
pub trait LimitsAdmin: LimitsView {
    fn reset(&self);
    fn set_default_block_size_params(&self, params: DefaultBlockSizeParams);

    fn set_max_block_size(&self, value: u64) -> Result<()>;
    fn set_max_generated_block_size(&self, value: u64) -> Result<()>;
    fn set_factor_max_send_queues_bytes(&self, value: u64);

    fn set_max_tx_size_policy(&self, value: i64) -> Result<()>;
    fn set_max_script_size_policy(&self, value: i64) -> Result<()>;
    fn set_max_ops_per_script_policy(&self, value: i64) -> Result<()>;
    fn set_max_pubkeys_per_multisig_policy(&self, value: i64) -> Result<()>;
    fn set_max_script_num_length_policy(&self, value: i64) -> Result<()>;
    fn set_max_stack_memory_usage(&self, consensus: i64, policy: i64) -> Result<()>;
    fn set_max_tx_sigops_count_policy(&self, value: i64) -> Result<()>;

    fn set_min_fee_per_kb(&self, fee: Amount);
    fn set_block_min_fee_per_kb(&self, fee: Amount);
    fn set_dust_limit_factor(&self, factor: i64) -> Result<()>;
    fn set_data_carrier_size(&self, value: u64);
    fn set_accept_datacarrier(&self, accept: bool);
    fn set_permit_bare_multisig(&self, permit: bool);

    fn set_min_consolidation_factor(&self, value: i64) -> Result<()>;
    fn set_max_consolidation_input_script_size(&self, value: i64) -> Result<()>;
    fn set_min_conf_consolidation_input(&self, value: i64) -> Result<()>;
    fn set_accept_non_std_consolidation_input(&self, accept: bool) -> Result<()>;

    fn set_limit_ancestor_count(&self, value: i64) -> Result<()>;
    fn set_limit_secondary_mempool_ancestor_count(&self, value: i64) -> Result<()>;

    fn set_max_std_txn_validation_duration(&self, ms: i64) -> Result<()>;
    fn set_max_non_std_txn_validation_duration(&self, ms: i64) -> Result<()>;
    fn set_max_txn_chain_validation_budget(&self, ms: i64) -> Result<()>;
}

// ============================================================================
// STATE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct LimitsState {
    default_block_size_set: bool,
    max_block_size: u64,
    default_block_size: u64,
    max_generated_block_size: u64,
    factor_max_send_queues_bytes: u64,

    max_tx_size_policy: u64,
    max_script_size_policy: u64,
    max_ops_per_script_policy: u64,
    max_pubkeys_per_multisig_policy: u64,
    max_script_num_length_policy: u64,
    max_stack_memory_usage_consensus: u64,
    max_stack_memory_usage_policy: u64,
    max_tx_sigops_count_policy: u64,

    min_fee_per_kb: Amount,
    block_min_fee_per_kb: Amount,
    dust_limit_factor: i64,
    data_carrier_size: u64,
    accept_datacarrier: bool,
    permit_bare_multisig: bool,

    min_consolidation_factor: u64,
    max_consolidation_input_script_size: u64,
    min_conf_consolidation_input: u64,
    accept_non_std_consolidation_input: bool,

    limit_ancestor_count: u64,
    limit_secondary_mempool_ancestor_count: u64,

    max_std_txn_validation_duration: Duration,
    max_non_std_txn_validation_duration: Duration,
    max_txn_chain_validation_budget: Duration,
}

impl Default for LimitsState {
    fn default() -> Self {
        Self {
            default_block_size_set: false,
            max_block_size: 0,
            default_block_size: 0,
            max_generated_block_size: 0,
            factor_max_send_queues_bytes: DEFAULT_FACTOR_MAX_SEND_QUEUES_BYTES,

            max_tx_size_policy: DEFAULT_MAX_TX_SIZE_POLICY,
            max_script_size_policy: DEFAULT_MAX_SCRIPT_SIZE_POLICY,
            max_ops_per_script_policy: DEFAULT_OPS_PER_SCRIPT_POLICY,
            max_pubkeys_per_multisig_policy: DEFAULT_PUBKEYS_PER_MULTISIG_POLICY,
            max_script_num_length_policy: DEFAULT_SCRIPT_NUM_LENGTH_POLICY,
            max_stack_memory_usage_consensus: DEFAULT_STACK_MEMORY_USAGE_CONSENSUS,
            max_stack_memory_usage_policy: DEFAULT_STACK_MEMORY_USAGE_POLICY,
            max_tx_sigops_count_policy: DEFAULT_TX_SIGOPS_COUNT_POLICY,

            min_fee_per_kb: DEFAULT_MIN_RELAY_TX_FEE,
            block_min_fee_per_kb: DEFAULT_BLOCK_MIN_TX_FEE,
            dust_limit_factor: DEFAULT_DUST_LIMIT_FACTOR,
            data_carrier_size: DEFAULT_DATA_CARRIER_SIZE,
            accept_datacarrier: DEFAULT_ACCEPT_DATACARRIER,
            permit_bare_multisig: DEFAULT_PERMIT_BAREMULTISIG,

            min_consolidation_factor: DEFAULT_MIN_CONSOLIDATION_FACTOR,
            max_consolidation_input_script_size: DEFAULT_MAX_CONSOLIDATION_INPUT_SCRIPT_SIZE,
            min_conf_consolidation_input: DEFAULT_MIN_CONF_CONSOLIDATION_INPUT,
            accept_non_std_consolidation_input: DEFAULT_ACCEPT_NON_STD_CONSOLIDATION_INPUT,

            limit_ancestor_count: DEFAULT_ANCESTOR_LIMIT,
            limit_secondary_mempool_ancestor_count: DEFAULT_SECONDARY_MEMPOOL_ANCESTOR_LIMIT,

            max_std_txn_validation_duration: Duration::from_millis(
                DEFAULT_MAX_STD_TXN_VALIDATION_DURATION,
            ),
            max_non_std_txn_validation_duration: Duration::from_millis(
                DEFAULT_MAX_NON_STD_TXN_VALIDATION_DURATION,
            ),
            max_txn_chain_validation_budget: Duration::from_millis(
                DEFAULT_MAX_TXN_CHAIN_VALIDATION_BUDGET,
            ),
        }
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Log and build a rejected-setter error.
#[cold]
fn reject(setting: &'static str, message: impl Into<String>) -> ConsensusError {
    let message = message.into();
    warn!(setting, %message, "rejected limits setting");
    ConsensusError::Config(message.into())
}

fn non_negative(setting: &'static str, value: i64, message: &'static str) -> Result<u64> {
    u64::try_from(value).map_err(|_| reject(setting, message))
}

/// The common policy-vs-consensus pattern: negative rejected, 0 selects the
/// consensus value, anything above consensus rejected.
fn policy_up_to_consensus(
    setting: &'static str,
    value: i64,
    consensus: u64,
    negative_message: &'static str,
    exceeds_message: String,
) -> Result<u64> {
    let value = non_negative(setting, value, negative_message)?;
    if value > consensus {
        return Err(reject(setting, exceeds_message));
    }
    Ok(if value == 0 { consensus } else { value })
}

fn validate_max_tx_size_policy(value: i64) -> Result<u64> {
    const SETTING: &str = "max_tx_size_policy";
    let value = non_negative(
        SETTING,
        value,
        "Policy value for max tx size must not be less than 0",
    )?;
    if value == 0 {
        return Ok(MAX_TX_SIZE_CONSENSUS);
    }
    if value > MAX_TX_SIZE_CONSENSUS {
        return Err(reject(
            SETTING,
            format!(
                "Policy value for max tx size must not exceed consensus limit of {MAX_TX_SIZE_CONSENSUS}"
            ),
        ));
    }
    if value < DEFAULT_MAX_TX_SIZE_POLICY {
        return Err(reject(
            SETTING,
            format!("Policy value for max tx size must not be less than {DEFAULT_MAX_TX_SIZE_POLICY}"),
        ));
    }
    Ok(value)
}

fn validate_max_script_num_length_policy(value: i64) -> Result<u64> {
    const SETTING: &str = "max_script_num_length_policy";
    let value = non_negative(
        SETTING,
        value,
        "Policy value for maximum script number length must not be less than 0.",
    )?;
    if value > MAX_SCRIPT_NUM_LENGTH {
        return Err(reject(
            SETTING,
            format!(
                "Policy value for maximum script number length must not exceed consensus limit of {MAX_SCRIPT_NUM_LENGTH}."
            ),
        ));
    }
    if value == 0 {
        return Ok(MAX_SCRIPT_NUM_LENGTH);
    }
    if value < MIN_SCRIPT_NUM_LENGTH {
        return Err(reject(
            SETTING,
            format!(
                "Policy value for maximum script number length must not be less than {MIN_SCRIPT_NUM_LENGTH}."
            ),
        ));
    }
    Ok(value)
}

/// Returns `(consensus, policy)`.
fn validate_max_stack_memory_usage(consensus: i64, policy: i64) -> Result<(u64, u64)> {
    const SETTING: &str = "max_stack_memory_usage";
    if consensus < 0 || policy < 0 {
        return Err(reject(
            SETTING,
            "Policy and consensus value for max stack memory usage must not be less than 0.",
        ));
    }
    let or_default = |v: i64| {
        if v == 0 {
            DEFAULT_STACK_MEMORY_USAGE_CONSENSUS
        } else {
            v as u64
        }
    };
    let consensus = or_default(consensus);
    let policy = or_default(policy);
    if policy > consensus {
        return Err(reject(
            SETTING,
            format!(
                "Policy value of max stack memory usage must not exceed consensus limit of {consensus}"
            ),
        ));
    }
    Ok((consensus, policy))
}

fn validate_max_tx_sigops_count_policy(value: i64) -> Result<u64> {
    const SETTING: &str = "max_tx_sigops_count_policy";
    let value = non_negative(
        SETTING,
        value,
        "Policy value for maximum allowed number of signature operations per transaction cannot be less than 0",
    )?;
    if value > MAX_TX_SIGOPS_COUNT_POLICY {
        return Err(reject(
            SETTING,
            format!(
                "Policy value for maximum allowed number of signature operations per transaction must not exceed limit of {MAX_TX_SIGOPS_COUNT_POLICY}"
            ),
        ));
    }
    Ok(if value == 0 {
        MAX_TX_SIGOPS_COUNT_POLICY
    } else {
        value
    })
}

fn validate_duration(
    setting: &'static str,
    ms: i64,
    min_ms: i64,
    message: &'static str,
) -> Result<Duration> {
    if ms < min_ms {
        return Err(reject(setting, message));
    }
    Ok(Duration::from_millis(ms as u64))
}

// ============================================================================
// GLOBAL CONFIG
// ============================================================================

/// The limits registry.
///
/// All state sits behind one reader-writer lock; each setter holds the write
/// lock only for the final assignment.
#[derive(Debug, Default)]
pub struct GlobalConfig {
    state: RwLock<LimitsState>,
}

impl GlobalConfig {
    /// Registry with default policy values. Block-size getters panic until
    /// [`LimitsAdmin::set_default_block_size_params`] is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the block-size defaults of `params`.
    pub fn for_network(params: &ChainParams) -> Self {
        let config = Self::new();
        config.set_default_block_size_params(params.default_block_size_params);
        config
    }

    fn read(&self) -> RwLockReadGuard<'_, LimitsState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LimitsState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Commit an already validated value.
    fn commit(&self, setting: &'static str, apply: impl FnOnce(&mut LimitsState)) {
        apply(&mut self.write());
        debug!(setting, "updated limits setting");
    }

    fn block_size_state(&self) -> RwLockReadGuard<'_, LimitsState> {
        let state = self.read();
        if !state.default_block_size_set {
            panic!(
                "set_default_block_size_params must be called before accessing block size related parameters"
            );
        }
        state
    }
}

impl LimitsView for GlobalConfig {
    fn max_tx_size(&self, is_consensus: bool) -> u64 {
        if is_consensus {
            MAX_TX_SIZE_CONSENSUS
        } else {
            self.read().max_tx_size_policy
        }
    }

    fn max_script_size(&self, is_consensus: bool) -> u64 {
        if is_consensus {
            MAX_SCRIPT_SIZE
        } else {
            self.read().max_script_size_policy
        }
    }

    fn max_ops_per_script(&self, is_consensus: bool) -> u64 {
        if is_consensus {
            MAX_OPS_PER_SCRIPT
        } else {
            self.read().max_ops_per_script_policy
        }
    }

    fn max_pubkeys_per_multisig(&self, is_consensus: bool) -> u64 {
        if is_consensus {
            MAX_PUBKEYS_PER_MULTISIG
        } else {
            self.read().max_pubkeys_per_multisig_policy
        }
    }

    fn max_script_num_length(&self, is_consensus: bool) -> u64 {
        if is_consensus {
            MAX_SCRIPT_NUM_LENGTH
        } else {
            self.read().max_script_num_length_policy
        }
    }

    fn max_stack_memory_usage(&self, is_consensus: bool) -> u64 {
        let state = self.read();
        if is_consensus {
            state.max_stack_memory_usage_consensus
        } else {
            state.max_stack_memory_usage_policy
        }
    }

    fn max_tx_sigops_count_policy(&self) -> u64 {
        self.read().max_tx_sigops_count_policy
    }

    fn max_block_sigops_consensus(&self, block_size: u64) -> u64 {
        let started_mb = 1 + block_size.saturating_sub(1) / ONE_MEGABYTE;
        started_mb.saturating_mul(MAX_BLOCK_SIGOPS_PER_MB)
    }

    fn min_fee_per_kb(&self) -> Amount {
        self.read().min_fee_per_kb
    }

    fn block_min_fee_per_kb(&self) -> Amount {
        self.read().block_min_fee_per_kb
    }

    fn dust_limit_factor(&self) -> i64 {
        self.read().dust_limit_factor
    }

    fn data_carrier_size(&self) -> u64 {
        self.read().data_carrier_size
    }

    fn accept_datacarrier(&self) -> bool {
        self.read().accept_datacarrier
    }

    fn permit_bare_multisig(&self) -> bool {
        self.read().permit_bare_multisig
    }

    fn min_consolidation_factor(&self) -> u64 {
        self.read().min_consolidation_factor
    }

    fn max_consolidation_input_script_size(&self) -> u64 {
        self.read().max_consolidation_input_script_size
    }

    fn min_conf_consolidation_input(&self) -> u64 {
        self.read().min_conf_consolidation_input
    }

    fn accept_non_std_consolidation_input(&self) -> bool {
        self.read().accept_non_std_consolidation_input
    }

    fn limit_ancestor_count(&self) -> u64 {
        self.read().limit_ancestor_count
    }

    fn limit_secondary_mempool_ancestor_count(&self) -> u64 {
        self.read().limit_secondary_mempool_ancestor_count
    }

    fn max_std_txn_validation_duration(&self) -> Duration {
        self.read().max_std_txn_validation_duration
    }

    fn max_non_std_txn_validation_duration(&self) -> Duration {
        self.read().max_non_std_txn_validation_duration
    }

    fn max_txn_chain_validation_budget(&self) -> Duration {
        self.read().max_txn_chain_validation_budget
    }

    fn max_block_size(&self) -> u64 {
        self.block_size_state().max_block_size
    }

    fn max_generated_block_size(&self) -> u64 {
        self.block_size_state().max_generated_block_size
    }

    fn factor_max_send_queues_bytes(&self) -> u64 {
        self.read().factor_max_send_queues_bytes
    }

    fn max_send_queues_bytes(&self) -> u64 {
        let state = self.block_size_state();
        let max_block_size = state.max_block_size;
        let factor = state.factor_max_send_queues_bytes;
        if max_block_size == 0 {
            return 0;
        }
        if factor > u64::MAX / max_block_size {
            return u64::MAX;
        }
        factor * max_block_size
    }
}

impl LimitsAdmin for GlobalConfig {
    fn reset(&self) {
        *self.write() = LimitsState::default();
        info!("limits registry reset to defaults");
    }

    fn set_default_block_size_params(&self, params: DefaultBlockSizeParams) {
        {
            let mut state = self.write();
            state.max_block_size = params.max_block_size;
            state.default_block_size = params.max_block_size;
            state.max_generated_block_size = params.max_generated_block_size;
            state.default_block_size_set = true;
        }
        info!(
            max_block_size = params.max_block_size,
            max_generated_block_size = params.max_generated_block_size,
            "installed default block size parameters"
        );
    }

    fn set_max_block_size(&self, value: u64) -> Result<()> {
        // Equal is rejected too: blocks must be strictly larger than the legacy limit.
        if value != 0 && value <= LEGACY_MAX_BLOCK_SIZE {
            return Err(reject(
                "max_block_size",
                format!(
                    "Excessive block size (excessiveblocksize) must be larger than {LEGACY_MAX_BLOCK_SIZE}"
                ),
            ));
        }
        self.commit("max_block_size", |s| {
            s.max_block_size = if value == 0 {
                s.default_block_size
            } else {
                value
            };
        });
        Ok(())
    }

    fn set_max_generated_block_size(&self, value: u64) -> Result<()> {
        self.commit("max_generated_block_size", |s| {
            s.max_generated_block_size = value
        });
        Ok(())
    }

    fn set_factor_max_send_queues_bytes(&self, value: u64) {
        self.commit("factor_max_send_queues_bytes", |s| {
            s.factor_max_send_queues_bytes = value
        });
    }

    fn set_max_tx_size_policy(&self, value: i64) -> Result<()> {
        let value = validate_max_tx_size_policy(value)?;
        self.commit("max_tx_size_policy", |s| s.max_tx_size_policy = value);
        Ok(())
    }

    fn set_max_script_size_policy(&self, value: i64) -> Result<()> {
        const SETTING: &str = "max_script_size_policy";
        let value = policy_up_to_consensus(
            SETTING,
            value,
            MAX_SCRIPT_SIZE,
            "Policy value for max script size must not be less than 0",
            format!("Policy value for max script size must not exceed consensus limit of {MAX_SCRIPT_SIZE}"),
        )?;
        self.commit(SETTING, |s| s.max_script_size_policy = value);
        Ok(())
    }

    fn set_max_ops_per_script_policy(&self, value: i64) -> Result<()> {
        const SETTING: &str = "max_ops_per_script_policy";
        let value = policy_up_to_consensus(
            SETTING,
            value,
            MAX_OPS_PER_SCRIPT,
            "Policy value for MaxOpsPerScript cannot be less than zero.",
            format!(
                "Policy value for MaxOpsPerScript must not exceed consensus limit of {MAX_OPS_PER_SCRIPT}."
            ),
        )?;
        self.commit(SETTING, |s| s.max_ops_per_script_policy = value);
        Ok(())
    }

    fn set_max_pubkeys_per_multisig_policy(&self, value: i64) -> Result<()> {
        const SETTING: &str = "max_pubkeys_per_multisig_policy";
        let value = policy_up_to_consensus(
            SETTING,
            value,
            MAX_PUBKEYS_PER_MULTISIG,
            "Policy value for maximum public keys per multisig must not be less than zero",
            format!(
                "Policy value for maximum public keys per multisig must not exceed consensus limit of {MAX_PUBKEYS_PER_MULTISIG}."
            ),
        )?;
        self.commit(SETTING, |s| s.max_pubkeys_per_multisig_policy = value);
        Ok(())
    }

    fn set_max_script_num_length_policy(&self, value: i64) -> Result<()> {
        let value = validate_max_script_num_length_policy(value)?;
        self.commit("max_script_num_length_policy", |s| {
            s.max_script_num_length_policy = value
        });
        Ok(())
    }

    fn set_max_stack_memory_usage(&self, consensus: i64, policy: i64) -> Result<()> {
        let (consensus, policy) = validate_max_stack_memory_usage(consensus, policy)?;
        self.commit("max_stack_memory_usage", |s| {
            s.max_stack_memory_usage_consensus = consensus;
            s.max_stack_memory_usage_policy = policy;
        });
        Ok(())
    }

    fn set_max_tx_sigops_count_policy(&self, value: i64) -> Result<()> {
        let value = validate_max_tx_sigops_count_policy(value)?;
        self.commit("max_tx_sigops_count_policy", |s| {
            s.max_tx_sigops_count_policy = value
        });
        Ok(())
    }

    fn set_min_fee_per_kb(&self, fee: Amount) {
        self.commit("min_fee_per_kb", |s| s.min_fee_per_kb = fee);
    }

    fn set_block_min_fee_per_kb(&self, fee: Amount) {
        self.commit("block_min_fee_per_kb", |s| s.block_min_fee_per_kb = fee);
    }

    fn set_dust_limit_factor(&self, factor: i64) -> Result<()> {
        if !(0..=DEFAULT_DUST_LIMIT_FACTOR).contains(&factor) {
            return Err(reject(
                "dust_limit_factor",
                format!("The dust limit factor must be between 0% and {DEFAULT_DUST_LIMIT_FACTOR}%"),
            ));
        }
        self.commit("dust_limit_factor", |s| s.dust_limit_factor = factor);
        Ok(())
    }

    fn set_data_carrier_size(&self, value: u64) {
        self.commit("data_carrier_size", |s| s.data_carrier_size = value);
    }

    fn set_accept_datacarrier(&self, accept: bool) {
        self.commit("accept_datacarrier", |s| s.accept_datacarrier = accept);
    }

    fn set_permit_bare_multisig(&self, permit: bool) {
        self.commit("permit_bare_multisig", |s| s.permit_bare_multisig = permit);
    }

    fn set_min_consolidation_factor(&self, value: i64) -> Result<()> {
        const SETTING: &str = "min_consolidation_factor";
        // Zero is kept as is and disables consolidation detection.
        let value = non_negative(
            SETTING,
            value,
            "Minimum consolidation factor cannot be less than zero.",
        )?;
        self.commit(SETTING, |s| s.min_consolidation_factor = value);
        Ok(())
    }

    fn set_max_consolidation_input_script_size(&self, value: i64) -> Result<()> {
        const SETTING: &str = "max_consolidation_input_script_size";
        let value = match non_negative(
            SETTING,
            value,
            "Maximum length for a scriptSig input in a consolidation txn cannot be less than zero.",
        )? {
            0 => DEFAULT_MAX_CONSOLIDATION_INPUT_SCRIPT_SIZE,
            v => v,
        };
        self.commit(SETTING, |s| s.max_consolidation_input_script_size = value);
        Ok(())
    }

    fn set_min_conf_consolidation_input(&self, value: i64) -> Result<()> {
        const SETTING: &str = "min_conf_consolidation_input";
        let value = match non_negative(
            SETTING,
            value,
            "Minimum number of confirmations of inputs spent by consolidation transactions cannot be less than 0",
        )? {
            0 => DEFAULT_MIN_CONF_CONSOLIDATION_INPUT,
            v => v,
        };
        self.commit(SETTING, |s| s.min_conf_consolidation_input = value);
        Ok(())
    }

    fn set_accept_non_std_consolidation_input(&self, accept: bool) -> Result<()> {
        self.commit("accept_non_std_consolidation_input", |s| {
            s.accept_non_std_consolidation_input = accept
        });
        Ok(())
    }

    fn set_limit_ancestor_count(&self, value: i64) -> Result<()> {
        const SETTING: &str = "limit_ancestor_count";
        if value <= 0 {
            return Err(reject(
                SETTING,
                "The maximal number of the in-mempool ancestors must be greater than 0.",
            ));
        }
        self.commit(SETTING, |s| s.limit_ancestor_count = value as u64);
        Ok(())
    }

    fn set_limit_secondary_mempool_ancestor_count(&self, value: i64) -> Result<()> {
        const SETTING: &str = "limit_secondary_mempool_ancestor_count";
        if value <= 1 {
            return Err(reject(
                SETTING,
                "The maximal number of the CPFP group members must be greater than 1.",
            ));
        }
        self.commit(SETTING, |s| {
            s.limit_secondary_mempool_ancestor_count = value as u64
        });
        Ok(())
    }

    fn set_max_std_txn_validation_duration(&self, ms: i64) -> Result<()> {
        const SETTING: &str = "max_std_txn_validation_duration";
        let value = validate_duration(
            SETTING,
            ms,
            1,
            "Per transaction max validation duration must be at least 1ms",
        )?;
        self.commit(SETTING, |s| s.max_std_txn_validation_duration = value);
        Ok(())
    }

    fn set_max_non_std_txn_validation_duration(&self, ms: i64) -> Result<()> {
        const SETTING: &str = "max_non_std_txn_validation_duration";
        let value = validate_duration(
            SETTING,
            ms,
            10,
            "Per transaction max validation duration must be at least 10ms",
        )?;
        self.commit(SETTING, |s| s.max_non_std_txn_validation_duration = value);
        Ok(())
    }

    fn set_max_txn_chain_validation_budget(&self, ms: i64) -> Result<()> {
        const SETTING: &str = "max_txn_chain_validation_budget";
        let value = validate_duration(
            SETTING,
            ms,
            0,
            "Per chain max validation duration budget must be non-negative",
        )?;
        self.commit(SETTING, |s| s.max_txn_chain_validation_budget = value);
        Ok(())
    }
}

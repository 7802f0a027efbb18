//! Consensus and policy constants for Novo Bitcoin
//!
//! Consensus values are network-wide rules. Policy values are the defaults for
//! the locally configurable limits held by [`crate::limits::GlobalConfig`].

// ============================================================================
// UNITS
// ============================================================================

/// Decimal kilobyte, used for all size limits
pub const ONE_KILOBYTE: u64 = 1000;

/// Decimal megabyte
pub const ONE_MEGABYTE: u64 = ONE_KILOBYTE * 1000;

/// Decimal gigabyte
pub const ONE_GIGABYTE: u64 = ONE_MEGABYTE * 1000;

/// Base units per coin
pub const COIN: i64 = 10_000;

// ============================================================================
// CONSENSUS
// ============================================================================

/// Historic 1MB block size; configured block sizes must be strictly larger
pub const LEGACY_MAX_BLOCK_SIZE: u64 = ONE_MEGABYTE;

/// Maximum serialized transaction size
pub const MAX_TX_SIZE_CONSENSUS: u64 = 8 * ONE_MEGABYTE;

/// Minimum serialized transaction size
pub const MIN_TX_SIZE_CONSENSUS: u64 = 65;

/// Sigops allowed per started megabyte of block
pub const MAX_BLOCK_SIGOPS_PER_MB: u64 = 75_000;

/// Maximum sigops in a single transaction
pub const MAX_TX_SIGOPS_COUNT: u64 = 15_000;

/// Maximum non-push operations per script
pub const MAX_OPS_PER_SCRIPT: u64 = u32::MAX as u64;

/// Maximum public keys per multisig
pub const MAX_PUBKEYS_PER_MULTISIG: u64 = u32::MAX as u64;

/// Maximum script size in bytes
pub const MAX_SCRIPT_SIZE: u64 = 8 * ONE_MEGABYTE;

/// Smallest allowed limit for script number length
pub const MIN_SCRIPT_NUM_LENGTH: u64 = 4;

/// Maximum length of a script number in bytes
pub const MAX_SCRIPT_NUM_LENGTH: u64 = 750 * ONE_KILOBYTE;

/// Maximum coinbase scriptSig size
pub const MAX_COINBASE_SCRIPTSIG_SIZE: u64 = 100;

/// Coinbase outputs need this many confirmations before they can be spent
pub const COINBASE_MATURITY: u64 = 100;

/// Default consensus ceiling for stack memory (effectively unlimited)
pub const DEFAULT_STACK_MEMORY_USAGE_CONSENSUS: u64 = i64::MAX as u64;

/// Highest transaction version relayed as standard
pub const MAX_STANDARD_VERSION: i32 = 2;

/// Transaction version that hashes inputs and outputs separately for its id
pub const RICH_TX_VERSION: i32 = 2;

// ============================================================================
// POLICY DEFAULTS
// ============================================================================

pub const MAIN_DEFAULT_MAX_BLOCK_SIZE: u64 = 8 * ONE_MEGABYTE;
pub const REGTEST_DEFAULT_MAX_BLOCK_SIZE: u64 = 32 * ONE_MEGABYTE;
pub const TESTNET_DEFAULT_MAX_BLOCK_SIZE: u64 = 32 * ONE_MEGABYTE;
pub const STN_DEFAULT_MAX_BLOCK_SIZE: u64 = 32 * ONE_MEGABYTE;

pub const MAIN_DEFAULT_MAX_GENERATED_BLOCK_SIZE: u64 = 8 * ONE_MEGABYTE;
pub const REGTEST_DEFAULT_MAX_GENERATED_BLOCK_SIZE: u64 = 32 * ONE_MEGABYTE;
pub const TESTNET_DEFAULT_MAX_GENERATED_BLOCK_SIZE: u64 = 32 * ONE_MEGABYTE;
pub const STN_DEFAULT_MAX_GENERATED_BLOCK_SIZE: u64 = 32 * ONE_MEGABYTE;

/// Default fee rate (per kB) for block inclusion
pub const DEFAULT_BLOCK_MIN_TX_FEE: i64 = 8000;

/// Default fee rate (per kB) for relay
pub const DEFAULT_MIN_RELAY_TX_FEE: i64 = 8000;

/// Fee rate (per kB) used to define dust
pub const DUST_RELAY_TX_FEE: i64 = 8000;

/// Dust threshold as a percentage of the dust relay fee for spending an output
pub const DEFAULT_DUST_LIMIT_FACTOR: i64 = 300;

pub const DEFAULT_MAX_TX_SIZE_POLICY: u64 = ONE_MEGABYTE;

pub const DEFAULT_MIN_CONSOLIDATION_FACTOR: u64 = 20;
pub const DEFAULT_MAX_CONSOLIDATION_INPUT_SCRIPT_SIZE: u64 = 150;
pub const DEFAULT_MIN_CONF_CONSOLIDATION_INPUT: u64 = 6;
pub const DEFAULT_ACCEPT_NON_STD_CONSOLIDATION_INPUT: bool = false;

pub const MAX_TX_SIGOPS_COUNT_POLICY: u64 = MAX_TX_SIGOPS_COUNT / 5;
pub const DEFAULT_TX_SIGOPS_COUNT_POLICY: u64 = MAX_TX_SIGOPS_COUNT_POLICY;

pub const DEFAULT_MAX_SCRIPT_SIZE_POLICY: u64 = 10_000;
pub const DEFAULT_OPS_PER_SCRIPT_POLICY: u64 = u32::MAX as u64;
pub const DEFAULT_PUBKEYS_PER_MULTISIG_POLICY: u64 = u32::MAX as u64;
pub const DEFAULT_STACK_MEMORY_USAGE_POLICY: u64 = 100 * ONE_MEGABYTE;
pub const DEFAULT_SCRIPT_NUM_LENGTH_POLICY: u64 = 250 * ONE_KILOBYTE;

/// Aggregate OP_RETURN payload relayed per transaction
pub const DEFAULT_DATA_CARRIER_SIZE: u64 = u32::MAX as u64;
pub const DEFAULT_ACCEPT_DATACARRIER: bool = true;
pub const DEFAULT_PERMIT_BAREMULTISIG: bool = true;

pub const DEFAULT_ANCESTOR_LIMIT: u64 = 1000;
pub const DEFAULT_SECONDARY_MEMPOOL_ANCESTOR_LIMIT: u64 = 25;

pub const DEFAULT_FACTOR_MAX_SEND_QUEUES_BYTES: u64 = 4;

/// Milliseconds
pub const DEFAULT_MAX_STD_TXN_VALIDATION_DURATION: u64 = 10;
pub const DEFAULT_MAX_NON_STD_TXN_VALIDATION_DURATION: u64 = 1000;
pub const DEFAULT_MAX_TXN_CHAIN_VALIDATION_BUDGET: u64 = 50;

/// Marker height for coins that only exist in the mempool
pub const MEMPOOL_HEIGHT: u32 = 0x7FFF_FFFF;

// ============================================================================
// DIFFICULTY
// ============================================================================

/// Target seconds between blocks on every network
pub const POW_TARGET_SPACING: i64 = 150;

/// ASERT half life before the steady activation height
pub const UNSTEADY_ASERT_HALF_LIFE: i64 = 60 * 60;

/// ASERT half life from the steady activation height onward
pub const STEADY_ASERT_HALF_LIFE: i64 = 2 * 24 * 60 * 60;

/// Fixed-point precision of the ASERT exponent
pub const ASERT_RADIX_BITS: u32 = 16;

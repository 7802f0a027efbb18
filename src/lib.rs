//! # novo-consensus
//!
//! Transaction and script validation engine for Novo Bitcoin nodes.
//!
//! The crate covers the parts of a node that every peer must agree on bit
//! for bit, plus the local policy layered on top of them:
//!
//! - **Script**: opcode set, parsing and building ([`opcodes`], [`script`],
//!   [`script_num`]), the stack machine ([`stack`], [`interpreter`]) and
//!   static sigop counting ([`sigop`]).
//! - **Limits**: the consensus/policy limits registry ([`limits`]) and node
//!   configuration that feeds it ([`config`]).
//! - **Signatures**: encoding checks and the signature hash
//!   ([`signature`], [`transaction_hash`]).
//! - **Policy**: standardness, dust and consolidation rules ([`policy`]).
//! - **Difficulty**: compact targets and ASERT ([`pow`]) over per-network
//!   parameters ([`chainparams`]).
//!
//! ## Usage
//!
//! ```rust
//! use novo_consensus::cancellation::CancellationToken;
//! use novo_consensus::chainparams::{ChainParams, Network};
//! use novo_consensus::interpreter::{verify_script, BaseSignatureChecker};
//! use novo_consensus::limits::GlobalConfig;
//! use novo_consensus::opcodes::*;
//! use novo_consensus::script_flags::MANDATORY_SCRIPT_VERIFY_FLAGS;
//!
//! let limits = GlobalConfig::for_network(ChainParams::get(Network::Regtest));
//! let result = verify_script(
//!     &limits,
//!     true,
//!     &CancellationToken::new(),
//!     &[OP_2, OP_3],
//!     &[OP_ADD, OP_5, OP_EQUAL],
//!     MANDATORY_SCRIPT_VERIFY_FLAGS,
//!     &BaseSignatureChecker,
//! );
//! assert!(result.is_ok());
//! ```

pub mod block;
pub mod cancellation;
pub mod chainparams;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod interpreter;
pub mod limits;
pub mod opcodes;
pub mod policy;
pub mod pow;
pub mod script;
pub mod script_flags;
pub mod script_num;
pub mod serialization;
pub mod signature;
pub mod sigop;
pub mod stack;
pub mod transaction;
pub mod transaction_hash;
pub mod types;

pub use chainparams::{ChainParams, Network};
pub use error::{ConsensusError, Result, ScriptErrorCode};
pub use limits::{GlobalConfig, LimitsAdmin, LimitsView};

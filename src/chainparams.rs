//! Per-network chain parameters
//!
//! Four fixed bundles: main, test, regtest and the scaling test network.
//! A node selects one at startup and never mutates it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::block::block_merkle_root;
use crate::constants::*;
use crate::error::ConsensusError;
use crate::limits::DefaultBlockSizeParams;
use crate::opcodes::*;
use crate::pow::U256;
use crate::script::ScriptBuilder;
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Main,
    Test,
    Regtest,
    Stn,
}

impl Network {
    pub const ALL: [Network; 4] = [Network::Main, Network::Test, Network::Regtest, Network::Stn];

    pub fn as_str(self) -> &'static str {
        match self {
            Network::Main => "main",
            Network::Test => "test",
            Network::Regtest => "regtest",
            Network::Stn => "stn",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ConsensusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" => Ok(Network::Main),
            "test" => Ok(Network::Test),
            "regtest" => Ok(Network::Regtest),
            "stn" => Ok(Network::Stn),
            other => Err(ConsensusError::Config(
                format!("unknown network '{other}'").into(),
            )),
        }
    }
}

/// Fixed reference point of the ASERT difficulty algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsertAnchor {
    pub height: u32,
    pub bits: u32,
    /// Timestamp of the anchor block's parent.
    pub prev_block_time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsensusParams {
    pub pow_limit: U256,
    pub target_spacing: i64,
    pub unsteady_asert_half_life: i64,
    pub steady_asert_half_life: i64,
    /// First height mined under the steady half life.
    pub steady_asert_height: u32,
    pub asert_anchor: Option<AsertAnchor>,
    pub allow_min_difficulty_blocks: bool,
    pub no_retargeting: bool,
    pub subsidy_halving_interval: u32,
    pub bip34_height: u32,
    pub bip34_hash: Hash,
    pub genesis_hash: Hash,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainParams {
    pub network: Network,
    pub consensus: ConsensusParams,
    /// Network message start bytes.
    pub message_start: [u8; 4],
    /// Block file magic bytes.
    pub disk_magic: [u8; 4],
    pub default_port: u16,
    pub genesis: Block,
    pub checkpoints: BTreeMap<u64, Hash>,
    pub default_block_size_params: DefaultBlockSizeParams,
    pub require_standard: bool,
}

const fn hex_digit(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        _ => panic!("invalid hex digit"),
    }
}

/// Hash from its byte-reversed display hex, evaluated at compile time.
const fn display_hash(s: &str) -> Hash {
    let b = s.as_bytes();
    assert!(b.len() == 64);
    let mut out = [0u8; 32];
    let mut i = 0;
    while i < 32 {
        out[31 - i] = (hex_digit(b[2 * i]) << 4) | hex_digit(b[2 * i + 1]);
        i += 1;
    }
    out
}

const GENESIS_TIMESTAMP: &[u8] = b"The Times 02/Dec/2021 Fourth jab to fight variants";
const GENESIS_OUTPUT_KEY_HASH: [u8; 20] = [
    0x05, 0x67, 0xb5, 0xf0, 0x54, 0x45, 0x36, 0xd0, 0x23, 0xfb, 0xb1, 0x23, 0xb8, 0x30, 0xf6,
    0x26, 0xd9, 0xc8, 0x03, 0x89,
];
/// Reward of the genesis coinbase and initial block subsidy.
pub const INITIAL_SUBSIDY: Amount = 2_000_000 * COIN;

const MAIN_GENESIS_HASH: Hash =
    display_hash("0000000000b3de1ef5bd7c20708dbafc3df0441877fa4a59cda22b4c2d4f39ce");
const TEST_GENESIS_HASH: Hash =
    display_hash("0000000000867f82407320d0939e3e618e5579156a4c0f21c067ea31edd39f49");
const REGTEST_GENESIS_HASH: Hash =
    display_hash("0693faff1ff2efb098f89871433dcc9d631929a8616fc55415268d6339f909d5");
const MAIN_BIP34_HASH: Hash =
    display_hash("00000000df5c5164b4516916ac7a520df6039e8cac3d4ac9235e15eace81acd2");

const MAIN_CHECKPOINTS: [(u64, Hash); 5] = [
    (0, display_hash("0000000000b3de1ef5bd7c20708dbafc3df0441877fa4a59cda22b4c2d4f39ce")),
    (11111, display_hash("00000000e5ab5f4cc6ae918f997fe188d906690957e1f6a30c3e28c4cf4e561f")),
    (33333, display_hash("00000000335152fea863a7e2b6320ec12e5b9d6b0bba9c4f6a9970ab6c1aa1e2")),
    (55555, display_hash("00000000224682e5cb41eb91b04c3a872f11e3216ef354a79b48aa2c4e6717aa")),
    (66666, display_hash("0000000000a56eaa524bd157ef8649e5427af2c36e902dc96a4025de25f0f110")),
];
const STN_CHECKPOINTS: [(u64, Hash); 5] = [
    (0, display_hash("000000000933ea01ad0ee984209779baaec3ced90fa3f408719526f8d77f4943")),
    (1, display_hash("00000000e23f9436cc8a6d6aaaa515a7b84e7a1720fc9f92805c0007c77420c4")),
    (2, display_hash("0000000040f8f40b5111d037b8b7ff69130de676327bcbd76ca0e0498a06c44a")),
    (4, display_hash("00000000d33661d5a6906f84e3c64ea6101d144ec83760bcb4ba81edcb15e68d")),
    (5, display_hash("00000000e9222ebe623bf53f6ec774619703c113242327bdc24ac830787873d6")),
];

fn genesis_coinbase() -> Transaction {
    let script_sig = ScriptBuilder::new()
        .push_int(0x11de_784a)
        .push_data(GENESIS_TIMESTAMP)
        .into_bytes();
    let script_pubkey = ScriptBuilder::new()
        .push_opcode(OP_DUP)
        .push_opcode(OP_HASH160)
        .push_data(&GENESIS_OUTPUT_KEY_HASH)
        .push_opcode(OP_EQUALVERIFY)
        .push_opcode(OP_CHECKSIG)
        .into_bytes();

    Transaction {
        version: 1,
        inputs: vec![TransactionInput {
            prevout: OutPoint::null(),
            script_sig,
            sequence: u32::MAX,
        }],
        outputs: vec![TransactionOutput {
            value: INITIAL_SUBSIDY,
            script_pubkey,
        }],
        lock_time: 0,
    }
}

/// Genesis block with the shared coinbase. Every network commits to the
/// same merkle root.
pub fn create_genesis_block(timestamp: u32, nonce: u32, bits: u32, version: i32) -> Block {
    let mut genesis = Block {
        header: BlockHeader {
            version,
            prev_block_hash: [0u8; 32],
            merkle_root: [0u8; 32],
            timestamp,
            bits,
            nonce,
        },
        transactions: vec![genesis_coinbase()].into_boxed_slice(),
    };
    genesis.header.merkle_root = block_merkle_root(&genesis).0;
    genesis
}

fn asert_consensus(pow_limit: U256) -> ConsensusParams {
    ConsensusParams {
        pow_limit,
        target_spacing: POW_TARGET_SPACING,
        unsteady_asert_half_life: UNSTEADY_ASERT_HALF_LIFE,
        steady_asert_half_life: STEADY_ASERT_HALF_LIFE,
        steady_asert_height: u32::MAX,
        asert_anchor: None,
        allow_min_difficulty_blocks: false,
        no_retargeting: false,
        subsidy_halving_interval: 210_000,
        bip34_height: 1,
        bip34_hash: [0u8; 32],
        genesis_hash: [0u8; 32],
    }
}

impl ChainParams {
    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Main => Self::main(),
            Network::Test => Self::test(),
            Network::Regtest => Self::regtest(),
            Network::Stn => Self::stn(),
        }
    }

    /// Process-wide instance for `network`, built on first use.
    pub fn get(network: Network) -> &'static ChainParams {
        static PARAMS: [OnceLock<ChainParams>; 4] =
            [OnceLock::new(), OnceLock::new(), OnceLock::new(), OnceLock::new()];
        let slot = match network {
            Network::Main => &PARAMS[0],
            Network::Test => &PARAMS[1],
            Network::Regtest => &PARAMS[2],
            Network::Stn => &PARAMS[3],
        };
        slot.get_or_init(|| Self::for_network(network))
    }

    fn main() -> Self {
        let mut consensus = asert_consensus(U256::MAX.shr(32));
        consensus.steady_asert_height = 100_000;
        consensus.asert_anchor = Some(AsertAnchor {
            height: 1,
            bits: 0x1d00_ffff,
            prev_block_time: 1_638_457_291,
        });
        consensus.bip34_hash = MAIN_BIP34_HASH;
        consensus.genesis_hash = MAIN_GENESIS_HASH;

        ChainParams {
            network: Network::Main,
            consensus,
            message_start: [0xe0, 0xfe, 0xfe, 0xca],
            disk_magic: [0xe0, 0xbe, 0xbe, 0xba],
            default_port: 8666,
            genesis: create_genesis_block(1_638_457_291, 0x7823_b7d4, 0x1d00_ffff, 1),
            checkpoints: BTreeMap::from(MAIN_CHECKPOINTS),
            default_block_size_params: DefaultBlockSizeParams {
                max_block_size: MAIN_DEFAULT_MAX_BLOCK_SIZE,
                max_generated_block_size: MAIN_DEFAULT_MAX_GENERATED_BLOCK_SIZE,
            },
            require_standard: true,
        }
    }

    fn stn() -> Self {
        let mut consensus = asert_consensus(U256::MAX.shr(32));
        consensus.asert_anchor = Some(AsertAnchor {
            height: 1,
            bits: 0x1d00_ffff,
            prev_block_time: 1_638_457_291,
        });
        consensus.genesis_hash = MAIN_GENESIS_HASH;

        ChainParams {
            network: Network::Stn,
            consensus,
            message_start: [0xe3, 0xfe, 0xfe, 0xca],
            disk_magic: [0xe3, 0xbe, 0xbe, 0xba],
            default_port: 9666,
            genesis: create_genesis_block(1_638_457_291, 0x7823_b7d4, 0x1d00_ffff, 1),
            checkpoints: BTreeMap::from(STN_CHECKPOINTS),
            default_block_size_params: DefaultBlockSizeParams {
                max_block_size: STN_DEFAULT_MAX_BLOCK_SIZE,
                max_generated_block_size: STN_DEFAULT_MAX_GENERATED_BLOCK_SIZE,
            },
            require_standard: false,
        }
    }

    fn test() -> Self {
        let mut consensus = asert_consensus(U256::MAX.shr(32));
        consensus.allow_min_difficulty_blocks = true;
        consensus.asert_anchor = Some(AsertAnchor {
            height: 1,
            bits: 0x1d00_ffff,
            prev_block_time: 1_638_457_834,
        });
        consensus.genesis_hash = TEST_GENESIS_HASH;

        ChainParams {
            network: Network::Test,
            consensus,
            message_start: [0xeb, 0xfa, 0xab, 0xce],
            disk_magic: [0xec, 0xba, 0xaf, 0xbe],
            default_port: 18666,
            genesis: create_genesis_block(1_638_457_834, 0xaadc_772a, 0x1d00_ffff, 1),
            checkpoints: BTreeMap::new(),
            default_block_size_params: DefaultBlockSizeParams {
                max_block_size: TESTNET_DEFAULT_MAX_BLOCK_SIZE,
                max_generated_block_size: TESTNET_DEFAULT_MAX_GENERATED_BLOCK_SIZE,
            },
            require_standard: false,
        }
    }

    fn regtest() -> Self {
        let mut consensus = asert_consensus(U256::MAX.shr(1));
        consensus.allow_min_difficulty_blocks = true;
        consensus.no_retargeting = true;
        consensus.subsidy_halving_interval = 150;
        consensus.genesis_hash = REGTEST_GENESIS_HASH;

        ChainParams {
            network: Network::Regtest,
            consensus,
            message_start: [0xe2, 0xfe, 0xfe, 0xca],
            disk_magic: [0xe2, 0xbe, 0xbe, 0xba],
            default_port: 18999,
            genesis: create_genesis_block(1_638_457_291, 2, 0x207f_ffff, 1),
            checkpoints: BTreeMap::from([(0, REGTEST_GENESIS_HASH)]),
            default_block_size_params: DefaultBlockSizeParams {
                max_block_size: REGTEST_DEFAULT_MAX_BLOCK_SIZE,
                max_generated_block_size: REGTEST_DEFAULT_MAX_GENERATED_BLOCK_SIZE,
            },
            require_standard: false,
        }
    }

    /// Latest checkpoint at or below `height`.
    pub fn last_checkpoint(&self, height: u64) -> Option<(u64, &Hash)> {
        self.checkpoints
            .range(..=height)
            .next_back()
            .map(|(h, hash)| (*h, hash))
    }
}

/// Coinbase subsidy at `height`: the initial reward halved every interval,
/// zero once the shift would empty it.
pub fn block_subsidy(height: u32, params: &ConsensusParams) -> Amount {
    let halvings = height / params.subsidy_halving_interval.max(1);
    if halvings >= 64 {
        return 0;
    }
    INITIAL_SUBSIDY >> halvings
}

//! Per-network chain parameters
//!
//! Each network profile is a `static` built at compile time; hash literals are
//! parsed by `const fn`, so a typo fails the build. Profiles are selected by
//! [`ChainType`] and never change at runtime.

use crate::checkpoints::{AssumeutxoData, AssumeutxoHash, CheckpointRegistry};
use crate::constants::*;
use crate::error::{ConsensusError, Result};
use crate::merkle::block_merkle_root;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Network profile selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainType {
    #[default]
    Main,
    Test,
    Regtest,
}

impl ChainType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainType::Main => "main",
            ChainType::Test => "test",
            ChainType::Regtest => "regtest",
        }
    }
}

impl fmt::Display for ChainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainType {
    type Err = ConsensusError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "main" => Ok(ChainType::Main),
            "test" => Ok(ChainType::Test),
            "regtest" => Ok(ChainType::Regtest),
            other => Err(ConsensusError::Config(Cow::Owned(format!(
                "unknown chain type: {other}"
            )))),
        }
    }
}

/// Issuance parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsensusParams {
    pub subsidy_halving_interval: Natural,
    pub initial_subsidy: Amount,
    /// Halvings after which the subsidy stays constant
    pub tail_emission_halvings: Natural,
    pub max_money: Amount,
}

impl ConsensusParams {
    const fn with_halving_interval(subsidy_halving_interval: Natural) -> Self {
        ConsensusParams {
            subsidy_halving_interval,
            initial_subsidy: INITIAL_SUBSIDY,
            tail_emission_halvings: TAIL_EMISSION_HALVINGS,
            max_money: MAX_MONEY,
        }
    }
}

/// Inputs to the genesis block and the values it must reproduce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenesisParams {
    pub time: u32,
    pub nonce: u64,
    pub bits: u32,
    pub version: i32,
    pub reward: Amount,
    pub output_script: &'static [u8],
    pub hash: BlockHash,
    pub merkle_root: Hash,
}

/// Everything that distinguishes one network from another
#[derive(Debug)]
pub struct ChainParams {
    pub chain: ChainType,
    pub consensus: ConsensusParams,
    pub genesis: GenesisParams,
    pub checkpoints: &'static [(Natural, BlockHash)],
    pub assumeutxo: &'static [AssumeutxoData],
}

/// Headline embedded in every genesis coinbase
pub const GENESIS_TIMESTAMP: &str =
    "The Times - 25/Feb/2024 - Trump touts peace in Ukraine within weeks as he meets Macron.";

/// Compact target pushed into the genesis coinbase script on every network
const GENESIS_SCRIPT_BITS: i64 = 0x1f0affff;

const GENESIS_TIME: u32 = 1_740_441_600;

const MAIN_GENESIS_HASH: BlockHash =
    BlockHash::from_hex("0008c73af1e55a1a04b613763480876d72c004386746016824c5b9a8c357233b");
const TEST_GENESIS_HASH: BlockHash =
    BlockHash::from_hex("0006b66c451f2f7eb07d0c5353af869df719b1ba6680d44f774e55a836bae85c");
const REGTEST_GENESIS_HASH: BlockHash =
    BlockHash::from_hex("309071542add6a219c79f3e740407ffd6df2a31c55d34f3fbc4954dd486fddb0");

pub static MAIN: ChainParams = ChainParams {
    chain: ChainType::Main,
    consensus: ConsensusParams::with_halving_interval(HALVING_INTERVAL),
    genesis: GenesisParams {
        time: GENESIS_TIME,
        nonce: 0xb52,
        bits: 0x1f0affff,
        version: 4,
        reward: INITIAL_SUBSIDY,
        output_script: &[
            0x76, 0xa9, 0x14, 0x01, 0x60, 0xd4, 0x00, 0x54, 0x5e, 0x14, 0xa1, 0xde, 0x78, 0xe2,
            0x55, 0xc4, 0xf3, 0xdb, 0xe9, 0x0d, 0xa6, 0x49, 0xbf, 0x88, 0xac,
        ],
        hash: MAIN_GENESIS_HASH,
        merkle_root: hash_from_hex(
            "9ab6c08685ed8f8e078e43ddff9fb39c4892fc5ebed8a7435273a8db6f35add8",
        ),
    },
    checkpoints: &[(0, MAIN_GENESIS_HASH)],
    assumeutxo: &[],
};

pub static TESTNET: ChainParams = ChainParams {
    chain: ChainType::Test,
    consensus: ConsensusParams::with_halving_interval(HALVING_INTERVAL),
    genesis: GenesisParams {
        time: GENESIS_TIME,
        nonce: 0x1904,
        bits: 0x1f0affff,
        version: 4,
        reward: INITIAL_SUBSIDY,
        output_script: &[
            0x76, 0xa9, 0x14, 0x9d, 0x64, 0x04, 0x17, 0x4b, 0x52, 0xce, 0x9f, 0x89, 0x77, 0x01,
            0x4a, 0xb2, 0xd9, 0x07, 0x9b, 0xa1, 0xdd, 0xcd, 0xe8, 0x88, 0xac,
        ],
        hash: TEST_GENESIS_HASH,
        merkle_root: hash_from_hex(
            "055741e53d6dbf18bcd1e5064b7bdbb66b611622079f243d050f495b7e16214f",
        ),
    },
    checkpoints: &[(0, TEST_GENESIS_HASH)],
    assumeutxo: &[],
};

pub static REGTEST: ChainParams = ChainParams {
    chain: ChainType::Regtest,
    consensus: ConsensusParams::with_halving_interval(REGTEST_HALVING_INTERVAL),
    genesis: GenesisParams {
        time: GENESIS_TIME,
        nonce: 0x01,
        bits: 0x207fffff,
        version: 4,
        reward: INITIAL_SUBSIDY,
        output_script: &[
            0x76, 0xa9, 0x14, 0x7f, 0x2a, 0xc5, 0xc1, 0x08, 0x44, 0x21, 0xd9, 0xc3, 0xdd, 0xbd,
            0x81, 0x38, 0xe5, 0x4d, 0xae, 0x1e, 0xbd, 0xe9, 0x6a, 0x88, 0xac,
        ],
        hash: REGTEST_GENESIS_HASH,
        merkle_root: hash_from_hex(
            "12fbb517a547123c263d050e857810560bf632ba403b5783b2a2a725c61c8943",
        ),
    },
    checkpoints: &[(0, REGTEST_GENESIS_HASH)],
    assumeutxo: &[AssumeutxoData {
        height: 110,
        state_digest: AssumeutxoHash::from_hex(
            "b8e64fc1f1e2c54a0c67977e09e12d68fc8312af9f3033c4c626f7b6b2f6d549",
        ),
        chain_tx_count: 111,
        block_hash: BlockHash::from_hex(
            "446705aaab6a531f893433dd48e12c60ebd22d9b213382ad8e9380b5d66335f9",
        ),
    }],
};

impl ChainParams {
    pub fn for_chain(chain: ChainType) -> &'static ChainParams {
        match chain {
            ChainType::Main => &MAIN,
            ChainType::Test => &TESTNET,
            ChainType::Regtest => &REGTEST,
        }
    }

    pub fn registry(&self) -> CheckpointRegistry<'static> {
        CheckpointRegistry::new(self.checkpoints, self.assumeutxo)
    }
}

/// Rebuild the genesis block of `params`.
///
/// The coinbase script pushes `0`, the compact target, `4` and the timestamp
/// headline; the single output pays the genesis reward to the network's script.
pub fn create_genesis_block(params: &ChainParams) -> Block {
    let genesis = &params.genesis;

    let mut script_sig = Vec::with_capacity(8 + GENESIS_TIMESTAMP.len());
    push_slice(&mut script_sig, &script_num(0));
    push_slice(&mut script_sig, &script_num(GENESIS_SCRIPT_BITS));
    push_slice(&mut script_sig, &script_num(4));
    push_slice(&mut script_sig, GENESIS_TIMESTAMP.as_bytes());

    let coinbase = Transaction {
        version: 1,
        inputs: vec![TransactionInput {
            script_sig,
            ..Default::default()
        }],
        outputs: vec![TransactionOutput {
            value: genesis.reward,
            script_pubkey: genesis.output_script.to_vec(),
        }],
        lock_time: 0,
    };

    let transactions = vec![coinbase];
    let header = BlockHeader {
        version: genesis.version,
        prev_block_hash: ZERO_HASH,
        merkle_root: block_merkle_root(&transactions).root,
        timestamp: genesis.time,
        bits: genesis.bits,
        nonce: genesis.nonce,
        height: 0,
        mix_hash: ZERO_HASH,
    };
    Block::new(header, transactions)
}

/// Minimal little-endian sign-magnitude encoding of a script number
fn script_num(value: i64) -> Vec<u8> {
    let mut out = Vec::new();
    if value == 0 {
        return out;
    }
    let negative = value < 0;
    let mut magnitude = value.unsigned_abs();
    while magnitude > 0 {
        out.push((magnitude & 0xff) as u8);
        magnitude >>= 8;
    }
    let last = out.len() - 1;
    if out[last] & 0x80 != 0 {
        out.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        out[last] |= 0x80;
    }
    out
}

/// Append a data push using the shortest push opcode
fn push_slice(script: &mut Vec<u8>, data: &[u8]) {
    const OP_PUSHDATA1: u8 = 0x4c;
    const OP_PUSHDATA2: u8 = 0x4d;

    let len = data.len();
    if len < OP_PUSHDATA1 as usize {
        script.push(len as u8);
    } else if len <= 0xff {
        script.push(OP_PUSHDATA1);
        script.push(len as u8);
    } else {
        script.push(OP_PUSHDATA2);
        script.extend_from_slice(&(len as u16).to_le_bytes());
    }
    script.extend_from_slice(data);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_type_round_trip() {
        for chain in [ChainType::Main, ChainType::Test, ChainType::Regtest] {
            assert_eq!(chain.to_string().parse::<ChainType>().unwrap(), chain);
            assert_eq!(ChainParams::for_chain(chain).chain, chain);
        }
        assert!("mainnet".parse::<ChainType>().is_err());
    }

    #[test]
    fn test_genesis_script_sig_layout() {
        let block = create_genesis_block(&MAIN);
        let script = &block.transactions()[0].inputs[0].script_sig;
        assert_eq!(&script[..10], &[0x00, 0x04, 0xff, 0xff, 0x0a, 0x1f, 0x01, 0x04, 0x4c, 0x57]);
        assert_eq!(&script[10..], GENESIS_TIMESTAMP.as_bytes());
    }

    #[test]
    fn test_script_num_encoding() {
        assert_eq!(script_num(0), Vec::<u8>::new());
        assert_eq!(script_num(4), vec![0x04]);
        assert_eq!(script_num(0x80), vec![0x80, 0x00]);
        assert_eq!(script_num(-1), vec![0x81]);
        assert_eq!(script_num(-0x80), vec![0x80, 0x80]);
    }

    #[test]
    fn test_regtest_halves_faster() {
        assert_eq!(REGTEST.consensus.subsidy_halving_interval, 1_051);
        assert_eq!(MAIN.consensus.subsidy_halving_interval, 1_051_200);
        assert_eq!(MAIN.consensus.max_money, REGTEST.consensus.max_money);
    }
}

//! # griffion-consensus
//!
//! Block integrity rules for the Griffion network.
//!
//! This crate decides whether a received block's header commitments uniquely bind
//! the transactions it carries, computes the issuance schedule, and exposes the
//! compiled-in checkpoint tables used for snapshot-assisted sync. Every function is
//! deterministic and free of I/O; results must match other implementations bit for
//! bit.
//!
//! ## Layout
//!
//! - [`crypto`]: double-SHA256 accumulator
//! - [`merkle`]: merkle roots with duplicate-node detection, merkle branches
//! - [`block`]: the mutation detector
//! - [`segwit`]: witness commitment verification and generation
//! - [`economic`]: subsidy and supply
//! - [`chain_params`], [`checkpoints`]: per-network tables
//!
//! ## Usage
//!
//! ```rust
//! use griffion_consensus::chain_params::{create_genesis_block, ChainType};
//! use griffion_consensus::BlockIntegrity;
//!
//! let integrity = BlockIntegrity::new(ChainType::Regtest);
//! let genesis = create_genesis_block(integrity.params());
//! assert!(!integrity.is_block_mutated(&genesis));
//! assert_eq!(integrity.block_subsidy(1), 5_000 * 100_000_000);
//! assert!(integrity.checkpoint_for_height(110).is_some());
//! ```

pub mod block;
pub mod chain_params;
pub mod checkpoints;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod economic;
pub mod error;
pub mod merkle;
pub mod segwit;
pub mod serialization;
pub mod transaction;
pub mod types;

pub use block::{check_block_mutation, check_block_mutation_cached, is_block_mutated};
pub use economic::get_block_subsidy as subsidy;
pub use merkle::{merkle_root, witness_merkle_root};

use chain_params::{ChainParams, ChainType};
use checkpoints::AssumeutxoData;
use config::ConsensusConfig;
use tracing::info;
use types::*;

/// Block integrity checks bound to one network profile
///
/// A thin wrapper over the module functions that carries the chain parameters and
/// the configured validation toggles.
#[derive(Debug, Clone, Copy)]
pub struct BlockIntegrity {
    params: &'static ChainParams,
    check_witness_root: bool,
    log_rejections: bool,
}

impl BlockIntegrity {
    /// Profile `chain` with default toggles
    pub fn new(chain: ChainType) -> Self {
        Self::from_config(&ConsensusConfig {
            chain,
            ..Default::default()
        })
    }

    pub fn from_config(config: &ConsensusConfig) -> Self {
        Self {
            params: ChainParams::for_chain(config.chain),
            check_witness_root: config.block_validation.check_witness_root,
            log_rejections: config.debug.log_rejections,
        }
    }

    pub fn params(&self) -> &'static ChainParams {
        self.params
    }

    pub fn chain(&self) -> ChainType {
        self.params.chain
    }

    /// Mutation verdict under the configured witness toggle
    pub fn is_block_mutated(&self, block: &Block) -> bool {
        self.check_block(block).is_err()
    }

    /// Reasoned mutation verdict under the configured witness toggle
    pub fn check_block(&self, block: &Block) -> error::Result<()> {
        block::check_block_mutation(block, self.check_witness_root).map_err(|reason| {
            if self.log_rejections {
                info!(
                    chain = %self.chain(),
                    %reason,
                    merkle_root = %hash_to_hex(block.merkle_root()),
                    "rejected mutated block"
                );
            }
            error::ConsensusError::BlockMutated(reason)
        })
    }

    pub fn block_subsidy(&self, height: Natural) -> Amount {
        economic::get_block_subsidy(height, &self.params.consensus)
    }

    pub fn total_supply(&self, height: Natural) -> Amount {
        economic::total_supply(height, &self.params.consensus)
    }

    pub fn checkpoint_for_height(&self, height: Natural) -> Option<&'static AssumeutxoData> {
        self.params.registry().checkpoint_for_height(height)
    }

    pub fn checkpoint_for_hash(&self, hash: &BlockHash) -> Option<&'static AssumeutxoData> {
        self.params.registry().checkpoint_for_hash(hash)
    }

    /// `false` when a hard checkpoint at `height` names a different block
    pub fn matches_checkpoint(&self, height: Natural, hash: &BlockHash) -> bool {
        self.params.registry().matches_checkpoint(height, hash)
    }
}

impl Default for BlockIntegrity {
    fn default() -> Self {
        Self::from_config(&config::get_consensus_config())
    }
}

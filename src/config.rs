//! Configuration for griffion-consensus
//!
//! Selects the network profile and toggles for block integrity checks. Settings can
//! be loaded from JSON, environment variables, or passed programmatically. Chain
//! parameters themselves are compiled in; configuration only picks a profile.

use crate::chain_params::ChainType;
use crate::error::{ConsensusError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::OnceLock;

/// Block validation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockValidationConfig {
    /// Check the coinbase witness commitment when probing for mutation
    /// Default: true
    #[serde(default = "default_true")]
    pub check_witness_root: bool,
}

fn default_true() -> bool {
    true
}

impl Default for BlockValidationConfig {
    fn default() -> Self {
        Self {
            check_witness_root: true,
        }
    }
}

/// Debug and development configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Log every mutated block at info level instead of debug
    /// Default: false
    #[serde(default = "default_false")]
    pub log_rejections: bool,
}

fn default_false() -> bool {
    false
}

/// Complete consensus configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusConfig {
    /// Network profile
    #[serde(default)]
    pub chain: ChainType,

    /// Block validation configuration
    #[serde(default)]
    pub block_validation: BlockValidationConfig,

    /// Debug and development configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl ConsensusConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables follow the pattern: `GRIFFION_CONSENSUS_<SECTION>_<KEY>`
    ///
    /// Examples:
    /// - `GRIFFION_CONSENSUS_CHAIN=regtest`
    /// - `GRIFFION_CONSENSUS_BLOCK_VALIDATION_CHECK_WITNESS_ROOT=false`
    ///
    /// Values that fail to parse leave the default in place.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ConsensusConfig::from_env`] over an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(val) = lookup("GRIFFION_CONSENSUS_CHAIN") {
            if let Ok(chain) = val.parse::<ChainType>() {
                config.chain = chain;
            }
        }

        if let Some(val) = lookup("GRIFFION_CONSENSUS_BLOCK_VALIDATION_CHECK_WITNESS_ROOT") {
            if let Ok(enabled) = val.parse::<bool>() {
                config.block_validation.check_witness_root = enabled;
            }
        }

        if let Some(val) = lookup("GRIFFION_CONSENSUS_DEBUG_LOG_REJECTIONS") {
            if let Ok(enabled) = val.parse::<bool>() {
                config.debug.log_rejections = enabled;
            }
        }

        config
    }

    /// Parse a JSON object; missing sections and keys take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(invalid_config)?;
        if !value.is_object() {
            return Err(ConsensusError::Config(
                "invalid config: expected a JSON object".into(),
            ));
        }
        serde_json::from_value(value).map_err(invalid_config)
    }
}

fn invalid_config(e: serde_json::Error) -> ConsensusError {
    ConsensusError::Config(Cow::Owned(format!("invalid config: {e}")))
}

/// Global consensus configuration instance
static GLOBAL_CONSENSUS_CONFIG: OnceLock<ConsensusConfig> = OnceLock::new();

/// Initialize global consensus configuration
///
/// Can be set once per process; later calls fail and leave the first value.
pub fn init_consensus_config(config: ConsensusConfig) -> Result<()> {
    GLOBAL_CONSENSUS_CONFIG
        .set(config)
        .map_err(|_| ConsensusError::Config("consensus config already initialized".into()))
}

/// Get global consensus configuration
///
/// Returns the global config if initialized, otherwise reads the environment.
pub fn get_consensus_config() -> ConsensusConfig {
    GLOBAL_CONSENSUS_CONFIG
        .get()
        .cloned()
        .unwrap_or_else(ConsensusConfig::from_env)
}

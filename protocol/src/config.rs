//! # Protocol Configuration & Constants
//!
//! Every magic number in PairVault lives here, along with the deployable
//! [`VaultConfig`]. If you're hardcoding a constant somewhere else, move it
//! here.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::{Address, TokenInfo};

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

/// Prefix of every contract address derived by `Address::contract`.
pub const CONTRACT_ADDRESS_PREFIX: &str = "pv1";

/// Number of digest bytes kept in a contract address (40 hex chars).
pub const CONTRACT_ADDRESS_BYTES: usize = 20;

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Allowance value that `transfer_from` never decrements.
pub const UNLIMITED_ALLOWANCE: u64 = u64::MAX;

/// Display decimals assumed when a config omits them.
pub const DEFAULT_DECIMALS: u8 = 18;

// ---------------------------------------------------------------------------
// Rates & Events
// ---------------------------------------------------------------------------

/// Smallest rate a value anchor may hold. Zero would make one side of the
/// vault free.
pub const MIN_RATE: u64 = 1;

/// The literal middle argument of every swap-completed event.
pub const EVENT_SEPARATOR: &str = "to";

// ---------------------------------------------------------------------------
// Observability
// ---------------------------------------------------------------------------

/// Prefix for every Prometheus metric the vault exports.
pub const METRICS_NAMESPACE: &str = "pairvault";

/// Log filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_DIRECTIVE: &str = "pairvault_contracts=info,pairvault_protocol=info";

// ---------------------------------------------------------------------------
// VaultConfig
// ---------------------------------------------------------------------------

/// Errors found while parsing or validating a [`VaultConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON for this schema.
    #[error("malformed vault config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value anchor is below [`MIN_RATE`].
    #[error("rate for asset {asset} must be non-zero, got {rate}")]
    InvalidRate {
        /// Which side ("A" or "B").
        asset: &'static str,
        /// The rejected value.
        rate: u64,
    },

    /// Both sides name the same token.
    #[error("asset A and asset B are the same token ({0})")]
    IdenticalAssets(String),

    /// The deployment label is empty, which would make the vault address
    /// collide with every other unlabeled deployment.
    #[error("vault label must not be empty")]
    EmptyLabel,
}

/// Configuration of one side of the vault.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Human-readable token name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Display decimals.
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_decimals() -> u8 {
    DEFAULT_DECIMALS
}

impl AssetConfig {
    /// Token metadata (and derived asset ID) described by this entry.
    pub fn token_info(&self) -> TokenInfo {
        TokenInfo::new(&self.name, &self.symbol, self.decimals)
    }
}

/// Everything needed to deploy a vault, minus the ledgers themselves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Deployment label. The vault address is derived from it.
    pub label: String,
    /// The only principal allowed to change rates.
    pub owner: Address,
    /// First asset.
    pub asset_a: AssetConfig,
    /// Second asset.
    pub asset_b: AssetConfig,
    /// Stable value of one unit of asset A.
    pub rate_a: u64,
    /// Stable value of one unit of asset B.
    pub rate_b: u64,
}

impl VaultConfig {
    /// Parses and validates a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read vault config: {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("invalid vault config: {}", path.display()))
    }

    /// Serializes the config as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the invariants a deployable config must hold.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.label.trim().is_empty() {
            return Err(ConfigError::EmptyLabel);
        }
        if self.rate_a < MIN_RATE {
            return Err(ConfigError::InvalidRate {
                asset: "A",
                rate: self.rate_a,
            });
        }
        if self.rate_b < MIN_RATE {
            return Err(ConfigError::InvalidRate {
                asset: "B",
                rate: self.rate_b,
            });
        }
        if self.asset_a.token_info().asset_id == self.asset_b.token_info().asset_id {
            return Err(ConfigError::IdenticalAssets(self.asset_a.symbol.clone()));
        }
        Ok(())
    }
}

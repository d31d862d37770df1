//! Errors returned by every vault operation.
//!
//! The display strings of the swap and governance variants are the revert
//! messages callers of the vault match on. Do not reword them.

use pairvault_protocol::ledger::{Address, AssetId, LedgerError};
use thiserror::Error;

/// Errors that can occur during vault operations.
///
/// Every error except [`VaultError::RefundFailed`] means the operation left
/// balances, allowances, rates and the event log exactly as they were.
#[derive(Debug, Error)]
pub enum VaultError {
    /// A swap was requested for zero units.
    #[error("not a valid amount to be swapped")]
    InvalidAmount,

    /// The source ledger refused to pull the caller's funds (missing
    /// balance or missing allowance).
    #[error("Insufficient Funds")]
    InsufficientFunds {
        /// The ledger's own explanation.
        #[source]
        source: LedgerError,
    },

    /// The vault does not hold enough of the destination asset.
    #[error("Not Enough Liquidity for Swap")]
    InsufficientLiquidity {
        /// Output the swap would have paid.
        required: u64,
        /// Vault reserve at the time of the check.
        available: u64,
    },

    /// A non-owner tried to change a rate.
    #[error("You do not have the authorization to set Rate")]
    Unauthorized {
        /// Who tried.
        caller: Address,
    },

    /// A rate of zero was supplied.
    #[error("not a valid Rate")]
    InvalidRate,

    /// The converted amount does not fit in `u64`.
    #[error("conversion overflow: {amount} * {from_rate} / {to_rate} exceeds u64::MAX")]
    ArithmeticOverflow {
        /// Input amount.
        amount: u64,
        /// Rate of the source asset.
        from_rate: u64,
        /// Rate of the destination asset.
        to_rate: u64,
    },

    /// Both sides of the vault were given the same asset or ledger.
    #[error("both sides of the vault refer to the same asset {0}")]
    IdenticalAssets(AssetId),

    /// A ledger handed to the vault tracks a different asset than the
    /// configuration describes.
    #[error("asset mismatch: config expects {expected}, ledger tracks {found}")]
    AssetMismatch {
        /// Symbol from the configuration.
        expected: String,
        /// Symbol reported by the ledger.
        found: String,
    },

    /// A ledger failed in a way the vault did not anticipate, e.g. the
    /// payout after a successful pull. The pull is refunded and the
    /// caller's allowance restored first.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The payout failed and undoing the pull failed too, so the pulled
    /// funds or the caller's allowance were not restored. This is the only
    /// error that leaves state behind.
    #[error("payout failed ({payout}) and the refund failed ({refund})")]
    RefundFailed {
        /// Why the payout was refused.
        payout: LedgerError,
        /// Why the refund was refused.
        refund: LedgerError,
    },

    /// The vault's metrics could not be registered.
    #[error("metrics registration failed: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl VaultError {
    /// Stable snake-case label used as the `reason` metric label.
    pub fn reason(&self) -> &'static str {
        match self {
            VaultError::InvalidAmount => "invalid_amount",
            VaultError::InsufficientFunds { .. } => "insufficient_funds",
            VaultError::InsufficientLiquidity { .. } => "insufficient_liquidity",
            VaultError::Unauthorized { .. } => "unauthorized",
            VaultError::InvalidRate => "invalid_rate",
            VaultError::ArithmeticOverflow { .. } => "arithmetic_overflow",
            VaultError::IdenticalAssets(_) => "identical_assets",
            VaultError::AssetMismatch { .. } => "asset_mismatch",
            VaultError::Ledger(_) => "ledger",
            VaultError::RefundFailed { .. } => "refund_failed",
            VaultError::Metrics(_) => "metrics",
        }
    }
}

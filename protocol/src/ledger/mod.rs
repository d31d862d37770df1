//! # Ledger Module: The Token Collaborator
//!
//! The exchange vault never keeps its own copy of anybody's balance. It
//! asks a [`TokenLedger`] for every balance and delegates every movement of
//! value to it. This module defines that contract and ships one
//! implementation of it.
//!
//! ## Architecture
//!
//! ```text
//! token.rs    : AssetId, Address, TokenInfo
//! balance.rs  : Per-holder balance sheet with overflow protection
//! fungible.rs : In-memory ERC-20 style token (balances + allowances)
//! ```
//!
//! ## Failure Model
//!
//! Every state-changing call returns `Result<(), LedgerError>`. A failed
//! call leaves the ledger untouched. Callers are expected to branch on the
//! result instead of pre-checking balances themselves.

pub mod balance;
pub mod fungible;
pub mod token;

use thiserror::Error;

pub use balance::{Balance, BalanceError, BalanceSheet};
pub use fungible::FungibleToken;
pub use token::{Address, AssetId, TokenInfo};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors surfaced by a [`TokenLedger`].
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A balance operation failed (insufficient funds, overflow).
    #[error("balance error: {0}")]
    Balance(#[from] BalanceError),

    /// The spender tried to move more than the owner approved.
    #[error("insufficient allowance: {spender} may move {allowed} of {owner}'s funds, requested {requested}")]
    InsufficientAllowance {
        /// The account whose funds were being moved.
        owner: Address,
        /// The account attempting the move.
        spender: Address,
        /// The remaining approved amount.
        allowed: u64,
        /// The amount that was requested.
        requested: u64,
    },

    /// Minting would push total supply past `u64::MAX`.
    #[error("supply overflow: minting {amount} on top of {supply}")]
    SupplyOverflow {
        /// Supply before the mint.
        supply: u64,
        /// Amount that was attempted.
        amount: u64,
    },
}

// ---------------------------------------------------------------------------
// TokenLedger
// ---------------------------------------------------------------------------

/// The collaborator contract for one fungible asset.
///
/// Semantics follow the familiar ERC-20 shape: `transfer` moves the
/// sender's own funds, `transfer_from` moves an owner's funds on the
/// strength of a prior `approve`. There is no ambient "message sender";
/// the acting principal is always passed explicitly.
pub trait TokenLedger: Send + Sync {
    /// Content-addressed identifier of the asset this ledger tracks.
    fn asset_id(&self) -> AssetId;

    /// Ticker symbol of the asset.
    fn symbol(&self) -> &str;

    /// Current balance of `who`.
    fn balance_of(&self, who: &Address) -> u64;

    /// Remaining amount `spender` may move out of `owner`'s balance.
    fn allowance(&self, owner: &Address, spender: &Address) -> u64;

    /// Moves `amount` of `sender`'s own funds to `to`.
    fn transfer(&mut self, sender: &Address, to: &Address, amount: u64) -> Result<(), LedgerError>;

    /// Moves `amount` from `from` to `to`, consuming `spender`'s allowance.
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), LedgerError>;

    /// Sets `spender`'s allowance over `owner`'s funds to exactly `amount`.
    fn approve(&mut self, owner: &Address, spender: &Address, amount: u64) -> Result<(), LedgerError>;
}

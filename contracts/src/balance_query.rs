//! # Balance Queries
//!
//! Read-only views of vault and caller balances. Nothing here is cached:
//! every call asks the ledgers.

use chrono::{DateTime, Utc};
use pairvault_protocol::ledger::{Address, TokenLedger};
use serde::{Deserialize, Serialize};

use crate::asset::Asset;
use crate::swap_engine::SwapVault;

/// A consistent point-in-time view of a vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultSnapshot {
    /// The vault's own address.
    pub vault: Address,
    /// The rate owner.
    pub owner: Address,
    /// Symbol of asset A.
    pub symbol_a: String,
    /// Symbol of asset B.
    pub symbol_b: String,
    /// Stable value of one unit of A.
    pub rate_a: u64,
    /// Stable value of one unit of B.
    pub rate_b: u64,
    /// Vault balance of A.
    pub reserve_a: u64,
    /// Vault balance of B.
    pub reserve_b: u64,
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
}

impl VaultSnapshot {
    /// Total reserves measured in stable units at the snapshot's rates.
    ///
    /// Each product fits in `u128`; only the sum of two maximal products
    /// can overflow, and that saturates.
    pub fn stable_value(&self) -> u128 {
        let value_a = u128::from(self.reserve_a) * u128::from(self.rate_a);
        let value_b = u128::from(self.reserve_b) * u128::from(self.rate_b);
        value_a.saturating_add(value_b)
    }
}

impl<L: TokenLedger> SwapVault<L> {
    /// The vault's live balance of `asset`.
    pub fn vault_balance_of(&self, asset: Asset) -> u64 {
        self.ledger(asset).read().balance_of(self.vault_address())
    }

    /// `who`'s live balance of `asset`.
    pub fn caller_balance_of(&self, asset: Asset, who: &Address) -> u64 {
        self.ledger(asset).read().balance_of(who)
    }

    /// Reads rates and both reserves under one set of locks, so the result
    /// never mixes states from before and after a swap.
    pub fn snapshot(&self) -> VaultSnapshot {
        let rates = self.registry().read();
        let ledger_a = self.ledger(Asset::A).read();
        let ledger_b = self.ledger(Asset::B).read();

        VaultSnapshot {
            vault: self.vault_address().clone(),
            owner: rates.owner().clone(),
            symbol_a: self.symbol(Asset::A).to_string(),
            symbol_b: self.symbol(Asset::B).to_string(),
            rate_a: rates.rate_a(),
            rate_b: rates.rate_b(),
            reserve_a: ledger_a.balance_of(self.vault_address()),
            reserve_b: ledger_b.balance_of(self.vault_address()),
            taken_at: Utc::now(),
        }
    }
}

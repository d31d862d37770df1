//! # In-Memory Fungible Token
//!
//! A single-asset ledger with ERC-20 style balances and allowances. This is
//! the reference [`TokenLedger`]: it is what the vault runs against in tests
//! and benchmarks, and what a host embeds when it has no ledger of its own.
//!
//! ## Allowance Model
//!
//! - `approve` overwrites the allowance, it does not add to it.
//! - `transfer_from` consumes allowance only after the balance move
//!   succeeded.
//! - An allowance of [`UNLIMITED_ALLOWANCE`] is never decremented.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::balance::BalanceSheet;
use super::token::{Address, AssetId, TokenInfo};
use super::{LedgerError, TokenLedger};
use crate::config::UNLIMITED_ALLOWANCE;

/// An in-memory fungible token ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FungibleToken {
    info: TokenInfo,
    balances: BalanceSheet,
    /// `owner -> (spender -> remaining allowance)`.
    allowances: HashMap<Address, HashMap<Address, u64>>,
    total_supply: u64,
}

impl FungibleToken {
    /// Creates an empty ledger for the given asset. Supply starts at zero.
    pub fn new(info: TokenInfo) -> Self {
        Self {
            info,
            balances: BalanceSheet::new(),
            allowances: HashMap::new(),
            total_supply: 0,
        }
    }

    /// Returns the asset's metadata.
    pub fn info(&self) -> &TokenInfo {
        &self.info
    }

    /// Returns the total supply in circulation.
    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Returns the balance sheet backing this ledger.
    pub fn balances(&self) -> &BalanceSheet {
        &self.balances
    }

    /// Creates `amount` new units and credits them to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::SupplyOverflow`] if supply would exceed `u64::MAX`.
    pub fn mint(&mut self, to: &Address, amount: u64) -> Result<u64, LedgerError> {
        let new_supply =
            self.total_supply
                .checked_add(amount)
                .ok_or(LedgerError::SupplyOverflow {
                    supply: self.total_supply,
                    amount,
                })?;

        // Supply fits, so no single balance can overflow either.
        let balance = self.balances.credit(to, amount)?;
        self.total_supply = new_supply;

        trace!(symbol = %self.info.symbol, to = %to, amount, "minted");
        Ok(balance)
    }
}

impl TokenLedger for FungibleToken {
    fn asset_id(&self) -> AssetId {
        self.info.asset_id
    }

    fn symbol(&self) -> &str {
        &self.info.symbol
    }

    fn balance_of(&self, who: &Address) -> u64 {
        self.balances.balance_of(who)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u64 {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(&mut self, sender: &Address, to: &Address, amount: u64) -> Result<(), LedgerError> {
        self.balances.move_funds(sender, to, amount)?;
        trace!(symbol = %self.info.symbol, from = %sender, to = %to, amount, "transfer");
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), LedgerError> {
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: from.clone(),
                spender: spender.clone(),
                allowed,
                requested: amount,
            });
        }

        self.balances.move_funds(from, to, amount)?;

        if allowed != UNLIMITED_ALLOWANCE {
            self.allowances
                .entry(from.clone())
                .or_default()
                .insert(spender.clone(), allowed - amount);
        }

        trace!(
            symbol = %self.info.symbol,
            spender = %spender,
            from = %from,
            to = %to,
            amount,
            "transfer_from"
        );
        Ok(())
    }

    fn approve(&mut self, owner: &Address, spender: &Address, amount: u64) -> Result<(), LedgerError> {
        self.allowances
            .entry(owner.clone())
            .or_default()
            .insert(spender.clone(), amount);
        trace!(symbol = %self.info.symbol, owner = %owner, spender = %spender, amount, "approve");
        Ok(())
    }
}

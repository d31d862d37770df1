//! # Per-Holder Balance Tracking
//!
//! A [`BalanceSheet`] is the complete set of balances for a single asset,
//! keyed by holder [`Address`]. It enforces that nobody can spend more than
//! they have and that no balance ever overflows `u64`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::token::Address;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during balance operations.
#[derive(Debug, Error)]
pub enum BalanceError {
    /// Attempted to debit more than the available balance.
    #[error("insufficient balance: available {available}, requested {requested} (holder {holder})")]
    InsufficientBalance {
        /// The holder that was being debited.
        holder: Address,
        /// The current balance.
        available: u64,
        /// The amount that was requested.
        requested: u64,
    },

    /// Arithmetic overflow during a credit operation.
    #[error("balance overflow: current {current}, credit {credit} (holder {holder})")]
    Overflow {
        /// The holder that was being credited.
        holder: Address,
        /// The balance before the failed credit.
        current: u64,
        /// The amount that caused the overflow.
        credit: u64,
    },
}

// ---------------------------------------------------------------------------
// Balance
// ---------------------------------------------------------------------------

/// A single holder's balance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Balance {
    /// Balance in smallest units.
    pub amount: u64,
    /// Timestamp of the last balance-modifying operation.
    pub last_updated: DateTime<Utc>,
}

impl Balance {
    fn zero() -> Self {
        Self {
            amount: 0,
            last_updated: Utc::now(),
        }
    }

    /// Returns `true` if this balance is zero.
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

// ---------------------------------------------------------------------------
// BalanceSheet
// ---------------------------------------------------------------------------

/// All balances of one asset, indexed by holder.
///
/// Carries no locking of its own. Ledgers shared across threads are
/// wrapped in a lock by whoever shares them.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BalanceSheet {
    balances: HashMap<Address, Balance>,
}

impl BalanceSheet {
    /// Creates an empty balance sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `amount` to `holder`, creating the entry if needed.
    ///
    /// Returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns [`BalanceError::Overflow`] if the credit would exceed `u64::MAX`.
    pub fn credit(&mut self, holder: &Address, amount: u64) -> Result<u64, BalanceError> {
        let balance = self
            .balances
            .entry(holder.clone())
            .or_insert_with(Balance::zero);

        let new_amount = balance
            .amount
            .checked_add(amount)
            .ok_or_else(|| BalanceError::Overflow {
                holder: holder.clone(),
                current: balance.amount,
                credit: amount,
            })?;

        balance.amount = new_amount;
        balance.last_updated = Utc::now();

        Ok(new_amount)
    }

    /// Debits `amount` from `holder`. Returns the remaining balance.
    ///
    /// # Errors
    ///
    /// Returns [`BalanceError::InsufficientBalance`] if the holder has less
    /// than `amount` (an unknown holder has zero).
    pub fn debit(&mut self, holder: &Address, amount: u64) -> Result<u64, BalanceError> {
        let available = self.balance_of(holder);
        if available < amount {
            return Err(BalanceError::InsufficientBalance {
                holder: holder.clone(),
                available,
                requested: amount,
            });
        }
        if amount == 0 {
            return Ok(available);
        }

        // available >= amount > 0, so the entry exists.
        if let Some(balance) = self.balances.get_mut(holder) {
            balance.amount -= amount;
            balance.last_updated = Utc::now();
        }

        Ok(available - amount)
    }

    /// Moves `amount` from `from` to `to` as one step.
    ///
    /// Both sides are checked before either is touched, so a failure leaves
    /// the sheet exactly as it was.
    pub fn move_funds(&mut self, from: &Address, to: &Address, amount: u64) -> Result<(), BalanceError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(BalanceError::InsufficientBalance {
                holder: from.clone(),
                available,
                requested: amount,
            });
        }
        if from == to || amount == 0 {
            return Ok(());
        }

        let current = self.balance_of(to);
        if current.checked_add(amount).is_none() {
            return Err(BalanceError::Overflow {
                holder: to.clone(),
                current,
                credit: amount,
            });
        }

        self.debit(from, amount)?;
        self.credit(to, amount)?;
        Ok(())
    }

    /// Returns the balance of `holder`, or 0 for unknown holders.
    pub fn balance_of(&self, holder: &Address) -> u64 {
        self.balances.get(holder).map(|b| b.amount).unwrap_or(0)
    }

    /// Returns all non-zero balances as `(holder, amount)` pairs.
    pub fn all_balances(&self) -> Vec<(Address, u64)> {
        self.balances
            .iter()
            .filter(|(_, b)| !b.is_zero())
            .map(|(holder, b)| (holder.clone(), b.amount))
            .collect()
    }

    /// Sum of all balances. Used for conservation checks.
    pub fn total(&self) -> u128 {
        self.balances.values().map(|b| u128::from(b.amount)).sum()
    }

    /// Number of holders that have ever been credited.
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

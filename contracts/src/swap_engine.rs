//! # Swap Engine
//!
//! The vault contract proper. It custodies reserves of two assets on two
//! external ledgers and converts one into the other for any caller at the
//! rates held by its [`RateRegistry`].
//!
//! ## Swap Sequence
//!
//! 1. Reject a zero amount.
//! 2. Quote the output at current rates.
//! 3. Check the vault's destination reserve covers the output.
//! 4. Pull the source amount from the caller (`transfer_from`). A ledger
//!    refusal here is the caller's `InsufficientFunds`.
//! 5. Pay the output to the caller (`transfer`). Should this fail, the pull
//!    from step 4 is refunded and the caller's allowance reset to its value
//!    before the pull, then the payout error is returned.
//! 6. Emit one completion event.
//!
//! Steps 1 to 3 move nothing, so every rejection before step 4 is free of side
//! effects.
//!
//! ## Atomicity
//!
//! A swap holds the registry read lock and write locks on both ledgers for
//! its whole duration, acquired in the order registry → A → B. Rate
//! changes take the registry write lock. No operation can observe another
//! one half done, and the fixed order rules out lock-order deadlocks.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pairvault_protocol::config::VaultConfig;
use pairvault_protocol::ledger::{Address, AssetId, LedgerError, TokenLedger};
use pairvault_protocol::metrics::VaultMetrics;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::asset::{Asset, SwapDirection};
use crate::error::VaultError;
use crate::events::{EventLog, VaultEvent, VaultEventKind};
use crate::liquidity::assert_sufficient_reserve;
use crate::rate_registry::RateRegistry;

/// A ledger shared between the vault and everybody else who uses it.
pub type SharedLedger<L> = Arc<RwLock<L>>;

/// Wraps a ledger for sharing with a vault.
pub fn shared<L: TokenLedger>(ledger: L) -> SharedLedger<L> {
    Arc::new(RwLock::new(ledger))
}

/// Outcome of a completed swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapReceipt {
    /// Unique identifier of this swap.
    pub swap_id: Uuid,
    /// Which way the value moved.
    pub direction: SwapDirection,
    /// Who swapped.
    pub caller: Address,
    /// Units of the source asset pulled from the caller.
    pub amount_in: u64,
    /// Units of the destination asset paid to the caller.
    pub amount_out: u64,
    /// Symbol of the source asset.
    pub source_symbol: String,
    /// When the swap completed.
    pub executed_at: DateTime<Utc>,
}

/// A two-asset exchange vault.
///
/// `Send + Sync`: all methods take `&self`, so one vault can be shared
/// behind an `Arc` by any number of threads.
pub struct SwapVault<L: TokenLedger> {
    address: Address,
    rates: RwLock<RateRegistry>,
    ledger_a: SharedLedger<L>,
    ledger_b: SharedLedger<L>,
    asset_a: AssetId,
    asset_b: AssetId,
    symbol_a: String,
    symbol_b: String,
    events: Mutex<EventLog>,
    metrics: VaultMetrics,
}

impl<L: TokenLedger> SwapVault<L> {
    /// Deploys a vault under `label`.
    ///
    /// The vault's address is derived from `label`. Reserves are whatever
    /// that address already holds on the two ledgers, or receives later.
    ///
    /// # Errors
    ///
    /// [`VaultError::InvalidRate`] for a zero rate,
    /// [`VaultError::IdenticalAssets`] if both ledgers are the same handle
    /// or track the same asset.
    pub fn new(
        label: &str,
        owner: Address,
        ledger_a: SharedLedger<L>,
        ledger_b: SharedLedger<L>,
        rate_a: u64,
        rate_b: u64,
    ) -> Result<Self, VaultError> {
        let rates = RateRegistry::new(owner, rate_a, rate_b)?;

        let (asset_a, symbol_a) = {
            let ledger = ledger_a.read();
            (ledger.asset_id(), ledger.symbol().to_string())
        };
        if Arc::ptr_eq(&ledger_a, &ledger_b) {
            return Err(VaultError::IdenticalAssets(asset_a));
        }
        let (asset_b, symbol_b) = {
            let ledger = ledger_b.read();
            (ledger.asset_id(), ledger.symbol().to_string())
        };
        if asset_a == asset_b {
            return Err(VaultError::IdenticalAssets(asset_a));
        }

        let vault = Self {
            address: Address::contract(label),
            rates: RwLock::new(rates),
            ledger_a,
            ledger_b,
            asset_a,
            asset_b,
            symbol_a,
            symbol_b,
            events: Mutex::new(EventLog::new()),
            metrics: VaultMetrics::new()?,
        };
        vault.publish_reserves();

        info!(
            vault = %vault.address,
            owner = %vault.owner(),
            asset_a = %vault.symbol_a,
            asset_b = %vault.symbol_b,
            rate_a,
            rate_b,
            "vault deployed"
        );
        Ok(vault)
    }

    /// Deploys a vault from a validated [`VaultConfig`].
    ///
    /// # Errors
    ///
    /// [`VaultError::AssetMismatch`] if a ledger tracks a different asset
    /// than its config entry, plus everything [`SwapVault::new`] returns.
    pub fn from_config(
        config: &VaultConfig,
        ledger_a: SharedLedger<L>,
        ledger_b: SharedLedger<L>,
    ) -> Result<Self, VaultError> {
        for (expected, ledger) in [(&config.asset_a, &ledger_a), (&config.asset_b, &ledger_b)] {
            let ledger = ledger.read();
            if expected.token_info().asset_id != ledger.asset_id() {
                return Err(VaultError::AssetMismatch {
                    expected: expected.symbol.clone(),
                    found: ledger.symbol().to_string(),
                });
            }
        }

        Self::new(
            &config.label,
            config.owner.clone(),
            ledger_a,
            ledger_b,
            config.rate_a,
            config.rate_b,
        )
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    /// The vault's own address: where its reserves live and the spender
    /// callers must approve.
    pub fn vault_address(&self) -> &Address {
        &self.address
    }

    /// The principal allowed to change rates.
    pub fn owner(&self) -> Address {
        self.rates.read().owner().clone()
    }

    /// Asset ID of one side.
    pub fn asset_id(&self, asset: Asset) -> AssetId {
        match asset {
            Asset::A => self.asset_a,
            Asset::B => self.asset_b,
        }
    }

    /// Symbol of one side.
    pub fn symbol(&self, asset: Asset) -> &str {
        match asset {
            Asset::A => &self.symbol_a,
            Asset::B => &self.symbol_b,
        }
    }

    /// The vault's metrics.
    pub fn metrics(&self) -> &VaultMetrics {
        &self.metrics
    }

    pub(crate) fn ledger(&self, asset: Asset) -> &SharedLedger<L> {
        match asset {
            Asset::A => &self.ledger_a,
            Asset::B => &self.ledger_b,
        }
    }

    pub(crate) fn registry(&self) -> &RwLock<RateRegistry> {
        &self.rates
    }

    // -----------------------------------------------------------------------
    // Rates
    // -----------------------------------------------------------------------

    /// Stable value of one unit of A.
    pub fn rate_a_to_stable(&self) -> u64 {
        self.rates.read().rate_a()
    }

    /// Stable value of one unit of B.
    pub fn rate_b_to_stable(&self) -> u64 {
        self.rates.read().rate_b()
    }

    /// Owner-only: replaces the rate of A.
    pub fn set_rate_a_to_stable(&self, caller: &Address, new_rate: u64) -> Result<(), VaultError> {
        self.update_rate(caller, Asset::A, new_rate)
    }

    /// Owner-only: replaces the rate of B.
    pub fn set_rate_b_to_stable(&self, caller: &Address, new_rate: u64) -> Result<(), VaultError> {
        self.update_rate(caller, Asset::B, new_rate)
    }

    fn update_rate(&self, caller: &Address, asset: Asset, new_rate: u64) -> Result<(), VaultError> {
        let mut rates = self.rates.write();
        match rates.set_rate(caller, asset, new_rate) {
            Ok(old_rate) => {
                self.events.lock().emit(VaultEventKind::RateUpdated {
                    asset,
                    old_rate,
                    new_rate,
                });
                self.metrics.record_rate_update();
                info!(vault = %self.address, %asset, old_rate, new_rate, "rate updated");
                Ok(())
            }
            Err(err) => {
                warn!(vault = %self.address, caller = %caller, %asset, new_rate, error = %err, "rate change rejected");
                Err(err)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Quotes
    // -----------------------------------------------------------------------

    /// Units of B a swap of `amount` A would pay at current rates.
    ///
    /// Ignores liquidity. Zero is a valid input here.
    pub fn quote_a_to_b(&self, amount: u64) -> Result<u64, VaultError> {
        self.quote(SwapDirection::AtoB, amount)
    }

    /// Units of A a swap of `amount` B would pay at current rates.
    pub fn quote_b_to_a(&self, amount: u64) -> Result<u64, VaultError> {
        self.quote(SwapDirection::BtoA, amount)
    }

    /// Output of a swap of `amount` in `direction` at current rates.
    pub fn quote(&self, direction: SwapDirection, amount: u64) -> Result<u64, VaultError> {
        let out = self.rates.read().quote(direction, amount)?;
        debug!(%direction, amount, out, "quote");
        Ok(out)
    }

    // -----------------------------------------------------------------------
    // Swaps
    // -----------------------------------------------------------------------

    /// Pays `amount` of A from `caller`, returns B at current rates.
    pub fn swap_a_to_b(&self, caller: &Address, amount: u64) -> Result<SwapReceipt, VaultError> {
        self.swap(caller, SwapDirection::AtoB, amount)
    }

    /// Pays `amount` of B from `caller`, returns A at current rates.
    pub fn swap_b_to_a(&self, caller: &Address, amount: u64) -> Result<SwapReceipt, VaultError> {
        self.swap(caller, SwapDirection::BtoA, amount)
    }

    /// Executes one swap. On error nothing has changed.
    pub fn swap(&self, caller: &Address, direction: SwapDirection, amount: u64) -> Result<SwapReceipt, VaultError> {
        match self.execute_swap(caller, direction, amount) {
            Ok(receipt) => {
                self.metrics.record_swap(direction.as_str(), receipt.amount_out);
                info!(
                    vault = %self.address,
                    swap_id = %receipt.swap_id,
                    caller = %caller,
                    %direction,
                    amount_in = receipt.amount_in,
                    amount_out = receipt.amount_out,
                    "swap completed"
                );
                Ok(receipt)
            }
            Err(err) => {
                self.metrics.record_rejection(err.reason());
                warn!(
                    vault = %self.address,
                    caller = %caller,
                    %direction,
                    amount,
                    error = %err,
                    "swap rejected"
                );
                Err(err)
            }
        }
    }

    fn execute_swap(&self, caller: &Address, direction: SwapDirection, amount: u64) -> Result<SwapReceipt, VaultError> {
        if amount == 0 {
            return Err(VaultError::InvalidAmount);
        }

        // Lock order: registry, A, B. Held until the event is written.
        let rates = self.rates.read();
        let mut ledger_a = self.ledger_a.write();
        let mut ledger_b = self.ledger_b.write();

        let amount_out = rates.quote(direction, amount)?;

        let (source, destination): (&mut L, &mut L) = match direction {
            SwapDirection::AtoB => (&mut *ledger_a, &mut *ledger_b),
            SwapDirection::BtoA => (&mut *ledger_b, &mut *ledger_a),
        };

        assert_sufficient_reserve(&*destination, &self.address, amount_out)?;

        let prior_allowance = source.allowance(caller, &self.address);
        source
            .transfer_from(&self.address, caller, &self.address, amount)
            .map_err(|cause| VaultError::InsufficientFunds { source: cause })?;

        if let Err(payout) = destination.transfer(&self.address, caller, amount_out) {
            warn!(
                vault = %self.address,
                caller = %caller,
                %direction,
                error = %payout,
                "payout failed, refunding caller"
            );
            return Err(self.refund(source, caller, amount, prior_allowance, payout));
        }

        let source_symbol = source.symbol().to_string();
        self.metrics
            .set_reserve(Asset::A.label(), ledger_a.balance_of(&self.address));
        self.metrics
            .set_reserve(Asset::B.label(), ledger_b.balance_of(&self.address));

        let event = self.events.lock().emit(VaultEventKind::swap_completed(
            direction,
            amount,
            &source_symbol,
            amount_out,
        ));

        Ok(SwapReceipt {
            swap_id: event.event_id,
            direction,
            caller: caller.clone(),
            amount_in: amount,
            amount_out,
            source_symbol,
            executed_at: event.emitted_at,
        })
    }

    /// Undoes a pull whose payout failed: returns the funds and resets the
    /// caller's allowance to what it was before the pull.
    fn refund(
        &self,
        source: &mut L,
        caller: &Address,
        amount: u64,
        prior_allowance: u64,
        payout: LedgerError,
    ) -> VaultError {
        let restored = source
            .transfer(&self.address, caller, amount)
            .and_then(|()| source.approve(caller, &self.address, prior_allowance));

        match restored {
            Ok(()) => VaultError::Ledger(payout),
            Err(refund) => {
                error!(
                    vault = %self.address,
                    caller = %caller,
                    amount,
                    payout_error = %payout,
                    refund_error = %refund,
                    "compensation failed after payout failure"
                );
                VaultError::RefundFailed { payout, refund }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Copies of all buffered events, oldest first.
    pub fn events(&self) -> Vec<VaultEvent> {
        self.events.lock().all().to_vec()
    }

    /// Removes and returns all buffered events.
    pub fn drain_events(&self) -> Vec<VaultEvent> {
        self.events.lock().drain()
    }

    fn publish_reserves(&self) {
        for asset in [Asset::A, Asset::B] {
            let reserve = self.ledger(asset).read().balance_of(&self.address);
            self.metrics.set_reserve(asset.label(), reserve);
        }
    }
}

//! # PairVault Contracts
//!
//! A two-asset exchange vault. The vault custodies reserves of two fungible
//! tokens and converts one into the other for any caller, at a rate given by
//! two owner-controlled value anchors (each asset's value in a common stable
//! unit).
//!
//! - **Rate Registry**: the two anchors and the single owner who may move
//!   them.
//! - **Liquidity Guard**: refuses a swap the vault cannot pay out before any
//!   funds move.
//! - **Swap Engine**: pull source, pay destination, emit one event; all or
//!   nothing.
//! - **Balance Query**: live caller and vault balances, and snapshots.
//!
//! ## Design Principles
//!
//! 1. Balances live on the ledgers only. The vault never caches a reserve.
//! 2. Conversion is integer-only with floor rounding. The remainder stays in
//!    the vault.
//! 3. Every failed operation has no effect and emits no event. A failed
//!    payout is undone, allowance included.
//! 4. Every public type is serializable (serde) for wire transport and
//!    persistent storage.

pub mod asset;
pub mod balance_query;
pub mod error;
pub mod events;
pub mod liquidity;
pub mod rate_registry;
pub mod swap_engine;

pub use asset::{Asset, SwapDirection};
pub use balance_query::VaultSnapshot;
pub use error::VaultError;
pub use events::{VaultEvent, VaultEventKind};
pub use rate_registry::{convert, RateRegistry};
pub use swap_engine::{shared, SharedLedger, SwapReceipt, SwapVault};

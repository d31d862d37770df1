// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # PairVault Protocol: Shared Plumbing
//!
//! Everything the exchange contract leans on but does not own lives here:
//! the token ledger collaborator, configuration, and the observability
//! layer. The contract itself lives in `pairvault-contracts`.
//!
//! ## Architecture
//!
//! - **ledger**: The `TokenLedger` collaborator trait, asset identifiers,
//!   principal addresses, and an in-memory fungible token that implements
//!   the trait with ERC-20 style balances and allowances.
//! - **config**: Protocol constants and the deployable vault configuration.
//! - **logging**: `tracing` subscriber setup.
//! - **metrics**: Prometheus counters and gauges for vault activity.
//!
//! ## Design Philosophy
//!
//! 1. All amounts are `u64` in the smallest unit. No floating point touches
//!    balances, ever.
//! 2. Every ledger failure is an explicit `Result`, never a panic.
//! 3. If it touches money, it has tests. Plural.

pub mod config;
pub mod ledger;
pub mod logging;
pub mod metrics;

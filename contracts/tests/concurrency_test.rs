//! Concurrency tests: one vault shared by many threads.
//!
//! Traders draw amounts and directions from seeded RNGs so failures are
//! reproducible. Whatever interleaving the scheduler picks, value is
//! conserved and every swap is all or nothing.

use std::thread;

use pairvault_contracts::{
    convert, shared, SharedLedger, SwapDirection, SwapReceipt, SwapVault, VaultError,
};
use pairvault_protocol::config::UNLIMITED_ALLOWANCE;
use pairvault_protocol::ledger::{Address, FungibleToken, TokenInfo, TokenLedger};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TRADERS: usize = 8;
const SWAPS_PER_TRADER: usize = 200;
const TRADER_FUNDS: u64 = 1_000_000;
const RESERVE: u64 = 1_000_000;

struct Market {
    vault: SwapVault<FungibleToken>,
    aji: SharedLedger<FungibleToken>,
    sabo: SharedLedger<FungibleToken>,
    owner: Address,
    traders: Vec<Address>,
}

fn open_market() -> Market {
    let aji = shared(FungibleToken::new(TokenInfo::new("Ajidokwu", "AJI", 18)));
    let sabo = shared(FungibleToken::new(TokenInfo::new("Sabo", "SABO", 18)));
    let owner = Address::from("owner");
    let vault = SwapVault::new(
        "pairvault-concurrency",
        owner.clone(),
        aji.clone(),
        sabo.clone(),
        2,
        3,
    )
    .unwrap();

    let traders: Vec<Address> = (0..TRADERS)
        .map(|i| Address::new(format!("trader-{i}")))
        .collect();

    for ledger in [&aji, &sabo] {
        let mut ledger = ledger.write();
        ledger.mint(vault.vault_address(), RESERVE).unwrap();
        for trader in &traders {
            ledger.mint(trader, TRADER_FUNDS).unwrap();
            ledger
                .approve(trader, vault.vault_address(), UNLIMITED_ALLOWANCE)
                .unwrap();
        }
    }

    Market {
        vault,
        aji,
        sabo,
        owner,
        traders,
    }
}

/// Runs one trader's seeded sequence and returns its receipts.
fn trade(vault: &SwapVault<FungibleToken>, trader: &Address, seed: u64) -> Vec<SwapReceipt> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut receipts = Vec::new();
    for _ in 0..SWAPS_PER_TRADER {
        let direction = if rng.gen_bool(0.5) {
            SwapDirection::AtoB
        } else {
            SwapDirection::BtoA
        };
        let amount = rng.gen_range(1..=5_000);
        match vault.swap(trader, direction, amount) {
            Ok(receipt) => receipts.push(receipt),
            Err(VaultError::InsufficientFunds { .. })
            | Err(VaultError::InsufficientLiquidity { .. }) => {}
            Err(other) => panic!("unexpected swap error: {other}"),
        }
    }
    receipts
}

fn total_held(ledger: &FungibleToken, holders: &[Address]) -> u64 {
    holders.iter().map(|h| ledger.balance_of(h)).sum()
}

#[test]
fn parallel_swaps_conserve_value() {
    let market = open_market();
    let vault = &market.vault;

    let receipts: Vec<SwapReceipt> = thread::scope(|s| {
        let handles: Vec<_> = market
            .traders
            .iter()
            .enumerate()
            .map(|(i, trader)| s.spawn(move || trade(vault, trader, 0xA11CE + i as u64)))
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    let mut holders = market.traders.clone();
    holders.push(vault.vault_address().clone());

    for ledger in [&market.aji, &market.sabo] {
        let ledger = ledger.read();
        let supply = RESERVE + TRADER_FUNDS * TRADERS as u64;
        assert_eq!(ledger.total_supply(), supply);
        assert_eq!(total_held(&ledger, &holders), supply);
        assert_eq!(ledger.balances().total(), u128::from(supply));
    }

    // Reserves move by exactly what the receipts say.
    let (mut in_a, mut out_a, mut in_b, mut out_b) = (0u64, 0u64, 0u64, 0u64);
    for receipt in &receipts {
        match receipt.direction {
            SwapDirection::AtoB => {
                in_a += receipt.amount_in;
                out_b += receipt.amount_out;
            }
            SwapDirection::BtoA => {
                in_b += receipt.amount_in;
                out_a += receipt.amount_out;
            }
        }
    }
    assert_eq!(
        market.aji.read().balance_of(vault.vault_address()),
        RESERVE + in_a - out_a
    );
    assert_eq!(
        market.sabo.read().balance_of(vault.vault_address()),
        RESERVE + in_b - out_b
    );

    // One event per completed swap, in a gap-free sequence.
    let events = vault.events();
    assert_eq!(events.len(), receipts.len());
    for (expected, event) in events.iter().enumerate() {
        assert_eq!(event.sequence, expected as u64);
    }

    let completed: u64 = ["a_to_b", "b_to_a"]
        .iter()
        .map(|d| {
            vault
                .metrics()
                .swaps_completed_total
                .with_label_values(&[d])
                .get()
        })
        .sum();
    assert_eq!(completed, receipts.len() as u64);
}

#[test]
fn every_swap_prices_at_one_consistent_rate() {
    let market = open_market();
    let vault = &market.vault;
    let owner = &market.owner;

    let receipts: Vec<SwapReceipt> = thread::scope(|s| {
        let traders: Vec<_> = market
            .traders
            .iter()
            .enumerate()
            .map(|(i, trader)| s.spawn(move || trade(vault, trader, 0xB0B + i as u64)))
            .collect();

        s.spawn(move || {
            for i in 0..500u64 {
                let rate = if i % 2 == 0 { 4 } else { 2 };
                vault.set_rate_a_to_stable(owner, rate).unwrap();
            }
        });

        traders
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    // rate_b never moves; rate_a is 2 or 4 at any instant.
    for receipt in &receipts {
        let candidates: Vec<u64> = [2, 4]
            .iter()
            .map(|&rate_a| match receipt.direction {
                SwapDirection::AtoB => convert(receipt.amount_in, rate_a, 3).unwrap(),
                SwapDirection::BtoA => convert(receipt.amount_in, 3, rate_a).unwrap(),
            })
            .collect();
        assert!(
            candidates.contains(&receipt.amount_out),
            "swap of {} paid {}, expected one of {:?}",
            receipt.amount_in,
            receipt.amount_out,
            candidates
        );
    }
    assert_eq!(vault.rate_a_to_stable(), 2);
}

#[test]
fn seeded_sweep_never_pays_more_than_the_reserve() {
    let market = open_market();
    let trader = &market.traders[0];
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..1_000 {
        let direction = if rng.gen_bool(0.5) {
            SwapDirection::AtoB
        } else {
            SwapDirection::BtoA
        };
        // Large enough to hit both funds and liquidity limits.
        let amount = rng.gen_range(1..=2_000_000);
        let reserve_before = market
            .vault
            .vault_balance_of(direction.destination());
        let snapshot_before = market.vault.snapshot();

        match market.vault.swap(trader, direction, amount) {
            Ok(receipt) => assert!(receipt.amount_out <= reserve_before),
            Err(_) => {
                let after = market.vault.snapshot();
                assert_eq!(
                    (after.reserve_a, after.reserve_b),
                    (snapshot_before.reserve_a, snapshot_before.reserve_b)
                );
            }
        }
    }
}

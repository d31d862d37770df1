// Swap vault benchmarks.
//
// Covers raw conversion, quoting through the vault, and full swaps
// (allowance pull, payout and event emission) at several amounts.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use pairvault_contracts::{convert, shared, SwapDirection, SwapVault};
use pairvault_protocol::config::UNLIMITED_ALLOWANCE;
use pairvault_protocol::ledger::{Address, FungibleToken, TokenInfo, TokenLedger};

/// Deploys a vault with deep reserves and one trader holding plenty of
/// both assets with an unlimited approval.
fn setup_vault() -> (SwapVault<FungibleToken>, Address) {
    let aji = shared(FungibleToken::new(TokenInfo::new("Ajidokwu", "AJI", 18)));
    let sabo = shared(FungibleToken::new(TokenInfo::new("Sabo", "SABO", 18)));
    let trader = Address::from("bench-trader");
    let vault = SwapVault::new(
        "pairvault-bench",
        Address::from("owner"),
        aji.clone(),
        sabo.clone(),
        2,
        3,
    )
    .expect("deploy vault");

    for ledger in [&aji, &sabo] {
        let mut ledger = ledger.write();
        ledger
            .mint(vault.vault_address(), u64::MAX / 4)
            .expect("seed reserve");
        ledger.mint(&trader, u64::MAX / 4).expect("seed trader");
        ledger
            .approve(&trader, vault.vault_address(), UNLIMITED_ALLOWANCE)
            .expect("approve vault");
    }

    (vault, trader)
}

fn bench_convert(c: &mut Criterion) {
    c.bench_function("rates/convert", |b| {
        b.iter(|| convert(black_box(10_000), black_box(2), black_box(3)));
    });
}

fn bench_quote(c: &mut Criterion) {
    let (vault, _) = setup_vault();
    c.bench_function("vault/quote_a_to_b", |b| {
        b.iter(|| vault.quote_a_to_b(black_box(10_000)));
    });
}

fn bench_swap(c: &mut Criterion) {
    let mut group = c.benchmark_group("vault/swap");

    for amount in [1u64, 10_000, 1_000_000_000] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(amount), &amount, |b, &amount| {
            let (vault, trader) = setup_vault();
            let mut direction = SwapDirection::AtoB;
            b.iter(|| {
                vault
                    .swap(&trader, direction, amount)
                    .expect("bench swap");
                direction = match direction {
                    SwapDirection::AtoB => SwapDirection::BtoA,
                    SwapDirection::BtoA => SwapDirection::AtoB,
                };
                // Keep the event log from growing without bound.
                vault.drain_events();
            });
        });
    }

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let (vault, _) = setup_vault();
    c.bench_function("vault/snapshot", |b| {
        b.iter(|| vault.snapshot().stable_value());
    });
}

criterion_group!(benches, bench_convert, bench_quote, bench_swap, bench_snapshot);
criterion_main!(benches);

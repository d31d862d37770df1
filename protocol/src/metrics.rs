//! # Prometheus Metrics
//!
//! Operational metrics for a vault: completed and rejected swaps, rate
//! changes, and live reserves.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] so
//! several vaults in one process never collide, and nothing leaks into the
//! default global registry.

use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec,
    IntGaugeVec, Opts, Registry, TextEncoder,
};

use crate::config::METRICS_NAMESPACE;

/// Holds all Prometheus metric handles for one vault.
///
/// Clone-friendly (prometheus handles are `Arc`s internally) so it can be
/// shared with whatever serves the scrape endpoint.
#[derive(Clone)]
pub struct VaultMetrics {
    registry: Registry,
    /// Completed swaps, labelled by `direction` (`a_to_b` / `b_to_a`).
    pub swaps_completed_total: IntCounterVec,
    /// Rejected swaps, labelled by `reason`.
    pub swaps_rejected_total: IntCounterVec,
    /// Successful rate changes.
    pub rate_updates_total: IntCounter,
    /// Vault reserve per `asset` (`a` / `b`) after the last operation.
    pub reserve: IntGaugeVec,
    /// Distribution of swap output amounts, in destination smallest units.
    pub swap_output_amount: Histogram,
}

impl VaultMetrics {
    /// Creates and registers all metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some(METRICS_NAMESPACE.into()), None)?;

        let swaps_completed_total = IntCounterVec::new(
            Opts::new("swaps_completed_total", "Total number of completed swaps"),
            &["direction"],
        )?;
        registry.register(Box::new(swaps_completed_total.clone()))?;

        let swaps_rejected_total = IntCounterVec::new(
            Opts::new("swaps_rejected_total", "Total number of rejected swaps"),
            &["reason"],
        )?;
        registry.register(Box::new(swaps_rejected_total.clone()))?;

        let rate_updates_total =
            IntCounter::new("rate_updates_total", "Total number of successful rate changes")?;
        registry.register(Box::new(rate_updates_total.clone()))?;

        let reserve = IntGaugeVec::new(
            Opts::new("reserve", "Vault reserve per asset in smallest units"),
            &["asset"],
        )?;
        registry.register(Box::new(reserve.clone()))?;

        let swap_output_amount = Histogram::with_opts(
            HistogramOpts::new("swap_output_amount", "Swap output amounts")
                .buckets(exponential_buckets(1.0, 10.0, 12)?),
        )?;
        registry.register(Box::new(swap_output_amount.clone()))?;

        Ok(Self {
            registry,
            swaps_completed_total,
            swaps_rejected_total,
            rate_updates_total,
            reserve,
            swap_output_amount,
        })
    }

    /// Records one completed swap.
    pub fn record_swap(&self, direction: &str, out_amount: u64) {
        self.swaps_completed_total
            .with_label_values(&[direction])
            .inc();
        self.swap_output_amount.observe(out_amount as f64);
    }

    /// Records one rejected swap.
    pub fn record_rejection(&self, reason: &str) {
        self.swaps_rejected_total.with_label_values(&[reason]).inc();
    }

    /// Records one successful rate change.
    pub fn record_rate_update(&self) {
        self.rate_updates_total.inc();
    }

    /// Publishes the current reserve of one asset. Saturates at `i64::MAX`.
    pub fn set_reserve(&self, asset: &str, amount: u64) {
        self.reserve
            .with_label_values(&[asset])
            .set(i64::try_from(amount).unwrap_or(i64::MAX));
    }

    /// Returns the registry, for hosts that merge it into their own scrape.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Renders all metrics in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_are_namespaced() {
        let metrics = VaultMetrics::new().unwrap();
        metrics.record_swap("a_to_b", 6666);
        let text = metrics.encode().unwrap();
        assert!(text.contains("pairvault_swaps_completed_total"));
        assert!(text.contains("direction=\"a_to_b\""));
    }

    #[test]
    fn counters_accumulate() {
        let metrics = VaultMetrics::new().unwrap();
        metrics.record_rejection("invalid_amount");
        metrics.record_rejection("invalid_amount");
        metrics.record_rate_update();
        assert_eq!(
            metrics
                .swaps_rejected_total
                .with_label_values(&["invalid_amount"])
                .get(),
            2
        );
        assert_eq!(metrics.rate_updates_total.get(), 1);
    }

    #[test]
    fn reserve_gauge_saturates() {
        let metrics = VaultMetrics::new().unwrap();
        metrics.set_reserve("a", u64::MAX);
        metrics.set_reserve("b", 100_000);
        assert_eq!(metrics.reserve.with_label_values(&["a"]).get(), i64::MAX);
        assert_eq!(metrics.reserve.with_label_values(&["b"]).get(), 100_000);
    }

    #[test]
    fn independent_instances_do_not_collide() {
        let first = VaultMetrics::new().unwrap();
        let second = VaultMetrics::new().unwrap();
        first.record_rate_update();
        assert_eq!(second.rate_updates_total.get(), 0);
    }
}

use std::sync::atomic::{AtomicU64, Ordering};

/// Running counters for one Feeder process, logged every N ticks instead of
/// exported as a scrape surface — grounded on `rootsignal-scout`'s scheduler,
/// which logs its own throughput rather than emitting Prometheus metrics.
#[derive(Default)]
pub struct FeederMetrics {
    pub ticks_run: AtomicU64,
    pub pages_fetched: AtomicU64,
    pub nodes_committed: AtomicU64,
    pub dns_drops: AtomicU64,
}

impl FeederMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_tick(&self) {
        self.ticks_run.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_commit(&self, count: u64) {
        self.nodes_committed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_dns_drop(&self) {
        self.dns_drops.fetch_add(1, Ordering::Relaxed);
    }

    pub fn log_if_due(&self, every: u64) {
        let ticks = self.ticks_run.load(Ordering::Relaxed);
        if every > 0 && ticks % every == 0 {
            tracing::info!(
                ticks,
                pages_fetched = self.pages_fetched.load(Ordering::Relaxed),
                nodes_committed = self.nodes_committed.load(Ordering::Relaxed),
                dns_drops = self.dns_drops.load(Ordering::Relaxed),
                "feeder throughput"
            );
        }
    }
}

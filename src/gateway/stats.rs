//! Gateway Statistics Module
//!
//! Tracks lookup outcomes. Counters are atomics so concurrent requests can
//! record without a lock.

use std::sync::atomic::{AtomicU64, Ordering};

// == Gateway Stats ==
/// Live lookup counters.
#[derive(Debug, Default)]
pub struct GatewayStats {
    hits: AtomicU64,
    misses: AtomicU64,
    malformed_entries: AtomicU64,
    origin_fetches: AtomicU64,
    origin_failures: AtomicU64,
    read_failures: AtomicU64,
    write_failures: AtomicU64,
}

/// Point-in-time copy of [`GatewayStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub malformed_entries: u64,
    pub origin_fetches: u64,
    pub origin_failures: u64,
    pub read_failures: u64,
    pub write_failures: u64,
}

impl StatsSnapshot {
    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups completed a read.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl GatewayStats {
    /// Creates a new GatewayStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_malformed_entry(&self) {
        self.malformed_entries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_origin_fetch(&self) {
        self.origin_fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_origin_failure(&self) {
        self.origin_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_read_failure(&self) {
        self.read_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Copies the current counter values.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            malformed_entries: self.malformed_entries.load(Ordering::Relaxed),
            origin_fetches: self.origin_fetches.load(Ordering::Relaxed),
            origin_failures: self.origin_failures.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }
}

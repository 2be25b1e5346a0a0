//! Store Statistics Module
//!
//! Tracks lookup hits and misses and entries reclaimed by the purge loop.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Store Stats ==
/// Point-in-time snapshot of store metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Number of lookups that found a key
    pub hits: u64,
    /// Number of lookups for absent keys
    pub misses: u64,
    /// Number of entries removed by purge sweeps
    pub purged: u64,
    /// Current number of entries in the store
    pub total_entries: usize,
}

impl StoreStats {
    // == Hit Rate ==
    /// Calculates the lookup hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Counters ==
/// Lock-free counters so lookups can record metrics under a shared read lock.
#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    purged: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn record_lookup(&self, found: bool) {
        let counter = if found { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_purged(&self, count: usize) {
        self.purged.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, total_entries: usize) -> StoreStats {
        StoreStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            purged: self.purged.load(Ordering::Relaxed),
            total_entries,
        }
    }
}

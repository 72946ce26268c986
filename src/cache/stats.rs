//! Cache Statistics Module
//!
//! Counts the outcome of every cache interaction the coordinator makes, so
//! soft failures (and the staleness windows they open) are observable.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time snapshot of the cache-aside counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Reads answered from cache
    pub hits: u64,
    /// Reads that found no entry
    pub misses: u64,
    /// Lookups that failed and were treated as misses
    pub lookup_errors: u64,
    /// Successful populations after a miss
    pub populations: u64,
    /// Populations that failed
    pub populate_failures: u64,
    /// Keys deleted after a mutation
    pub invalidations: u64,
    /// Key deletions that failed
    pub invalidation_failures: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses + lookup_errors), or 0.0 if no reads were made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.lookup_errors;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Cache Metrics ==
/// Lock-free counters shared by all concurrent requests.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    lookup_errors: AtomicU64,
    populations: AtomicU64,
    populate_failures: AtomicU64,
    invalidations: AtomicU64,
    invalidation_failures: AtomicU64,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lookup_error(&self) {
        self.lookup_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_population(&self) {
        self.populations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_populate_failure(&self) {
        self.populate_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalidation_failure(&self) {
        self.invalidation_failures.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Reads every counter. Counters are independent, so a snapshot taken
    /// under load is not a single consistent instant.
    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            lookup_errors: self.lookup_errors.load(Ordering::Relaxed),
            populations: self.populations.load(Ordering::Relaxed),
            populate_failures: self.populate_failures.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            invalidation_failures: self.invalidation_failures.load(Ordering::Relaxed),
        }
    }
}

//! Cache Statistics Module
//!
//! Tracks cache counters: hits, misses, invalidations, evictions and sweeps.

use serde::Serialize;

// == Cache Stats ==
/// Counters for one `ExpiringCache` instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Reads that returned a valid entry
    pub hits: u64,
    /// Reads that found nothing usable (absent, corrupt, expired or wrong version)
    pub misses: u64,
    /// Entries found expired or written under another version
    pub invalidations: u64,
    /// Entries removed by a sweep to get back under capacity
    pub evictions: u64,
    /// Completed sweeps
    pub sweeps: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// A miss caused by an expired or version-mismatched entry.
    pub fn record_invalidation(&mut self) {
        self.misses += 1;
        self.invalidations += 1;
    }

    pub fn record_evictions(&mut self, count: u64) {
        self.evictions += count;
    }

    pub fn record_sweep(&mut self) {
        self.sweeps += 1;
    }
}

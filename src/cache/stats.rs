//! Cache Statistics Module
//!
//! Tracks cache usage counters: hits, misses, evictions, expirations, deletions.

use serde::Serialize;

// == Cache Stats ==
/// Cache usage counters.
///
/// Counters only grow until [`CacheStats::reset`] is called.
/// `total_entries` and `capacity` describe the cache at read time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of `get` calls that found a live entry
    pub hits: u64,
    /// Number of `get` calls that found nothing or an expired entry
    pub misses: u64,
    /// Number of entries removed to make room for a new key
    pub evictions: u64,
    /// Number of expired entries discovered and removed
    pub expirations: u64,
    /// Number of successful `delete` calls
    pub deletions: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Fixed capacity of the cache
    pub capacity: usize,
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
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Total number of classified lookups.
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// An expired entry was found on access; counts as a miss as well.
    pub fn record_expired_lookup(&mut self) {
        self.misses += 1;
        self.expirations += 1;
    }

    /// Expired entries removed outside of a lookup (sweeps).
    pub fn record_expirations(&mut self, count: u64) {
        self.expirations += count;
    }

    pub fn record_deletion(&mut self) {
        self.deletions += 1;
    }

    // == Reset ==
    /// Zeroes every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

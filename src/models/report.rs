//! Stats report
//!
//! Point-in-time snapshot of cache statistics, serializable to JSON.

use serde::Serialize;

use crate::cache::{CacheStats, PolicyKind};

/// Cache statistics with derived hit rate and a timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    /// Eviction policy in use
    pub policy: PolicyKind,
    /// Fixed capacity
    pub capacity: usize,
    /// Current number of entries
    pub total_entries: usize,
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Number of expired entries removed
    pub expirations: u64,
    /// Number of successful deletes
    pub deletions: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// When the snapshot was taken, ISO 8601
    pub generated_at: String,
}

impl StatsReport {
    /// Builds a report from a stats snapshot.
    pub fn from_stats(stats: &CacheStats, policy: PolicyKind) -> Self {
        Self {
            policy,
            capacity: stats.capacity,
            total_entries: stats.total_entries,
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            deletions: stats.deletions,
            hit_rate: stats.hit_rate(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

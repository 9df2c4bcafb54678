//! Cache Entry Module
//!
//! Defines the record stored for each key, with TTL and access bookkeeping.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single cached record.
///
/// Entries are owned by the recency list; the index only holds a handle.
#[derive(Debug, Clone)]
pub struct Entry<K, V> {
    /// The key this entry is stored under
    pub key: K,
    /// The stored value
    pub value: V,
    /// When the entry was first inserted
    pub created_at: Instant,
    /// When the entry was last read or updated
    pub last_accessed: Instant,
    /// Absolute expiry, None = never expires
    pub expires_at: Option<Instant>,
    /// Number of accesses, starting at 1 on insert
    pub frequency: u64,
}

impl<K, V> Entry<K, V> {
    // == Constructor ==
    /// Creates a new entry with an optional TTL measured from now.
    ///
    /// A TTL too large to represent as an `Instant` never expires.
    pub fn new(key: K, value: V, ttl: Option<Duration>) -> Self {
        let now = Instant::now();
        Self {
            key,
            value,
            created_at: now,
            last_accessed: now,
            expires_at: ttl.and_then(|ttl| now.checked_add(ttl)),
            frequency: 1,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is greater than or equal
    /// to its expiry, so a zero TTL expires immediately.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Same as [`Entry::is_expired`] against a caller-supplied clock reading.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, or None if the entry never expires.
    ///
    /// Returns `Some(Duration::ZERO)` once the entry has expired.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(Instant::now()))
    }

    // == Touch ==
    /// Records a read: bumps the frequency and the access time.
    pub fn touch(&mut self) {
        self.frequency += 1;
        self.last_accessed = Instant::now();
    }

    // == Refresh ==
    /// Replaces the value and restarts the TTL clock; counts as an access.
    pub fn refresh(&mut self, value: V, ttl: Option<Duration>) {
        self.value = value;
        self.touch();
        self.expires_at = ttl.and_then(|ttl| self.last_accessed.checked_add(ttl));
    }
}

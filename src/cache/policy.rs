//! Eviction Policy Module
//!
//! Decides which entry leaves the cache when it is full.
//!
//! The cache drives a policy through four hooks (`on_insert`, `on_access`,
//! `on_remove`, `select_victim`); swapping policies changes only which
//! handle `select_victim` returns.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::list::{Handle, RecencyList, RecencyOrder};
use crate::error::CacheError;

// == Policy Kind ==
/// Built-in eviction policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Least recently used
    #[default]
    Lru,
    /// Least frequently used, ties broken by recency
    Lfu,
}

impl PolicyKind {
    /// Creates a fresh policy instance of this kind.
    pub fn build(self) -> Box<dyn EvictionPolicy> {
        match self {
            PolicyKind::Lru => Box::new(LruPolicy),
            PolicyKind::Lfu => Box::new(LfuPolicy::new()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Lru => "lru",
            PolicyKind::Lfu => "lfu",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(PolicyKind::Lru),
            "lfu" => Ok(PolicyKind::Lfu),
            other => Err(CacheError::InvalidConfig(format!(
                "unknown eviction policy '{}', expected 'lru' or 'lfu'",
                other
            ))),
        }
    }
}

// == Eviction Policy ==
/// Victim selection strategy plugged into a cache.
pub trait EvictionPolicy: fmt::Debug + Send {
    fn kind(&self) -> PolicyKind;

    /// A new node was pushed to the front of the recency list.
    fn on_insert(&mut self, handle: Handle);

    /// An existing node was read or updated.
    fn on_access(&mut self, handle: Handle);

    /// A node is about to leave the recency list; its handle may be reused.
    fn on_remove(&mut self, handle: Handle);

    /// Picks the node to evict, or None if nothing is tracked.
    fn select_victim(&self, order: &dyn RecencyOrder) -> Option<Handle>;

    /// Number of handles the policy is tracking, None if it keeps no
    /// per-entry state.
    fn tracked(&self) -> Option<usize>;

    fn clear(&mut self);
}

// == LRU ==
/// Evicts the least recently used entry. The recency list already holds
/// the order, so there is no state here.
#[derive(Debug, Default, Clone, Copy)]
pub struct LruPolicy;

impl EvictionPolicy for LruPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Lru
    }

    fn on_insert(&mut self, _handle: Handle) {}

    fn on_access(&mut self, _handle: Handle) {}

    fn on_remove(&mut self, _handle: Handle) {}

    fn select_victim(&self, order: &dyn RecencyOrder) -> Option<Handle> {
        order.least_recent()
    }

    fn tracked(&self) -> Option<usize> {
        None
    }

    fn clear(&mut self) {}
}

// == LFU ==
/// Evicts the entry with the lowest access count.
///
/// Each frequency level owns a recency list of cache handles. A touched
/// handle moves to the front of the next level, so the back of the lowest
/// level is the least recently promoted entry among the least frequent.
#[derive(Debug, Default)]
pub struct LfuPolicy {
    buckets: HashMap<u64, RecencyList<Handle>>,
    positions: HashMap<Handle, (u64, Handle)>,
    min_freq: u64,
}

impl LfuPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current access count recorded for `handle`.
    pub fn frequency(&self, handle: Handle) -> Option<u64> {
        self.positions.get(&handle).map(|(freq, _)| *freq)
    }

    fn place(&mut self, handle: Handle, freq: u64) {
        let slot = self.buckets.entry(freq).or_default().push_front(handle);
        self.positions.insert(handle, (freq, slot));
    }

    /// Unlinks `handle` from its bucket, dropping the bucket if it empties.
    /// Returns the frequency it had and whether its bucket was emptied.
    fn unlink(&mut self, handle: Handle) -> Option<(u64, bool)> {
        let (freq, slot) = self.positions.remove(&handle)?;
        let emptied = match self.buckets.get_mut(&freq) {
            Some(bucket) => {
                bucket.remove(slot);
                bucket.is_empty()
            }
            None => false,
        };
        if emptied {
            self.buckets.remove(&freq);
        }
        Some((freq, emptied))
    }
}

impl EvictionPolicy for LfuPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Lfu
    }

    fn on_insert(&mut self, handle: Handle) {
        self.unlink(handle);
        self.place(handle, 1);
        self.min_freq = 1;
    }

    fn on_access(&mut self, handle: Handle) {
        let Some((freq, emptied)) = self.unlink(handle) else {
            return;
        };
        if emptied && freq == self.min_freq {
            self.min_freq = freq + 1;
        }
        self.place(handle, freq + 1);
    }

    fn on_remove(&mut self, handle: Handle) {
        if let Some((freq, true)) = self.unlink(handle) {
            if freq == self.min_freq {
                // Bounded by the number of distinct frequency levels.
                self.min_freq = self.buckets.keys().copied().min().unwrap_or(0);
            }
        }
    }

    fn select_victim(&self, _order: &dyn RecencyOrder) -> Option<Handle> {
        self.buckets
            .get(&self.min_freq)
            .and_then(|bucket| bucket.peek_back())
            .map(|(_, handle)| *handle)
    }

    fn tracked(&self) -> Option<usize> {
        Some(self.positions.len())
    }

    fn clear(&mut self) {
        self.buckets.clear();
        self.positions.clear();
        self.min_freq = 0;
    }
}

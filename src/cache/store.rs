//! Cache Store Module
//!
//! Main cache engine: a hash index of handles into a recency list, with a
//! pluggable eviction policy and lazy TTL expiration.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::cache::{CacheStats, Entry, EvictionPolicy, Handle, PolicyKind, RecencyList};
use crate::config::{validate_capacity, Config};
use crate::error::Result;

/// Upper bound on slots reserved at construction; larger caches grow on demand.
const PREALLOCATE_LIMIT: usize = 1024;

// == Cache Options ==
/// Optional construction parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheOptions {
    /// Eviction policy, LRU by default
    pub policy: PolicyKind,
    /// TTL applied to puts that do not give one
    pub default_ttl: Option<Duration>,
}

impl CacheOptions {
    pub fn policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }
}

// == Cache ==
/// Fixed-capacity key-value cache.
///
/// Not synchronized; wrap it in a [`SharedCache`](crate::cache::SharedCache)
/// to use it from several threads.
///
/// Every key in `index` maps to exactly one live node in `order`, and every
/// node is reachable from exactly one key. All mutating methods restore this
/// before returning.
#[derive(Debug)]
pub struct Cache<K, V> {
    /// Key to node handle
    index: HashMap<K, Handle>,
    /// Entries, most recently used first
    order: RecencyList<Entry<K, V>>,
    /// Victim selection
    policy: Box<dyn EvictionPolicy>,
    /// Usage counters
    stats: CacheStats,
    /// Maximum number of entries, fixed at construction
    capacity: usize,
    /// TTL for puts that give none
    default_ttl: Option<Duration>,
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructors ==
    /// Creates an LRU cache without a default TTL.
    ///
    /// A capacity of 0 is allowed: nothing is ever stored.
    pub fn new(capacity: usize) -> Self {
        Self::with_options(capacity, CacheOptions::default())
    }

    pub fn with_options(capacity: usize, options: CacheOptions) -> Self {
        Self::with_policy(capacity, options.policy.build(), options.default_ttl)
    }

    /// Creates a cache driven by a caller-supplied policy.
    pub fn with_policy(
        capacity: usize,
        policy: Box<dyn EvictionPolicy>,
        default_ttl: Option<Duration>,
    ) -> Self {
        Self {
            index: HashMap::with_capacity(capacity.min(PREALLOCATE_LIMIT)),
            order: RecencyList::with_capacity(capacity.min(PREALLOCATE_LIMIT)),
            policy,
            stats: CacheStats::new(),
            capacity,
            default_ttl,
        }
    }

    /// Creates a cache from a signed capacity.
    ///
    /// Returns `CacheError::InvalidCapacity` if `capacity` is negative.
    pub fn try_new(capacity: i64, options: CacheOptions) -> Result<Self> {
        Ok(Self::with_options(validate_capacity(capacity)?, options))
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_options(
            config.capacity,
            CacheOptions {
                policy: config.policy,
                default_ttl: config.default_ttl,
            },
        )
    }

    // == Get ==
    /// Retrieves a live value and marks it most recently used.
    ///
    /// A missing key counts as a miss. An expired entry is removed and
    /// counts as both a miss and an expiration.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(&handle) = self.index.get(key) else {
            self.stats.record_miss();
            return None;
        };

        let live = self
            .order
            .get(handle)
            .is_some_and(|entry| !entry.is_expired());
        if !live {
            if self.unlink(handle).is_none() {
                self.index.remove(key);
            }
            self.stats.record_expired_lookup();
            debug!(
                expirations = self.stats.expirations,
                "removed expired entry on access"
            );
            return None;
        }

        self.order.move_to_front(handle);
        self.policy.on_access(handle);
        self.stats.record_hit();
        self.order.get_mut(handle).map(|entry| {
            entry.touch();
            &entry.value
        })
    }

    // == Put ==
    /// Stores a value, using the default TTL if one is configured.
    pub fn put(&mut self, key: K, value: V) {
        self.insert(key, value, None);
    }

    /// Stores a value that expires `ttl` from now.
    pub fn put_with_ttl(&mut self, key: K, value: V, ttl: Duration) {
        self.insert(key, value, Some(ttl));
    }

    /// Updates in place if `key` exists, otherwise inserts, evicting the
    /// policy's victim first when the cache is full.
    fn insert(&mut self, key: K, value: V, ttl: Option<Duration>) {
        if self.capacity == 0 {
            return;
        }
        let ttl = ttl.or(self.default_ttl);

        if let Some(&handle) = self.index.get(&key) {
            if let Some(entry) = self.order.get_mut(handle) {
                entry.refresh(value, ttl);
            }
            self.order.move_to_front(handle);
            self.policy.on_access(handle);
            return;
        }

        if self.index.len() >= self.capacity {
            let evicted = self.evict_one();
            debug_assert!(evicted, "full cache produced no eviction victim");
            if !evicted {
                return;
            }
        }

        let handle = self.order.push_front(Entry::new(key.clone(), value, ttl));
        self.policy.on_insert(handle);
        self.index.insert(key, handle);
        debug_assert_eq!(self.index.len(), self.order.len());
    }

    // == Get Or Insert ==
    /// Memoized lookup: returns the live value for `key`, or computes it
    /// with `f`, stores it and returns it. Counts as one `get`.
    pub fn get_or_insert_with<F>(&mut self, key: K, f: F) -> V
    where
        V: Clone,
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key) {
            return value.clone();
        }
        let value = f();
        self.put(key, value.clone());
        value
    }

    // == Delete ==
    /// Removes `key`; returns `false` if it was not present.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(&handle) = self.index.get(key) else {
            return false;
        };
        self.unlink(handle);
        self.stats.record_deletion();
        true
    }

    // == Contains ==
    /// Checks for a live entry without touching counters or recency.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.peek(key).is_some()
    }

    /// Reads a live value without touching counters or recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index
            .get(key)
            .and_then(|handle| self.order.get(*handle))
            .filter(|entry| !entry.is_expired())
            .map(|entry| &entry.value)
    }

    // == Cleanup Expired ==
    /// Removes every expired entry and returns how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired: Vec<Handle> = self
            .order
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(handle, _)| handle)
            .collect();

        for handle in &expired {
            self.unlink(*handle);
        }
        self.stats.record_expirations(expired.len() as u64);
        expired.len()
    }

    /// Removes every entry. Counters are left alone.
    pub fn clear(&mut self) {
        self.index.clear();
        self.order.clear();
        self.policy.clear();
    }

    // == Accessors ==
    /// Number of stored entries, including expired ones not yet discovered.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> PolicyKind {
        self.policy.kind()
    }

    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }

    /// Entries from most to least recently used.
    pub fn entries(&self) -> impl Iterator<Item = &Entry<K, V>> + '_ {
        self.order.iter().map(|(_, entry)| entry)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.len(),
            capacity: self.capacity,
            ..self.stats
        }
    }

    /// Zeroes all counters.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Panics if the index and the recency list have diverged.
    pub fn debug_validate_invariants(&self) {
        self.order.debug_validate_invariants();
        assert_eq!(self.index.len(), self.order.len(), "index/list size mismatch");
        assert!(self.len() <= self.capacity, "cache over capacity");
        for (key, handle) in &self.index {
            let entry = self
                .order
                .get(*handle)
                .unwrap_or_else(|| panic!("index handle {} is vacant", handle.index()));
            assert!(entry.key == *key, "handle {} holds another key", handle.index());
        }
        if let Some(tracked) = self.policy.tracked() {
            assert_eq!(tracked, self.len(), "policy bookkeeping out of step");
        }
    }

    /// Removes a node from the policy, the list and the index.
    fn unlink(&mut self, handle: Handle) -> Option<Entry<K, V>> {
        self.policy.on_remove(handle);
        let entry = self.order.remove(handle);
        debug_assert!(entry.is_some(), "unlinking a vacant handle");
        if let Some(entry) = &entry {
            self.index.remove(&entry.key);
        }
        entry
    }

    /// Evicts the policy's victim; returns `false` if there was none.
    fn evict_one(&mut self) -> bool {
        let Some(victim) = self.policy.select_victim(&self.order) else {
            return false;
        };
        if self.unlink(victim).is_none() {
            return false;
        }
        self.stats.record_eviction();
        debug!(
            policy = %self.policy.kind(),
            evictions = self.stats.evictions,
            "evicted entry to make room"
        );
        true
    }
}

// == Display ==
impl<K, V> fmt::Display for Cache<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cache(policy={}, capacity={}, size={}, [",
            self.policy.kind(),
            self.capacity,
            self.index.len()
        )?;
        for (i, (_, entry)) in self.order.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:?} => {:?}", entry.key, entry.value)?;
        }
        f.write_str("])")
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::LfuPolicy;
    use crate::error::CacheError;
    use std::thread::sleep;

    fn keys(cache: &Cache<&'static str, i32>) -> Vec<&'static str> {
        cache.entries().map(|entry| entry.key).collect()
    }

    #[test]
    fn test_cache_new() {
        let cache: Cache<String, String> = Cache::new(100);
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 100);
        assert_eq!(cache.policy(), PolicyKind::Lru);
        assert!(cache.default_ttl().is_none());
    }

    #[test]
    fn test_cache_put_and_get() {
        let mut cache = Cache::new(3);
        cache.put("a", 1);
        assert_eq!(cache.get("a"), Some(&1));
        assert_eq!(cache.len(), 1);
        cache.debug_validate_invariants();
    }

    #[test]
    fn test_cache_get_with_borrowed_key() {
        let mut cache: Cache<String, i32> = Cache::new(3);
        cache.put("a".to_string(), 1);
        assert_eq!(cache.get("a"), Some(&1));
        assert!(cache.contains("a"));
        assert!(cache.delete("a"));
    }

    #[test]
    fn test_cache_get_nonexistent() {
        let mut cache: Cache<&str, i32> = Cache::new(3);
        assert_eq!(cache.get("missing"), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_cache_update_existing_key() {
        let mut cache = Cache::new(3);
        cache.put("a", 1);
        cache.put("a", 2);

        assert_eq!(cache.get("a"), Some(&2));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().evictions, 0);
        cache.debug_validate_invariants();
    }

    #[test]
    fn test_cache_delete() {
        let mut cache = Cache::new(3);
        cache.put("a", 1);

        assert!(cache.delete("a"));
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.stats().deletions, 1);
        cache.debug_validate_invariants();
    }

    #[test]
    fn test_cache_delete_nonexistent() {
        let mut cache = Cache::new(3);
        cache.put("a", 1);
        let before = cache.stats();

        assert!(!cache.delete("b"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats(), before);
    }

    #[test]
    fn test_cache_lru_eviction() {
        let mut cache = Cache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(&2));
        assert_eq!(cache.get("c"), Some(&3));
        assert_eq!(cache.stats().evictions, 1);
        cache.debug_validate_invariants();
    }

    #[test]
    fn test_cache_get_prevents_eviction() {
        let mut cache = Cache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.get("a");
        cache.put("c", 3);

        assert_eq!(cache.get("a"), Some(&1));
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("c"), Some(&3));
    }

    #[test]
    fn test_cache_put_update_prevents_eviction() {
        let mut cache = Cache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("a", 10);
        cache.put("c", 3);

        assert_eq!(cache.get("a"), Some(&10));
        assert_eq!(cache.get("b"), None);
    }

    #[test]
    fn test_cache_multiple_evictions() {
        let mut cache = Cache::new(1);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);

        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("c"), Some(&3));
        assert_eq!(cache.stats().evictions, 2);
    }

    #[test]
    fn test_cache_recency_order() {
        let mut cache = Cache::new(3);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);
        cache.get("a");
        assert_eq!(keys(&cache), vec!["a", "c", "b"]);

        cache.put("d", 4);
        assert_eq!(keys(&cache), vec!["d", "a", "c"]);

        cache.put("c", 30);
        assert_eq!(keys(&cache), vec!["c", "d", "a"]);
        cache.debug_validate_invariants();
    }

    #[test]
    fn test_cache_ttl_expiration() {
        let mut cache = Cache::new(3);
        cache.put_with_ttl("a", 1, Duration::from_millis(1));
        sleep(Duration::from_millis(10));

        assert_eq!(cache.get("a"), None);
        let stats = cache.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
        assert!(cache.is_empty());
        cache.debug_validate_invariants();
    }

    #[test]
    fn test_cache_default_ttl() {
        let options = CacheOptions::default().default_ttl(Duration::from_millis(1));
        let mut cache = Cache::with_options(3, options);
        cache.put("a", 1);
        cache.put_with_ttl("b", 2, Duration::from_secs(60));
        sleep(Duration::from_millis(10));

        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(&2));
    }

    #[test]
    fn test_cache_put_refreshes_ttl() {
        let mut cache = Cache::new(3);
        cache.put_with_ttl("a", 1, Duration::ZERO);
        cache.put("a", 2);
        assert_eq!(cache.get("a"), Some(&2));
    }

    #[test]
    fn test_cache_contains_and_peek_do_not_touch() {
        let mut cache = Cache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);

        assert!(cache.contains("a"));
        assert_eq!(cache.peek("a"), Some(&1));
        assert!(!cache.contains("z"));
        assert_eq!(cache.stats().lookups(), 0);

        // "a" was not refreshed, so it is still the victim.
        cache.put("c", 3);
        assert!(!cache.contains("a"));
    }

    #[test]
    fn test_cache_contains_expired() {
        let mut cache = Cache::new(2);
        cache.put_with_ttl("a", 1, Duration::ZERO);
        assert!(!cache.contains("a"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_capacity_zero() {
        let mut cache = Cache::new(0);
        cache.put("a", 1);

        assert_eq!(cache.len(), 0);
        assert_eq!(cache.get("a"), None);
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 0);
    }

    #[test]
    fn test_cache_try_new() {
        let cache: Cache<u32, u32> = Cache::try_new(4, CacheOptions::default()).unwrap();
        assert_eq!(cache.capacity(), 4);

        let result: Result<Cache<u32, u32>> = Cache::try_new(-1, CacheOptions::default());
        assert!(matches!(result, Err(CacheError::InvalidCapacity(-1))));
    }

    #[test]
    fn test_cache_from_config() {
        let config = Config {
            capacity: 8,
            policy: PolicyKind::Lfu,
            default_ttl: Some(Duration::from_secs(5)),
            sweep_interval: None,
        };
        let cache: Cache<u32, u32> = Cache::from_config(&config);
        assert_eq!(cache.capacity(), 8);
        assert_eq!(cache.policy(), PolicyKind::Lfu);
        assert_eq!(cache.default_ttl(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_cache_lfu_evicts_least_frequent() {
        let mut cache = Cache::with_options(3, CacheOptions::default().policy(PolicyKind::Lfu));
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);
        cache.get("a");
        cache.get("a");
        cache.get("b");
        // "c" is least frequent even though it is not least recent.
        cache.put("d", 4);

        assert!(!cache.contains("c"));
        assert!(cache.contains("a"));
        assert!(cache.contains("b"));
        cache.debug_validate_invariants();
    }

    #[test]
    fn test_cache_custom_policy() {
        let mut cache = Cache::with_policy(2, Box::new(LfuPolicy::new()), None);
        cache.put(1, "one");
        cache.put(2, "two");
        cache.get(&2);
        cache.put(3, "three");

        assert!(!cache.contains(&1));
        assert_eq!(cache.policy(), PolicyKind::Lfu);
    }

    #[test]
    fn test_cache_entry_frequency() {
        let mut cache = Cache::new(2);
        cache.put("a", 1);
        cache.get("a");
        cache.put("a", 2);
        let entry = cache.entries().next().unwrap();
        assert_eq!(entry.frequency, 3);
    }

    #[test]
    fn test_cache_get_or_insert_with() {
        let mut cache = Cache::new(2);
        let mut calls = 0;

        let first = cache.get_or_insert_with("a", || {
            calls += 1;
            10
        });
        let second = cache.get_or_insert_with("a", || {
            calls += 1;
            20
        });

        assert_eq!((first, second), (10, 10));
        assert_eq!(calls, 1);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));
    }

    #[test]
    fn test_cache_purge_expired() {
        let mut cache = Cache::new(4);
        cache.put_with_ttl("a", 1, Duration::from_millis(1));
        cache.put_with_ttl("b", 2, Duration::from_secs(60));
        cache.put("c", 3);
        sleep(Duration::from_millis(10));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().expirations, 1);
        assert_eq!(cache.stats().misses, 0);
        cache.debug_validate_invariants();
    }

    #[test]
    fn test_cache_clear_keeps_counters() {
        let mut cache = Cache::with_options(3, CacheOptions::default().policy(PolicyKind::Lfu));
        cache.put("a", 1);
        cache.get("a");
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.stats().hits, 1);
        cache.debug_validate_invariants();
        cache.put("b", 2);
        assert_eq!(cache.get("b"), Some(&2));
    }

    #[test]
    fn test_cache_stats() {
        let mut cache = Cache::new(10);
        cache.put("a", 1);
        cache.get("a");
        cache.get("nonexistent");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.capacity, 10);
        assert_eq!(stats.hit_rate(), 0.5);

        cache.reset_stats();
        let stats = cache.stats();
        assert_eq!(stats.lookups(), 0);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_cache_display() {
        let mut cache = Cache::new(3);
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(
            cache.to_string(),
            "Cache(policy=lru, capacity=3, size=2, [\"b\" => 2, \"a\" => 1])"
        );
    }

    #[test]
    fn test_cache_huge_capacity_grows_on_demand() {
        let mut cache: Cache<u32, u32> =
            Cache::try_new(i64::MAX, CacheOptions::default()).unwrap();
        assert_eq!(cache.capacity(), i64::MAX as usize);

        for i in 0..2000 {
            cache.put(i, i * 2);
        }
        assert_eq!(cache.len(), 2000);
        assert_eq!(cache.get(&1999), Some(&3998));
        assert_eq!(cache.stats().evictions, 0);
        cache.debug_validate_invariants();
    }

    #[test]
    fn test_cache_huge_ttl_never_expires() {
        let mut cache = Cache::new(2);
        cache.put_with_ttl("a", 1, Duration::MAX);
        assert_eq!(cache.get("a"), Some(&1));

        let options = CacheOptions::default().default_ttl(Duration::MAX);
        let mut cache = Cache::with_options(2, options);
        cache.put("b", 2);
        cache.put("b", 3);
        assert_eq!(cache.get("b"), Some(&3));
        assert_eq!(cache.purge_expired(), 0);
        assert_eq!(cache.stats().expirations, 0);
    }
}

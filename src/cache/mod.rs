//! Cache Module
//!
//! Provides a fixed-capacity in-memory cache with LRU/LFU eviction and
//! TTL expiration.

mod entry;
mod list;
mod policy;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use entry::Entry;
pub use list::{Handle, Iter, RecencyList, RecencyOrder};
pub use policy::{EvictionPolicy, LfuPolicy, LruPolicy, PolicyKind};
pub use shared::SharedCache;
pub use stats::CacheStats;
pub use store::{Cache, CacheOptions};

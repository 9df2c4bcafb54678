//! LRU TTL Cache - a fixed-capacity in-process cache
//!
//! Provides O(1) get/put/delete with LRU (or LFU) eviction, optional
//! per-entry TTL expiration, usage statistics and a thread-safe handle.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use cache::{Cache, CacheOptions, CacheStats, PolicyKind, SharedCache};
pub use config::Config;
pub use error::{CacheError, Result};
pub use models::StatsReport;
pub use tasks::{spawn_sweeper, SweeperHandle};

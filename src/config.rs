//! Configuration Module
//!
//! Loads cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::PolicyKind;
use crate::error::{CacheError, Result};

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// Eviction policy
    pub policy: PolicyKind,
    /// TTL applied to puts that give none, None = entries never expire
    pub default_ttl: Option<Duration>,
    /// Interval of the background sweeper, None = sweeper disabled
    pub sweep_interval: Option<Duration>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 1000)
    /// - `CACHE_POLICY` - `lru` or `lfu` (default: lru)
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 0, none)
    /// - `CACHE_SWEEP_INTERVAL_MS` - Sweeper interval in milliseconds (default: 0, off)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Config::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let capacity = match lookup("CACHE_CAPACITY") {
            Some(raw) => parse_capacity(&raw)?,
            None => defaults.capacity,
        };

        let policy = match lookup("CACHE_POLICY") {
            Some(raw) => raw.parse()?,
            None => defaults.policy,
        };

        Ok(Self {
            capacity,
            policy,
            default_ttl: parse_millis(&lookup, "CACHE_DEFAULT_TTL_MS")?,
            sweep_interval: parse_millis(&lookup, "CACHE_SWEEP_INTERVAL_MS")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1000,
            policy: PolicyKind::Lru,
            default_ttl: None,
            sweep_interval: None,
        }
    }
}

/// Validates a signed capacity, rejecting negative values.
pub fn validate_capacity(capacity: i64) -> Result<usize> {
    usize::try_from(capacity).map_err(|_| CacheError::InvalidCapacity(capacity))
}

fn parse_capacity(raw: &str) -> Result<usize> {
    let value: i64 = raw.trim().parse().map_err(|_| {
        CacheError::InvalidConfig(format!("CACHE_CAPACITY is not an integer: '{}'", raw))
    })?;
    validate_capacity(value)
}

/// Reads a millisecond duration; unset or zero means "not configured".
fn parse_millis<F>(lookup: &F, name: &str) -> Result<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let millis: u64 = raw.trim().parse().map_err(|_| {
        CacheError::InvalidConfig(format!("{} is not a millisecond count: '{}'", name, raw))
    })?;
    Ok((millis > 0).then(|| Duration::from_millis(millis)))
}

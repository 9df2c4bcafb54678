//! Error types for the cache
//!
//! Provides unified error handling using thiserror. A missing or expired
//! key is not an error; lookups report it through `Option`/`bool`.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Capacity was negative at construction
    #[error("Invalid capacity: {0} (must be zero or positive)")]
    InvalidCapacity(i64),

    /// A configuration value could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CacheError::InvalidCapacity(-3).to_string(),
            "Invalid capacity: -3 (must be zero or positive)"
        );
        assert!(CacheError::InvalidConfig("CACHE_POLICY".to_string())
            .to_string()
            .contains("CACHE_POLICY"));
    }
}

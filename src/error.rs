//! Error types for the cache
//!
//! Cache operations themselves never fail; these errors only cover setup.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache construction and configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A configuration value could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A cost limit of zero was requested
    #[error("Invalid limit: {0} (limit must be positive)")]
    InvalidLimit(usize),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

//! Configuration Module
//!
//! Construction-time options for a cache, loadable from environment variables.

use std::env;

use crate::error::{CacheError, Result};

/// Environment variable holding the cost limit.
pub const ENV_LIMIT: &str = "CACHE_LIMIT";

/// Environment variable holding the evict-on-background flag.
pub const ENV_EVICT_ON_BACKGROUND: &str = "CACHE_EVICT_ON_BACKGROUND";

/// Cache configuration parameters.
///
/// The cost function is not part of the options; it is handed to the
/// constructor separately since it cannot come from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheOptions {
    /// Clear the cache when the host enters the background
    pub evict_on_background: bool,
    /// Maximum total cost, None = unlimited
    pub limit: Option<usize>,
}

impl CacheOptions {
    /// Creates options with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum total cost.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets whether a background transition clears the cache.
    pub fn with_evict_on_background(mut self, evict: bool) -> Self {
        self.evict_on_background = evict;
        self
    }

    /// Returns the effective capacity of the store.
    pub fn capacity(&self) -> usize {
        self.limit.unwrap_or(usize::MAX)
    }

    /// Checks that the options describe a usable cache.
    pub fn validate(&self) -> Result<()> {
        match self.limit {
            Some(0) => Err(CacheError::InvalidLimit(0)),
            _ => Ok(()),
        }
    }

    /// Creates options by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_LIMIT` - Maximum total cost (default: unlimited)
    /// - `CACHE_EVICT_ON_BACKGROUND` - `true`/`false`/`1`/`0` (default: true)
    ///
    /// Unset variables fall back to defaults; malformed ones are an error.
    pub fn from_env() -> Result<Self> {
        let mut options = Self::default();

        if let Ok(raw) = env::var(ENV_LIMIT) {
            let limit = raw.trim().parse::<usize>().map_err(|_| {
                CacheError::InvalidConfig(format!("{}={}", ENV_LIMIT, raw))
            })?;
            options.limit = Some(limit);
        }

        if let Ok(raw) = env::var(ENV_EVICT_ON_BACKGROUND) {
            options.evict_on_background = parse_bool(&raw).ok_or_else(|| {
                CacheError::InvalidConfig(format!("{}={}", ENV_EVICT_ON_BACKGROUND, raw))
            })?;
        }

        options.validate()?;
        Ok(options)
    }
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            evict_on_background: true,
            limit: None,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

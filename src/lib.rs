//! Lifecycle Cache - a cost-bounded in-memory LRU cache
//!
//! Entries are weighed by an optional cost function and evicted least
//! recently used first once their total cost exceeds the configured limit.
//! Caches subscribe to host lifecycle signals and clear themselves on memory
//! pressure, and on background transitions unless configured otherwise.

pub mod cache;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod tasks;

pub use cache::{Cache, CacheGuard, CacheStats};
pub use config::CacheOptions;
pub use error::{CacheError, Result};
pub use lifecycle::{LifecycleEvent, NotificationCenter};

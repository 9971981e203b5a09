//! Cache Module
//!
//! Provides the cost-bounded LRU cache: the bounded store, the manager that
//! applies lifecycle signals to it, and the locking facade.

mod entry;
mod handle;
mod lru;
mod manager;
mod stats;
mod store;


// Re-export public types
pub use handle::{Cache, CacheGuard};
pub use manager::CacheManager;
pub use stats::CacheStats;
pub use store::{BoundedStore, CostFn};

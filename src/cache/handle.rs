//! Cache Facade Module
//!
//! The caller-facing cache: one mutex around one manager, plus an RAII guard
//! for grouping several operations into one critical section.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::cache::manager::{CacheCallbacks, CacheManager};
use crate::cache::store::CostFn;
use crate::cache::CacheStats;
use crate::config::CacheOptions;
use crate::error::Result;
use crate::lifecycle::{self, LifecycleEvent, LifecycleRegistry, Subscription};

// == Cache ==
/// A cost-bounded LRU cache that clears itself on lifecycle signals.
///
/// Every operation takes the cache's lock for its duration, and lifecycle
/// clears take the same lock, so single operations never interleave.
/// Clones share the same underlying cache; the lifecycle registration is
/// released when the last clone drops.
///
/// # Example
/// ```
/// use lifecycle_cache::{Cache, CacheOptions};
///
/// let cache: Cache<String, Vec<u8>> =
///     Cache::with_cost(CacheOptions::new().with_limit(1024), |v: &Vec<u8>| v.len()).unwrap();
///
/// cache.insert("avatar".to_string(), vec![0; 512]);
/// assert!(cache.get("avatar").is_some());
///
/// cache.put("avatar".to_string(), None);
/// assert!(cache.get("avatar").is_none());
/// ```
pub struct Cache<K, V> {
    inner: Arc<Mutex<CacheManager<K, V>>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + 'static,
{
    // == Constructors ==
    /// Creates a cache where every entry costs 1, subscribed to the global
    /// notification center.
    pub fn new(options: CacheOptions) -> Result<Self> {
        Self::with_registry(options, None, lifecycle::global())
    }

    /// Creates a cache whose entries are weighed by `cost`, subscribed to the
    /// global notification center.
    pub fn with_cost<F>(options: CacheOptions, cost: F) -> Result<Self>
    where
        F: Fn(&V) -> usize + Send + Sync + 'static,
    {
        Self::with_registry(options, Some(Arc::new(cost)), lifecycle::global())
    }

    /// Creates a cache subscribed to `registry` instead of the global center.
    pub fn with_registry(
        options: CacheOptions,
        cost: Option<CostFn<V>>,
        registry: Arc<dyn LifecycleRegistry>,
    ) -> Result<Self> {
        options.validate()?;
        Ok(Self::assemble(&options, cost, registry))
    }

    /// Creates an unlimited cache with default options.
    pub fn unbounded() -> Self {
        Self::assemble(&CacheOptions::default(), None, lifecycle::global())
    }

    fn assemble(
        options: &CacheOptions,
        cost: Option<CostFn<V>>,
        registry: Arc<dyn LifecycleRegistry>,
    ) -> Self {
        let inner = Arc::new(Mutex::new(CacheManager::new(options, cost)));
        let callbacks = Arc::new(CacheCallbacks::new(Arc::downgrade(&inner)));
        let subscription = Subscription::new(registry, callbacks);

        let cache = Self { inner };
        cache.lock().manager.attach_subscription(subscription);
        cache
    }

    // == Lock ==
    /// Locks the cache for a sequence of operations.
    ///
    /// The lock is released when the guard is dropped or
    /// [`CacheGuard::unlock`]ed, so early returns and panics release it too.
    /// Calling any method on this cache (or a clone) from the same thread
    /// while holding the guard deadlocks.
    pub fn lock(&self) -> CacheGuard<'_, K, V> {
        CacheGuard {
            manager: self.inner.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    // == Put ==
    /// Stores `value` for `key`; `None` removes the key.
    pub fn put(&self, key: K, value: Option<V>) {
        self.lock().put(key, value);
    }

    /// Stores `value` for `key`.
    pub fn insert(&self, key: K, value: V) {
        self.lock().insert(key, value);
    }

    /// Removes `key`, returning its value if it was present.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().remove(key)
    }

    // == Clear ==
    /// Evicts all entries.
    pub fn clear(&self) {
        self.lock().clear();
    }

    // == Simulate Event ==
    /// Applies a lifecycle event to this cache only, through the same locked
    /// path a registry delivery takes. Returns the number of entries dropped.
    pub fn simulate_event(&self, event: LifecycleEvent) -> usize {
        self.lock().manager.handle_event(event)
    }

    // == Resize ==
    /// Changes the cost limit, trimming immediately if it shrank.
    pub fn resize(&self, limit: usize) {
        self.lock().manager.store_mut().resize(limit);
    }

    // == Accessors ==
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_cost(&self) -> usize {
        self.lock().total_cost()
    }

    pub fn capacity(&self) -> usize {
        self.lock().manager.store().capacity()
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().manager.stats()
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    // == Get ==
    /// Returns a clone of the value for `key`, marking it most recently used.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().get(key).cloned()
    }

    // == Get Or Insert ==
    /// Returns the cached value for `key`, or computes, stores and returns it.
    /// The lookup and the insert happen under one lock.
    ///
    /// The returned value is the computed one even if the insert evicted it
    /// straight away for being larger than the limit.
    pub fn get_or_insert_with<F>(&self, key: K, make: F) -> V
    where
        F: FnOnce() -> V,
    {
        let mut guard = self.lock();
        if let Some(value) = guard.get(&key) {
            return value.clone();
        }
        let value = make();
        guard.insert(key, value.clone());
        value
    }
}

impl<K, V> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + 'static,
{
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<K, V> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish_non_exhaustive()
    }
}

// == Cache Guard ==
/// Exclusive access to a cache, held until dropped or unlocked.
pub struct CacheGuard<'a, K, V> {
    manager: MutexGuard<'a, CacheManager<K, V>>,
}

impl<K, V> CacheGuard<'_, K, V>
where
    K: Eq + Hash + Clone,
{
    /// Returns the value for `key`, marking it most recently used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.manager.get(key)
    }

    /// Returns the value for `key` without changing its recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.manager.store().peek(key)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.manager.store().contains(key)
    }

    /// Stores `value` for `key`; `None` removes the key.
    pub fn put(&mut self, key: K, value: Option<V>) {
        self.manager.put(key, value);
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.manager.put(key, Some(value));
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.manager.store_mut().remove(key)
    }

    pub fn clear(&mut self) {
        self.manager.clear();
    }

    pub fn len(&self) -> usize {
        self.manager.store().len()
    }

    pub fn is_empty(&self) -> bool {
        self.manager.store().is_empty()
    }

    pub fn total_cost(&self) -> usize {
        self.manager.store().total_cost()
    }

    /// Keys from least to most recently used.
    pub fn keys_lru(&self) -> Vec<K> {
        self.manager.store().keys_lru()
    }

    /// Releases the lock.
    pub fn unlock(self) {
        drop(self);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use crate::lifecycle::NotificationCenter;
    use std::thread;

    fn local_cache<V: Send + 'static>(
        options: CacheOptions,
    ) -> (Cache<String, V>, Arc<NotificationCenter>) {
        let center = Arc::new(NotificationCenter::new());
        let cache = Cache::with_registry(options, None, center.clone()).unwrap();
        (cache, center)
    }

    #[test]
    fn test_cache_put_and_get() {
        let (cache, _center) = local_cache(CacheOptions::default());

        cache.insert("key1".to_string(), "value1".to_string());

        assert_eq!(cache.get("key1"), Some("value1".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_put_none_deletes() {
        let (cache, _center) = local_cache(CacheOptions::default());

        cache.put("key1".to_string(), Some(1));
        cache.put("key1".to_string(), None);

        assert_eq!(cache.get("key1"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_remove() {
        let (cache, _center) = local_cache(CacheOptions::default());

        cache.insert("a".to_string(), 7);

        assert_eq!(cache.remove("a"), Some(7));
        assert_eq!(cache.remove("a"), None);
    }

    #[test]
    fn test_cache_clear() {
        let (cache, _center) = local_cache(CacheOptions::default());

        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.total_cost(), 0);
    }

    #[test]
    fn test_cache_rejects_zero_limit() {
        let center = Arc::new(NotificationCenter::new());
        let result: Result<Cache<String, u8>> =
            Cache::with_registry(CacheOptions::new().with_limit(0), None, center.clone());

        assert!(matches!(result, Err(CacheError::InvalidLimit(0))));
        assert_eq!(center.observer_count(), 0);
    }

    #[test]
    fn test_cache_registers_and_unregisters() {
        let (cache, center) = local_cache::<u32>(CacheOptions::default());
        assert_eq!(center.observer_count(), 1);
        assert!(cache.lock().manager.is_subscribed());

        let clone = cache.clone();
        drop(cache);
        assert_eq!(center.observer_count(), 1, "clone keeps the cache alive");

        drop(clone);
        assert_eq!(center.observer_count(), 0);
    }

    #[test]
    fn test_cache_guard_groups_operations() {
        let (cache, _center) = local_cache(CacheOptions::new().with_limit(3));

        {
            let mut guard = cache.lock();
            if guard.get("a").is_none() {
                guard.insert("a".to_string(), 1);
            }
            guard.insert("b".to_string(), 2);
            assert_eq!(guard.len(), 2);
            assert_eq!(guard.keys_lru(), vec!["a".to_string(), "b".to_string()]);
            guard.unlock();
        }

        assert_eq!(cache.get("a"), Some(1));
    }

    #[test]
    fn test_cache_guard_peek_and_contains() {
        let (cache, _center) = local_cache(CacheOptions::new().with_limit(2));

        let mut guard = cache.lock();
        guard.insert("a".to_string(), 1);
        guard.insert("b".to_string(), 2);

        assert_eq!(guard.peek("a"), Some(&1));
        assert!(guard.contains("b"));

        // peek left "a" as least recently used
        guard.insert("c".to_string(), 3);
        assert!(!guard.contains("a"));
        assert_eq!(guard.total_cost(), 2);
    }

    #[test]
    fn test_cache_lock_released_on_early_return() {
        let (cache, _center) = local_cache(CacheOptions::default());

        fn fails(cache: &Cache<String, u32>) -> std::result::Result<(), &'static str> {
            let mut guard = cache.lock();
            guard.insert("x".to_string(), 1);
            if guard.contains("x") {
                return Err("bail out while holding the guard");
            }
            guard.insert("y".to_string(), 2);
            Ok(())
        }

        assert!(fails(&cache).is_err());
        // Would deadlock if the guard had not been released
        assert_eq!(cache.get("x"), Some(1));
        assert_eq!(cache.get("y"), None);
    }

    #[test]
    fn test_cache_survives_poisoned_lock() {
        let (cache, _center) = local_cache(CacheOptions::default());
        cache.insert("a".to_string(), 1);

        let clone = cache.clone();
        let result = thread::spawn(move || {
            let _guard = clone.lock();
            panic!("panic while holding the cache lock");
        })
        .join();
        assert!(result.is_err());

        assert_eq!(cache.get("a"), Some(1));
    }

    #[test]
    fn test_get_or_insert_with() {
        let (cache, _center) = local_cache(CacheOptions::default());

        let first = cache.get_or_insert_with("k".to_string(), || 10);
        let second = cache.get_or_insert_with("k".to_string(), || 20);

        assert_eq!(first, 10);
        assert_eq!(second, 10);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_simulate_events() {
        let (cache, _center) = local_cache(CacheOptions::new().with_evict_on_background(false));
        cache.insert("a".to_string(), 1);

        assert_eq!(cache.simulate_event(LifecycleEvent::EnteringBackground), 0);
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.simulate_event(LifecycleEvent::MemoryPressure), 1);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().lifecycle_clears, 1);
    }

    #[test]
    fn test_posted_events_reach_cache() {
        let (cache, center) = local_cache(CacheOptions::default());
        cache.insert("a".to_string(), 1);

        assert_eq!(center.post(LifecycleEvent::EnteringBackground), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_resize_and_capacity() {
        let (cache, _center) = local_cache(CacheOptions::default());
        assert_eq!(cache.capacity(), usize::MAX);

        for i in 0..5 {
            cache.insert(i.to_string(), i);
        }
        cache.resize(2);

        assert_eq!(cache.capacity(), 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("4"), Some(4));
        assert_eq!(cache.stats().evictions, 3);
    }

    #[test]
    fn test_concurrent_access() {
        let (cache, _center) = local_cache(CacheOptions::new().with_limit(64));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for i in 0..200 {
                        let key = format!("{}-{}", t, i % 32);
                        cache.get_or_insert_with(key.clone(), || i);
                        cache.get(key.as_str());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.len() <= 64);
        assert!(cache.total_cost() <= 64);
    }
}

//! Bounded Store Module
//!
//! Cost-bounded key/value storage combining a HashMap index with an
//! arena-backed LRU list.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use tracing::debug;

use crate::cache::entry::CacheEntry;
use crate::cache::lru::LruList;
use crate::cache::CacheStats;

/// Caller-supplied cost function. Must be pure and must not block.
pub type CostFn<V> = Arc<dyn Fn(&V) -> usize + Send + Sync>;

// == Bounded Store ==
/// Key/value storage that keeps the sum of entry costs within a capacity,
/// evicting least recently used entries when a write exceeds it.
///
/// An entry whose cost alone exceeds the capacity is accepted and then
/// evicted by the same loop as everything else: since it is the most recently
/// used entry it goes last, so the store ends up empty.
pub struct BoundedStore<K, V> {
    /// Key to arena slot
    index: HashMap<K, usize>,
    /// Entries in recency order
    lru: LruList<K, V>,
    /// Maximum permitted total cost
    capacity: usize,
    /// Sum of the costs of all live entries. Wider than usize so a put can
    /// pass `usize::MAX` before the eviction loop runs.
    total_cost: u128,
    /// Cost function, None = every entry costs 1
    cost: Option<CostFn<V>>,
    /// Counters
    stats: CacheStats,
}

impl<K, V> BoundedStore<K, V>
where
    K: Eq + Hash + Clone,
{
    // == Constructors ==
    /// Creates a store where every entry costs 1, so `capacity` is a count.
    pub fn new(capacity: usize) -> Self {
        Self::build(capacity, None)
    }

    /// Creates a store whose entries are weighed by `cost`.
    pub fn with_cost<F>(capacity: usize, cost: F) -> Self
    where
        F: Fn(&V) -> usize + Send + Sync + 'static,
    {
        Self::build(capacity, Some(Arc::new(cost)))
    }

    /// Creates a store with an optional, already shared cost function.
    pub fn build(capacity: usize, cost: Option<CostFn<V>>) -> Self {
        Self {
            index: HashMap::new(),
            lru: LruList::new(),
            capacity,
            total_cost: 0,
            cost,
            stats: CacheStats::new(),
        }
    }

    // == Get ==
    /// Returns the value for `key` and marks it most recently used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.index.get(key).copied() {
            Some(idx) => {
                self.stats.record_hit();
                self.lru.touch(idx);
                self.lru.get(idx).map(|entry| &entry.value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Peek ==
    /// Returns the value for `key` without touching recency or counters.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.index.get(key)?;
        self.lru.get(idx).map(|entry| &entry.value)
    }

    // == Contains ==
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    // == Put ==
    /// Inserts or replaces the value for `key`, marks it most recently used,
    /// then evicts least recently used entries until the total cost fits.
    ///
    /// Returns the evicted pairs, oldest first. Replacing an existing value
    /// is not an eviction and the old value is not returned.
    pub fn put(&mut self, key: K, value: V) -> Vec<(K, V)> {
        let cost = self.size_of(&value);

        match self.index.get(&key).copied() {
            Some(idx) => {
                if let Some(entry) = self.lru.get_mut(idx) {
                    let (_, old_cost) = entry.replace(value, cost);
                    self.total_cost = self.total_cost - old_cost as u128 + cost as u128;
                }
                self.lru.touch(idx);
            }
            None => {
                let idx = self.lru.push_front(CacheEntry::new(key.clone(), value, cost));
                self.index.insert(key, idx);
                self.total_cost += cost as u128;
            }
        }

        self.trim_to(self.capacity)
    }

    // == Remove ==
    /// Removes the entry for `key`, if any, and returns its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.index.remove(key)?;
        let entry = self.lru.remove(idx)?;
        self.total_cost -= entry.cost as u128;
        Some(entry.value)
    }

    // == Evict All ==
    /// Empties the store unconditionally. Returns the number of entries dropped.
    pub fn evict_all(&mut self) -> usize {
        let dropped = self.lru.len();
        self.index.clear();
        self.lru.clear();
        self.total_cost = 0;
        dropped
    }

    /// Alias for [`BoundedStore::evict_all`].
    pub fn clear(&mut self) -> usize {
        self.evict_all()
    }

    // == Trim ==
    /// Evicts least recently used entries until the total cost is at most
    /// `target`. Returns the evicted pairs, oldest first.
    pub fn trim_to(&mut self, target: usize) -> Vec<(K, V)> {
        let mut evicted = Vec::new();

        while self.total_cost > target as u128 {
            let Some(entry) = self.lru.pop_oldest() else {
                break;
            };
            self.index.remove(&entry.key);
            self.total_cost -= entry.cost as u128;
            evicted.push((entry.key, entry.value));
        }

        if self.lru.is_empty() {
            self.total_cost = 0;
        }

        if !evicted.is_empty() {
            self.stats.record_evictions(evicted.len());
            debug!(
                "Evicted {} entries to fit cost budget {} (total cost now {})",
                evicted.len(),
                target,
                self.total_cost
            );
        }

        evicted
    }

    // == Resize ==
    /// Changes the capacity and trims immediately if it shrank.
    pub fn resize(&mut self, capacity: usize) -> Vec<(K, V)> {
        self.capacity = capacity;
        self.trim_to(capacity)
    }

    // == Size Of ==
    /// Cost of `value` under this store's cost function (1 if none).
    pub fn size_of(&self, value: &V) -> usize {
        match &self.cost {
            Some(cost) => cost(value),
            None => 1,
        }
    }

    // == Accessors ==
    pub fn len(&self) -> usize {
        self.lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lru.is_empty()
    }

    /// Sum of entry costs. Only a put still inside its eviction loop can
    /// exceed `usize::MAX`, so the clamp never shows after a mutation.
    pub fn total_cost(&self) -> usize {
        usize::try_from(self.total_cost).unwrap_or(usize::MAX)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Keys from least to most recently used.
    pub fn keys_lru(&self) -> Vec<K> {
        self.lru.iter_oldest_first().map(|entry| entry.key.clone()).collect()
    }

    // == Stats ==
    /// Returns current statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_occupancy(self.len(), self.total_cost());
        stats
    }

    /// Counts a lifecycle-driven clear. The clear itself is [`BoundedStore::evict_all`].
    pub(crate) fn record_lifecycle_clear(&mut self) {
        self.stats.record_lifecycle_clear();
    }
}

impl<K, V> fmt::Debug for BoundedStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedStore")
            .field("len", &self.lru.len())
            .field("capacity", &self.capacity)
            .field("total_cost", &self.total_cost)
            .field("weighted", &self.cost.is_some())
            .finish()
    }
}

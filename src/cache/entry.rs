//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with cost accounting.

// == Cache Entry ==
/// A single key/value association held by the bounded store.
///
/// Entries live in the recency list's arena; `prev` and `next` are slot
/// indices of the neighbouring entries (towards the most and least recently
/// used ends respectively).
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry<K, V> {
    /// The key, duplicated here so eviction can drop the map slot
    pub key: K,
    /// The stored value
    pub value: V,
    /// Cost assigned by the store's cost function when last written
    pub cost: usize,
    /// More recently used neighbour
    pub prev: Option<usize>,
    /// Less recently used neighbour
    pub next: Option<usize>,
}

impl<K, V> CacheEntry<K, V> {
    // == Constructor ==
    /// Creates an unlinked entry.
    pub fn new(key: K, value: V, cost: usize) -> Self {
        Self {
            key,
            value,
            cost,
            prev: None,
            next: None,
        }
    }

    // == Replace ==
    /// Swaps in a new value and cost, returning the previous ones.
    pub fn replace(&mut self, value: V, cost: usize) -> (V, usize) {
        let old_value = std::mem::replace(&mut self.value, value);
        let old_cost = std::mem::replace(&mut self.cost, cost);
        (old_value, old_cost)
    }
}

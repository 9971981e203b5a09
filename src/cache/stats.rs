//! Cache Statistics Module
//!
//! Tracks cache behaviour: hits, misses, capacity evictions and
//! lifecycle-driven clears.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Stats ==
/// Snapshot of cache counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of lookups that found a value
    pub hits: u64,
    /// Number of lookups that found nothing
    pub misses: u64,
    /// Number of entries evicted to restore the cost budget
    pub evictions: u64,
    /// Number of clears triggered by lifecycle signals
    pub lifecycle_clears: u64,
    /// Current number of entries in the store
    pub total_entries: usize,
    /// Current sum of entry costs
    pub total_cost: usize,
    /// When a lifecycle signal last cleared the store
    pub last_cleared_at: Option<DateTime<Utc>>,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Recorders ==
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    /// Counts one lifecycle-driven clear and stamps the current time.
    pub fn record_lifecycle_clear(&mut self) {
        self.lifecycle_clears += 1;
        self.last_cleared_at = Some(Utc::now());
    }

    // == Update Occupancy ==
    /// Updates the entry count and total cost.
    pub fn set_occupancy(&mut self, entries: usize, cost: usize) {
        self.total_entries = entries;
        self.total_cost = cost;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.lifecycle_clears, 0);
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.total_cost, 0);
        assert!(stats.last_cleared_at.is_none());
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_record_evictions() {
        let mut stats = CacheStats::new();
        stats.record_evictions(2);
        stats.record_evictions(0);
        stats.record_evictions(1);
        assert_eq!(stats.evictions, 3);
    }

    #[test]
    fn test_record_lifecycle_clear() {
        let before = Utc::now();
        let mut stats = CacheStats::new();
        stats.record_lifecycle_clear();

        assert_eq!(stats.lifecycle_clears, 1);
        let stamped = stats.last_cleared_at.unwrap();
        assert!(stamped >= before);
    }

    #[test]
    fn test_stats_serialize() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.set_occupancy(2, 40);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["hits"], 1);
        assert_eq!(json["total_entries"], 2);
        assert_eq!(json["total_cost"], 40);
        assert!(json["last_cleared_at"].is_null());
    }
}

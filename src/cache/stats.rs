//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Live counters for cache performance.
///
/// Counters are atomic so the read path can record hits while holding only
/// a shared lock on the store.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Eviction ==
    /// Increments the eviction counter by `count`.
    pub fn record_evictions(&self, count: u64) {
        if count > 0 {
            self.evictions.fetch_add(count, Ordering::Relaxed);
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    // == Reset ==
    /// Zeroes hits, misses and evictions.
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Captures the counters together with the current live entry count.
    pub fn snapshot(&self, entries: usize) -> StatsSnapshot {
        StatsSnapshot::new(self.hits(), self.misses(), self.evictions(), entries)
    }
}

// == Stats Snapshot ==
/// Point-in-time view of the cache statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// Live (non-expired) entries at snapshot time
    pub entries: usize,
    /// Hit percentage in `[0, 100]`
    pub hit_rate: f64,
}

impl StatsSnapshot {
    pub fn new(hits: u64, misses: u64, evictions: u64, entries: usize) -> Self {
        Self {
            hits,
            misses,
            evictions,
            entries,
            hit_rate: hit_rate(hits, misses),
        }
    }
}

// == Hit Rate ==
/// Returns `hits / (hits + misses) * 100`, or 0.0 if no lookups were made.
pub fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64 * 100.0
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits(), 0);
        assert_eq!(stats.misses(), 0);
        assert_eq!(stats.evictions(), 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(hit_rate(0, 0), 0.0);
        assert_eq!(CacheStats::new().snapshot(0).hit_rate, 0.0);
    }

    #[test]
    fn test_hit_rate_all_hits() {
        let stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        assert_eq!(stats.snapshot(0).hit_rate, 100.0);
    }

    #[test]
    fn test_hit_rate_all_misses() {
        let stats = CacheStats::new();
        stats.record_miss();
        stats.record_miss();
        assert_eq!(stats.snapshot(0).hit_rate, 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.record_miss();
        assert_eq!(stats.snapshot(0).hit_rate, 1.0 / 3.0 * 100.0);
    }

    #[test]
    fn test_record_evictions() {
        let stats = CacheStats::new();
        stats.record_evictions(1);
        stats.record_evictions(0);
        stats.record_evictions(2);
        assert_eq!(stats.evictions(), 3);
    }

    #[test]
    fn test_reset() {
        let stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.record_evictions(4);
        stats.reset();

        assert_eq!(stats.snapshot(9), StatsSnapshot::new(0, 0, 0, 9));
    }

    #[test]
    fn test_snapshot_serializes_field_names() {
        let json = serde_json::to_value(StatsSnapshot::new(3, 1, 2, 5)).unwrap();
        assert_eq!(json["hits"], 3);
        assert_eq!(json["misses"], 1);
        assert_eq!(json["evictions"], 2);
        assert_eq!(json["entries"], 5);
        assert_eq!(json["hit_rate"], 75.0);
    }
}

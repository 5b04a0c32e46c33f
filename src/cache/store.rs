//! Cache Store Module
//!
//! Key-value map with TTL expiration and statistics. The store itself is not
//! synchronized; `TtlCache` keeps it behind a reader-writer lock.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::cache::{CacheEntry, CacheStats, StatsSnapshot};

// == Lookup ==
/// Outcome of a read that does not mutate the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<V> {
    /// Live entry found
    Hit(V),
    /// Entry present but expired; it must be purged under a write lock
    Expired,
    /// No entry at this key
    Absent,
}

// == Cache Store ==
/// Main cache storage with TTL support.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Performance statistics
    stats: CacheStats,
    /// TTL for writes that do not specify one
    default_ttl: Duration,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty store with the given default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            default_ttl,
        }
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    // == Lookup ==
    /// Reads a key without touching counters.
    pub fn lookup(&self, key: &str, now: Instant) -> Lookup<V> {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired_at(now) => Lookup::Expired,
            Some(entry) => Lookup::Hit(entry.value.clone()),
            None => Lookup::Absent,
        }
    }

    // == Get ==
    /// Reads a key, recording a hit or a miss.
    ///
    /// Takes `&mut self` so an expired entry can be purged on the spot. The
    /// purge counts as a miss, not an eviction.
    pub fn get(&mut self, key: &str) -> Option<V> {
        match self.lookup(key, Instant::now()) {
            Lookup::Hit(value) => {
                self.stats.record_hit();
                Some(value)
            }
            Lookup::Expired => {
                self.entries.remove(key);
                self.stats.record_miss();
                None
            }
            Lookup::Absent => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores a value with the default TTL.
    pub fn set(&mut self, key: String, value: V) {
        let ttl = self.default_ttl;
        self.set_with_ttl(key, value, ttl);
    }

    /// Stores a value with an explicit TTL.
    ///
    /// Overwriting a live entry is not an eviction. Overwriting an entry that
    /// had already expired counts one eviction.
    pub fn set_with_ttl(&mut self, key: String, value: V, ttl: Duration) {
        let now = Instant::now();
        let previous = self.entries.insert(key, CacheEntry::new(value, ttl, now));
        if previous.is_some_and(|entry| entry.is_expired_at(now)) {
            self.stats.record_evictions(1);
        }
    }

    // == Delete ==
    /// Removes an entry by key. Returns true if something was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.stats.record_evictions(1);
        }
        removed
    }

    // == Clear ==
    /// Drops every entry. Counters are left untouched.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, counting each as an eviction.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let removed = self.purge_expired();
        self.stats.record_evictions(removed as u64);
        removed
    }

    /// Removes all expired entries without touching counters.
    fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - self.entries.len()
    }

    // == Snapshot ==
    /// Drops expired entries, then captures the statistics.
    ///
    /// The purge here is uncounted, like the lazy purge in `get`, so a
    /// snapshot never moves the eviction counter.
    pub fn snapshot(&mut self) -> StatsSnapshot {
        self.purge_expired();
        self.stats.snapshot(self.entries.len())
    }

    /// Zeroes the counters without touching stored entries.
    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    // == Length ==
    /// Returns the number of physically stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    const DEFAULT_TTL: Duration = Duration::from_secs(300);

    fn store() -> CacheStore<String> {
        CacheStore::new(DEFAULT_TTL)
    }

    #[test]
    fn test_store_new() {
        let store = store();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_set_uses_default_ttl() {
        let mut store = CacheStore::new(Duration::from_millis(50));

        store.set("key1".to_string(), "value1".to_string());
        assert!(store.get("key1").is_some());

        sleep(Duration::from_millis(80));

        assert!(store.get("key1").is_none());
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store();

        store.set("key1".to_string(), "value1".to_string());

        assert_eq!(store.get("key1").as_deref(), Some("value1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = store();

        assert!(store.get("nonexistent").is_none());
        assert_eq!(store.stats().misses(), 1);
    }

    #[test]
    fn test_store_delete() {
        let mut store = store();

        store.set("key1".to_string(), "value1".to_string());
        assert!(store.delete("key1"));

        assert!(store.is_empty());
        assert!(store.get("key1").is_none());
        assert_eq!(store.stats().evictions(), 1);
    }

    #[test]
    fn test_store_delete_nonexistent() {
        let mut store = store();

        assert!(!store.delete("nonexistent"));
        assert_eq!(store.stats().evictions(), 0);
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = store();

        store.set("key1".to_string(), "value1".to_string());
        store.set("key1".to_string(), "value2".to_string());

        assert_eq!(store.get("key1").as_deref(), Some("value2"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().evictions(), 0);
    }

    #[test]
    fn test_store_overwrite_expired_counts_eviction() {
        let mut store = store();

        store.set_with_ttl("key1".to_string(), "old".to_string(), Duration::ZERO);
        store.set("key1".to_string(), "new".to_string());

        assert_eq!(store.stats().evictions(), 1);
        assert_eq!(store.get("key1").as_deref(), Some("new"));
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = store();

        store.set_with_ttl("key1".to_string(), "value1".to_string(), Duration::from_millis(100));
        assert!(store.get("key1").is_some());

        sleep(Duration::from_millis(150));

        assert!(store.get("key1").is_none());
        // Lazily purged, counted as a miss only
        assert!(store.is_empty());
        assert_eq!(store.stats().misses(), 1);
        assert_eq!(store.stats().evictions(), 0);
    }

    #[test]
    fn test_store_zero_ttl_is_immediate_miss() {
        let mut store = store();

        store.set_with_ttl("key1".to_string(), "value1".to_string(), Duration::ZERO);

        assert_eq!(store.lookup("key1", Instant::now()), Lookup::Expired);
        assert!(store.get("key1").is_none());
    }

    #[test]
    fn test_store_stats() {
        let mut store = store();

        store.set("key1".to_string(), "value1".to_string());
        store.get("key1"); // hit
        store.get("nonexistent"); // miss

        let stats = store.snapshot();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hit_rate, 50.0);
    }

    #[test]
    fn test_store_snapshot_excludes_expired() {
        let mut store = store();

        store.set("live".to_string(), "v".to_string());
        store.set_with_ttl("dead".to_string(), "v".to_string(), Duration::ZERO);
        assert_eq!(store.len(), 2);

        let stats = store.snapshot();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.evictions, 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_reset_then_snapshot_with_expired_entry() {
        let mut store = store();

        store.set("key1".to_string(), "value1".to_string());
        store.get("key1");
        store.delete("key1");
        store.set_with_ttl("stale".to_string(), "v".to_string(), Duration::ZERO);

        store.reset_stats();
        let stats = store.snapshot();

        assert_eq!((stats.hits, stats.misses, stats.evictions), (0, 0, 0));
        assert_eq!(stats.entries, 0);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut store = store();

        store.set_with_ttl("key1".to_string(), "value1".to_string(), Duration::from_millis(50));
        store.set_with_ttl("key2".to_string(), "value2".to_string(), Duration::from_secs(10));

        sleep(Duration::from_millis(80));

        let removed = store.cleanup_expired();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().evictions(), 1);
        assert!(store.get("key2").is_some());
    }

    #[test]
    fn test_store_clear_preserves_counters() {
        let mut store = store();

        store.set("key1".to_string(), "value1".to_string());
        store.get("key1");
        store.get("missing");
        store.delete("key1");
        store.set("key2".to_string(), "value2".to_string());

        store.clear();

        let stats = store.snapshot();
        assert_eq!(stats.entries, 0);
        assert_eq!((stats.hits, stats.misses, stats.evictions), (1, 1, 1));
    }
}

//! TTL Cache Handle
//!
//! Thread-safe, cloneable cache handle. Combines the locked store, the
//! single-flight registry and the background sweep task.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::{CacheStore, Claim, FlightRegistry, Lookup, StatsSnapshot};
use crate::config::{default_sweep_interval, Config};
use crate::tasks::spawn_sweep_task;

// == TTL Cache ==
/// Process-local TTL cache shared between handlers.
///
/// Cloning is cheap; every clone refers to the same store. Values are
/// returned as clones, so store `Arc<T>` for payloads that are expensive to
/// copy.
///
/// The cache owns a background sweep task that is started by the
/// constructor and stopped by [`close`](TtlCache::close) or when the last
/// handle is dropped. Constructors must therefore run inside a Tokio
/// runtime.
pub struct TtlCache<V> {
    inner: Arc<Inner<V>>,
}

struct Inner<V> {
    store: Arc<RwLock<CacheStore<V>>>,
    flights: FlightRegistry,
    default_ttl: Duration,
    shutdown: watch::Sender<bool>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates a cache sweeping at half of `default_ttl`.
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_sweep_interval(default_ttl, default_sweep_interval(default_ttl))
    }

    /// Creates a cache with an explicit sweep interval.
    pub fn with_sweep_interval(default_ttl: Duration, sweep_interval: Duration) -> Self {
        let store = Arc::new(RwLock::new(CacheStore::new(default_ttl)));
        let (shutdown, shutdown_rx) = watch::channel(false);
        let sweeper = spawn_sweep_task(Arc::clone(&store), sweep_interval, shutdown_rx);

        Self {
            inner: Arc::new(Inner {
                store,
                flights: FlightRegistry::new(),
                default_ttl,
                shutdown,
                sweeper: Mutex::new(Some(sweeper)),
            }),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_sweep_interval(config.default_ttl, config.sweep_interval)
    }

    pub fn default_ttl(&self) -> Duration {
        self.inner.default_ttl
    }

    // == Set ==
    /// Stores a value under the default TTL, replacing any previous entry.
    pub async fn set(&self, key: impl Into<String>, value: V) {
        self.inner.store.write().await.set(key.into(), value);
    }

    /// Stores a value under an explicit TTL. A zero TTL expires immediately.
    pub async fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        self.inner
            .store
            .write()
            .await
            .set_with_ttl(key.into(), value, ttl);
    }

    // == Get ==
    /// Returns the live value at `key`, recording a hit or a miss.
    ///
    /// Hits only take the read lock. An expired entry is purged under the
    /// write lock and counts as a miss.
    pub async fn get(&self, key: &str) -> Option<V> {
        {
            let store = self.inner.store.read().await;
            match store.lookup(key, Instant::now()) {
                Lookup::Hit(value) => {
                    store.stats().record_hit();
                    return Some(value);
                }
                Lookup::Absent => {
                    store.stats().record_miss();
                    return None;
                }
                Lookup::Expired => {}
            }
        }

        // A writer may have refreshed the key between the two locks, so the
        // store decides again under the write lock.
        let value = self.inner.store.write().await.get(key);
        if value.is_none() {
            debug!(key, "expired entry read as a miss");
        }
        value
    }

    /// Live value at `key` without touching counters.
    async fn peek(&self, key: &str) -> Option<V> {
        match self.inner.store.read().await.lookup(key, Instant::now()) {
            Lookup::Hit(value) => Some(value),
            Lookup::Expired | Lookup::Absent => None,
        }
    }

    // == Delete ==
    /// Removes `key`. Returns true (and counts one eviction) if it was present.
    pub async fn delete(&self, key: &str) -> bool {
        self.inner.store.write().await.delete(key)
    }

    // == Clear ==
    /// Removes every entry in one write-locked step. Counters are kept.
    pub async fn clear(&self) {
        self.inner.store.write().await.clear();
    }

    // == Get Or Set ==
    /// Returns the cached value, or computes and caches it under the default TTL.
    ///
    /// See [`get_or_set_with_ttl`](TtlCache::get_or_set_with_ttl).
    pub async fn get_or_set<F, Fut, E>(&self, key: &str, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.get_or_set_with_ttl(key, self.inner.default_ttl, compute)
            .await
    }

    /// Returns the cached value, or computes and caches it under `ttl`.
    ///
    /// Concurrent misses on the same key are deduplicated: the first caller
    /// runs `compute` while the others wait for it to finish and then read
    /// the cached result. If `compute` fails, its error is returned to the
    /// caller that ran it and nothing is cached; waiting callers then retry
    /// one at a time.
    ///
    /// Cancellation is done by dropping the returned future, e.g. with
    /// `tokio::time::timeout`. A dropped or panicking leader releases its
    /// claim on the key and caches nothing.
    pub async fn get_or_set_with_ttl<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        loop {
            match self.inner.flights.claim(key) {
                Claim::Waiter(waiter) => {
                    waiter.wait().await;
                    if let Some(value) = self.peek(key).await {
                        return Ok(value);
                    }
                }
                Claim::Leader(guard) => {
                    // Another leader may have filled the key since our miss.
                    if let Some(value) = self.peek(key).await {
                        guard.complete();
                        return Ok(value);
                    }

                    let result = compute().await;
                    let fill = result.as_ref().ok().cloned();
                    match fill {
                        Some(value) => self.set_with_ttl(key, value, ttl).await,
                        None => debug!(key, "compute failed, nothing cached"),
                    }
                    guard.complete();
                    return result;
                }
            }
        }
    }

    // == Statistics ==
    /// Drops expired entries, then returns a statistics snapshot.
    ///
    /// Entries dropped here are not counted as evictions; only `delete`, the
    /// background sweep and overwriting an expired entry count them.
    pub async fn statistics(&self) -> StatsSnapshot {
        self.inner.store.write().await.snapshot()
    }

    /// Zeroes hits, misses and evictions. Stored entries are kept.
    pub async fn reset_statistics(&self) {
        self.inner.store.write().await.reset_stats();
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.inner.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.store.read().await.is_empty()
    }

    /// Number of keys with a `get_or_set` computation running.
    pub fn in_flight(&self) -> usize {
        self.inner.flights.in_flight()
    }

    // == Close ==
    /// Stops the background sweep and waits for it to exit.
    ///
    /// Safe to call more than once; only the first call does any work.
    pub async fn close(&self) {
        self.inner.shutdown.send_replace(true);

        let sweeper = self.inner.sweeper.lock().take();
        if let Some(handle) = sweeper {
            if let Err(err) = handle.await {
                warn!(error = %err, "TTL sweep task ended abnormally");
            }
        }
    }
}

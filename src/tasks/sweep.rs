//! TTL Sweep Task
//!
//! Background task that periodically removes expired cache entries, so keys
//! that are written once and never read again do not accumulate.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// The task sleeps for `interval` between sweeps and takes the store's write
/// lock only for the sweep itself. It exits as soon as `shutdown` turns
/// `true` or its sender is dropped; the shutdown branch is always polled
/// before a pending tick, so no sweep starts after shutdown was observed.
///
/// Must be called from within a Tokio runtime.
///
/// # Example
/// ```ignore
/// let store = Arc::new(RwLock::new(CacheStore::<String>::new(ttl)));
/// let (shutdown, shutdown_rx) = watch::channel(false);
/// let handle = spawn_sweep_task(store.clone(), Duration::from_secs(1), shutdown_rx);
/// // Later:
/// shutdown.send_replace(true);
/// handle.await?;
/// ```
pub fn spawn_sweep_task<V>(
    store: Arc<RwLock<CacheStore<V>>>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    let interval = interval.max(Duration::from_millis(1));

    tokio::spawn(async move {
        info!(
            interval_ms = interval.as_millis() as u64,
            "Starting TTL sweep task"
        );

        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let removed = store.write().await.cleanup_expired();

                    if removed > 0 {
                        info!("TTL sweep: removed {} expired entries", removed);
                    } else {
                        debug!("TTL sweep: no expired entries found");
                    }
                }
            }
        }

        info!("TTL sweep task stopped");
    })
}

//! In-flight Computation Registry
//!
//! Tracks which keys currently have a compute running so that concurrent
//! misses on the same key wait for the leader instead of calling upstream
//! themselves.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, warn};

// == Claim ==
/// Result of trying to become the computing caller for a key.
pub enum Claim {
    /// Caller owns the computation; the claim is released when the guard drops
    Leader(FlightGuard),
    /// Another caller is computing; await `wait` then re-check the cache
    Waiter(FlightWaiter),
}

// == Flight Registry ==
/// Registry of keys with a computation in progress.
#[derive(Debug, Clone, Default)]
pub struct FlightRegistry {
    flights: Arc<Mutex<HashMap<String, watch::Receiver<()>>>>,
}

impl FlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // == Claim ==
    /// Atomically claims `key`, or joins the flight already running for it.
    pub fn claim(&self, key: &str) -> Claim {
        let mut flights = self.flights.lock();
        if let Some(rx) = flights.get(key) {
            return Claim::Waiter(FlightWaiter { rx: rx.clone() });
        }

        let (tx, rx) = watch::channel(());
        flights.insert(key.to_string(), rx);
        debug!(key, "single-flight leader claimed key");

        Claim::Leader(FlightGuard {
            registry: self.clone(),
            key: key.to_string(),
            completed: false,
            _tx: tx,
        })
    }

    /// Number of keys with a computation in progress.
    pub fn in_flight(&self) -> usize {
        self.flights.lock().len()
    }

    fn release(&self, key: &str) {
        self.flights.lock().remove(key);
    }
}

// == Flight Guard ==
/// Leadership token for one key.
///
/// Dropping it unregisters the key and wakes every waiter. This happens on
/// success, error, panic and cancellation of the leader alike.
pub struct FlightGuard {
    registry: FlightRegistry,
    key: String,
    completed: bool,
    _tx: watch::Sender<()>,
}

impl FlightGuard {
    /// Marks the computation as finished (successfully or not) and releases
    /// the claim.
    pub fn complete(mut self) {
        self.completed = true;
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        // Unregister before the sender drops so no new waiter can join a
        // flight that has already finished.
        self.registry.release(&self.key);
        if self.completed {
            debug!(key = %self.key, "single-flight leader released key");
        } else {
            warn!(key = %self.key, "single-flight leader abandoned key before completing");
        }
    }
}

// == Flight Waiter ==
/// Handle for a caller waiting on another caller's computation.
pub struct FlightWaiter {
    rx: watch::Receiver<()>,
}

impl FlightWaiter {
    /// Resolves once the leader has released its claim.
    pub async fn wait(mut self) {
        // The leader never sends; `changed` errors once the sender is dropped.
        while self.rx.changed().await.is_ok() {}
    }
}

//! Cache Module
//!
//! Provides an in-memory TTL cache with single-flight fills and statistics.

mod entry;
mod flight;
mod stats;
mod store;
mod ttl_cache;


pub use stats::StatsSnapshot;
pub use ttl_cache::TtlCache;

pub(crate) use entry::CacheEntry;
pub(crate) use flight::{Claim, FlightRegistry};
pub(crate) use stats::CacheStats;
pub(crate) use store::{CacheStore, Lookup};

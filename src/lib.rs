//! TTL Cache - process-local caching layer for upstream calls
//!
//! Sits between tool/resource handlers and slow or rate-limited upstream
//! services. Provides per-key TTLs, compute-on-miss with single-flight
//! deduplication, live hit/miss/eviction statistics and a background
//! expiration sweep.

pub mod cache;
pub mod config;
pub mod error;
pub mod keys;
mod tasks;

pub use cache::{StatsSnapshot, TtlCache};
pub use config::Config;
pub use error::ConfigError;
pub use keys::{CacheKey, DataClass};

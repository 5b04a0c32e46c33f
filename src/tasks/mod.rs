//! Background Tasks Module
//!
//! Contains background tasks owned by a cache handle.
//!
//! # Tasks
//! - TTL Sweep: Removes expired cache entries at a fixed interval until shutdown

mod sweep;

pub(crate) use sweep::spawn_sweep_task;

//! Configuration Module
//!
//! Handles loading cache TTL settings from environment variables.

use std::env;
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::keys::DataClass;

/// Smallest sweep interval derived from a default TTL.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(10);

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// TTL for writes that do not specify one
    pub default_ttl: Duration,
    /// Interval between background expiration sweeps
    pub sweep_interval: Duration,
    /// TTL for incident-coordination data
    pub incident_ttl: Duration,
    /// TTL for node inventory from the orchestration API
    pub node_ttl: Duration,
    /// TTL for metrics-service queries
    pub metrics_ttl: Duration,
    /// TTL for ML-serving predictions
    pub prediction_ttl: Duration,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL (default: 300000)
    /// - `CACHE_SWEEP_INTERVAL_MS` - Sweep interval (default: half the default TTL)
    /// - `CACHE_INCIDENT_TTL_MS` - Incident data TTL (default: 30000)
    /// - `CACHE_NODE_TTL_MS` - Node inventory TTL (default: 600000)
    /// - `CACHE_METRICS_TTL_MS` - Metrics TTL (default: 60000)
    /// - `CACHE_PREDICTION_TTL_MS` - Prediction TTL (default: 120000)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup, then validates it.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let default_ttl = millis(&lookup, "CACHE_DEFAULT_TTL_MS", defaults.default_ttl)?;

        let config = Self {
            default_ttl,
            sweep_interval: millis(
                &lookup,
                "CACHE_SWEEP_INTERVAL_MS",
                default_sweep_interval(default_ttl),
            )?,
            incident_ttl: millis(&lookup, "CACHE_INCIDENT_TTL_MS", defaults.incident_ttl)?,
            node_ttl: millis(&lookup, "CACHE_NODE_TTL_MS", defaults.node_ttl)?,
            metrics_ttl: millis(&lookup, "CACHE_METRICS_TTL_MS", defaults.metrics_ttl)?,
            prediction_ttl: millis(&lookup, "CACHE_PREDICTION_TTL_MS", defaults.prediction_ttl)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects zero durations.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("default_ttl", self.default_ttl),
            ("sweep_interval", self.sweep_interval),
            ("incident_ttl", self.incident_ttl),
            ("node_ttl", self.node_ttl),
            ("metrics_ttl", self.metrics_ttl),
            ("prediction_ttl", self.prediction_ttl),
        ];
        match fields.iter().find(|(_, value)| value.is_zero()) {
            Some((name, _)) => Err(ConfigError::ZeroDuration(*name)),
            None => Ok(()),
        }
    }

    /// TTL for a given class of upstream data.
    pub fn ttl_for(&self, class: DataClass) -> Duration {
        match class {
            DataClass::Incident => self.incident_ttl,
            DataClass::NodeInventory => self.node_ttl,
            DataClass::Metrics => self.metrics_ttl,
            DataClass::Prediction => self.prediction_ttl,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let default_ttl = Duration::from_secs(300);
        Self {
            default_ttl,
            sweep_interval: default_sweep_interval(default_ttl),
            incident_ttl: Duration::from_secs(30),
            node_ttl: Duration::from_secs(600),
            metrics_ttl: Duration::from_secs(60),
            prediction_ttl: Duration::from_secs(120),
        }
    }
}

/// Half the default TTL, never below `MIN_SWEEP_INTERVAL`.
pub fn default_sweep_interval(default_ttl: Duration) -> Duration {
    (default_ttl / 2).max(MIN_SWEEP_INTERVAL)
}

fn millis<F>(lookup: &F, var: &'static str, default: Duration) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::InvalidValue { var, value: raw }),
    }
}

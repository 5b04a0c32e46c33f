//! Cache Keys
//!
//! Builds stable string keys describing an upstream call, and names the
//! classes of upstream data that get their own TTL.

use std::collections::BTreeMap;
use std::fmt;

use urlencoding::encode;

// == Data Class ==
/// Staleness class of cached upstream data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataClass {
    /// Incident-coordination data, changes quickly
    Incident,
    /// Node inventory from the orchestration API, changes slowly
    NodeInventory,
    /// Metrics-service query results
    Metrics,
    /// ML-serving predictions
    Prediction,
}

// == Cache Key ==
/// Key for one upstream call: a resource plus the parameters that affect
/// its result.
///
/// Parameters are ordered by name, so insertion order never changes the
/// key. Setting the same parameter twice keeps the last value. Every
/// component is percent-encoded, so distinct inputs never render the same
/// key.
///
/// ```
/// use ttl_cache::CacheKey;
///
/// let key = CacheKey::new("nodes")
///     .param("status", "NotReady")
///     .param("namespace", "default")
///     .param("selector", "app=web");
/// assert_eq!(
///     key.to_string(),
///     "nodes?namespace=default&selector=app%3Dweb&status=NotReady"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    resource: String,
    params: BTreeMap<String, String>,
}

impl CacheKey {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            params: BTreeMap::new(),
        }
    }

    /// Adds a parameter that affects the upstream result.
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    /// Adds a parameter only when a value is present.
    pub fn param_opt<T: ToString>(self, name: impl Into<String>, value: Option<T>) -> Self {
        match value {
            Some(value) => self.param(name, value),
            None => self,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(&self.resource))?;
        for (i, (name, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{}={}", encode(name), encode(value))?;
        }
        Ok(())
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.to_string()
    }
}

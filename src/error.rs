//! Error types for the cache crate
//!
//! Cache operations themselves are infallible; the only errors raised here
//! come from loading configuration. Compute failures inside `get_or_set`
//! are returned to the caller as-is.

use thiserror::Error;

// == Config Error Enum ==
/// Errors raised while loading or validating configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment variable present but not a valid number
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    /// Duration setting that must be positive was zero
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

// == Result Type Alias ==
/// Convenience Result type for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;

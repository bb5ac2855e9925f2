//! Core error types for `mispctl`.

use thiserror::Error;

/// Core error type for `mispctl` models.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Required configuration value is missing.
    #[error("Missing configuration: {0}")]
    MissingConfig(String),
}

//! Fetch error types.

use thiserror::Error;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for operations built on the HTTP session.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport fault (connection refused, timeout, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// Every candidate endpoint was tried without an acceptable answer.
    #[error("All strategies failed; last status: {status:?}. Body: {snippet}")]
    AllStrategiesFailed {
        /// Status of the last candidate, if any was reached.
        status: Option<u16>,
        /// Bounded prefix of the last response body.
        snippet: String,
    },

    /// Bounded retries used up.
    #[error("{operation} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Operation label.
        operation: String,
        /// Attempts made.
        attempts: u32,
        /// Error from the final attempt.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

// ============================================================================
// HTTP Error
// ============================================================================

/// HTTP-session error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request error.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// TLS trust material could not be loaded.
    #[error("TLS configuration error: {0}")]
    Tls(String),

    /// IO error while reading trust material.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

//! Health polling of the server root.
//!
//! Connection refusals and timeouts are expected while the server is still
//! starting, so transport faults count as "not healthy yet" rather than
//! errors.

use std::time::Duration;

use reqwest::StatusCode;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use super::http::HttpClient;

/// Default pause between two polls.
const DEFAULT_INTERVAL_SECS: u64 = 10;

/// Polls `GET /` until it answers 200.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthPoller {
    /// Overall budget; `None` waits forever.
    pub timeout: Option<Duration>,
    /// Sleep between polls.
    pub interval: Duration,
}

impl HealthPoller {
    /// Creates a poller that waits forever.
    pub fn new() -> Self {
        Self {
            timeout: None,
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
        }
    }

    /// Sets the overall budget.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the pause between polls.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Waits until the server root answers 200.
    ///
    /// Returns `false` once the deadline has passed; the deadline is checked
    /// before every request, so an exhausted budget issues no request at all.
    #[instrument(skip(self, client), fields(base_url = %client.base_url()))]
    pub async fn wait_until_healthy(&self, client: &HttpClient) -> bool {
        let deadline = self.timeout.map(|t| Instant::now() + t);
        let mut attempt: u32 = 0;

        loop {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                info!(attempts = attempt, "Health check deadline passed");
                return false;
            }

            attempt += 1;
            match client.get("").await {
                Ok(response) => {
                    debug!(attempt, status = %response.status, "Health check");
                    if response.status == StatusCode::OK {
                        info!(attempt, "Server healthy");
                        return true;
                    }
                }
                Err(e) => {
                    debug!(attempt, error = %e, "Health check request failed");
                }
            }

            tokio::time::sleep(self.interval).await;
        }
    }
}

impl Default for HealthPoller {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

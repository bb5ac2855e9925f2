//! Bounded retries with a fixed backoff.
//!
//! No exponential growth and no jitter: the timing is deterministic, which
//! suits waiting out a server that is still starting up.

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::FetchError;

/// Strategy for retrying a failing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (at least one is always made).
    pub max_attempts: u32,
    /// Sleep between consecutive attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Creates a new retry policy.
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Runs `op` until it succeeds or the attempts are used up.
    ///
    /// `op` receives the 1-based attempt number. Between two attempts the
    /// policy sleeps `backoff`; there is no sleep after the last attempt.
    /// Exhaustion returns [`FetchError::RetriesExhausted`] carrying the final
    /// error.
    pub async fn run<T, E, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, FetchError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            info!(operation, attempt, "Attempt starting");

            match op(attempt).await {
                Ok(value) => {
                    info!(operation, attempt, "Attempt succeeded");
                    return Ok(value);
                }
                Err(error) => {
                    warn!(operation, attempt, error = %error, "Attempt failed");
                    if attempt >= max_attempts {
                        return Err(FetchError::RetriesExhausted {
                            operation: operation.to_string(),
                            attempts: attempt,
                            source: Box::new(error),
                        });
                    }
                    tokio::time::sleep(self.backoff).await;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tokio::time::Instant;

    #[derive(Debug, thiserror::Error)]
    #[error("attempt {0} failed")]
    struct Boom(u32);

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_after_max_attempts() {
        let policy = RetryPolicy::new(3, Duration::from_secs(10));
        let calls = Cell::new(0);
        let start = Instant::now();

        let result: Result<(), _> = policy
            .run("login", |attempt| {
                calls.set(calls.get() + 1);
                async move { Err(Boom(attempt)) }
            })
            .await;

        assert_eq!(calls.get(), 3);
        // Two intervening sleeps, none after the final attempt.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(20) && elapsed < Duration::from_secs(30));
        match result {
            Err(FetchError::RetriesExhausted {
                attempts, source, ..
            }) => {
                assert_eq!(attempts, 3);
                assert_eq!(source.to_string(), "attempt 3 failed");
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_second_attempt() {
        let policy = RetryPolicy::new(5, Duration::from_secs(10));
        let start = Instant::now();

        let result = policy
            .run("login", |attempt| async move {
                if attempt < 2 { Err(Boom(attempt)) } else { Ok(attempt) }
            })
            .await
            .unwrap();

        assert_eq!(result, 2);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(10) && elapsed < Duration::from_secs(20));
    }

    #[tokio::test]
    async fn test_zero_attempts_still_tries_once() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        let calls = Cell::new(0);
        let result: Result<(), _> = policy
            .run("login", |attempt| {
                calls.set(calls.get() + 1);
                async move { Err(Boom(attempt)) }
            })
            .await;

        assert_eq!(calls.get(), 1);
        assert!(result.is_err());
    }
}

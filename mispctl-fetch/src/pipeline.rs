//! Strategy pipeline: try candidates in order until one is accepted.
//!
//! Strategies run strictly one after another. The first
//! [`Step::Accept`] ends the run and no later strategy is invoked.

use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use crate::error::FetchError;
use crate::strategy::{EndpointStrategy, Step};

// ============================================================================
// Strategy Attempt
// ============================================================================

/// Record of a single strategy run.
#[derive(Debug, Clone)]
pub struct StrategyAttempt {
    /// The strategy ID that was attempted.
    pub strategy_id: String,
    /// Whether the strategy was accepted.
    pub success: bool,
    /// Status of the skipped response, if a request was made.
    pub status: Option<u16>,
    /// How long the attempt took.
    pub duration: Duration,
}

// ============================================================================
// Pipeline Outcome
// ============================================================================

/// The outcome of a pipeline run that did not hit a transport fault.
#[derive(Debug)]
pub struct PipelineOutcome<T> {
    /// The accepted value, if any strategy qualified.
    pub value: Option<T>,
    /// All attempts made, in order.
    pub attempts: Vec<StrategyAttempt>,
    /// Status of the last skipped candidate that made a request.
    pub last_status: Option<u16>,
    /// Body snippet of the last skipped candidate.
    pub last_snippet: String,
    /// Total duration of all attempts.
    pub duration: Duration,
}

impl<T> PipelineOutcome<T> {
    /// Returns true if a strategy was accepted.
    pub fn is_success(&self) -> bool {
        self.value.is_some()
    }

    /// Returns the number of strategies that were run.
    pub fn attempts_count(&self) -> usize {
        self.attempts.len()
    }

    /// Returns the accepted strategy ID, if any.
    pub fn successful_strategy(&self) -> Option<&str> {
        self.attempts
            .iter()
            .find(|a| a.success)
            .map(|a| a.strategy_id.as_str())
    }

    /// Converts into the accepted value, or
    /// [`FetchError::AllStrategiesFailed`] carrying the last status and body.
    pub fn into_result(self) -> Result<T, FetchError> {
        self.value.ok_or(FetchError::AllStrategiesFailed {
            status: self.last_status,
            snippet: self.last_snippet,
        })
    }
}

// ============================================================================
// Strategy Pipeline
// ============================================================================

/// An ordered list of strategies for one logical operation.
pub struct StrategyPipeline<'a, T> {
    operation: String,
    strategies: Vec<EndpointStrategy<'a, T>>,
}

impl<'a, T> StrategyPipeline<'a, T> {
    /// Creates an empty pipeline for `operation` (used in logs).
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            strategies: Vec::new(),
        }
    }

    /// Appends a strategy built from an async closure.
    #[must_use]
    pub fn then<F, Fut>(mut self, id: impl Into<String>, f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'a,
        Fut: Future<Output = Result<Step<T>, FetchError>> + Send + 'a,
    {
        self.strategies.push(EndpointStrategy::new(id, f));
        self
    }

    /// Returns the number of strategies in the pipeline.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Returns true if the pipeline is empty.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Runs strategies in order until one is accepted.
    ///
    /// A transport fault from any strategy aborts the run and is returned
    /// as `Err`; skips are recorded and the next strategy runs.
    #[instrument(skip(self), fields(operation = %self.operation, strategies = self.strategies.len()))]
    pub async fn execute(self) -> Result<PipelineOutcome<T>, FetchError> {
        let start = Instant::now();
        let mut attempts = Vec::with_capacity(self.strategies.len());
        let mut last_status = None;
        let mut last_snippet = String::new();

        for strategy in self.strategies {
            let (strategy_id, run) = strategy.into_parts();
            let attempt_start = Instant::now();
            debug!(strategy = %strategy_id, "Executing strategy");

            match run().await {
                Ok(Step::Accept(value)) => {
                    let duration = attempt_start.elapsed();
                    info!(strategy = %strategy_id, duration = ?duration, "Strategy succeeded");
                    attempts.push(StrategyAttempt {
                        strategy_id,
                        success: true,
                        status: None,
                        duration,
                    });
                    return Ok(PipelineOutcome {
                        value: Some(value),
                        attempts,
                        last_status,
                        last_snippet,
                        duration: start.elapsed(),
                    });
                }
                Ok(Step::Skip { status, snippet }) => {
                    let duration = attempt_start.elapsed();
                    debug!(strategy = %strategy_id, status = ?status, reason = %snippet, "Strategy skipped");
                    attempts.push(StrategyAttempt {
                        strategy_id,
                        success: false,
                        status,
                        duration,
                    });
                    if status.is_some() {
                        last_status = status;
                    }
                    last_snippet = snippet;
                }
                Err(error) => {
                    warn!(strategy = %strategy_id, error = %error, "Strategy failed");
                    return Err(error);
                }
            }
        }

        warn!(last_status = ?last_status, "All strategies failed");
        Ok(PipelineOutcome {
            value: None,
            attempts,
            last_status,
            last_snippet,
            duration: start.elapsed(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HttpError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn skip<T>(status: u16) -> Result<Step<T>, FetchError> {
        Ok(Step::Skip {
            status: Some(status),
            snippet: format!("status {status}"),
        })
    }

    /// Builds a pipeline whose stages answer with the given statuses and
    /// counts how many stages actually ran.
    fn staged(statuses: &[u16], calls: &Arc<AtomicUsize>) -> StrategyPipeline<'static, u16> {
        let mut pipeline = StrategyPipeline::new("test.ladder");
        for (i, &status) in statuses.iter().enumerate() {
            let calls = Arc::clone(calls);
            pipeline = pipeline.then(format!("stage{}", i + 1), move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                if (200..300).contains(&status) {
                    Ok(Step::Accept(status))
                } else {
                    skip(status)
                }
            });
        }
        pipeline
    }

    #[tokio::test]
    async fn test_empty_pipeline() {
        let outcome = StrategyPipeline::<()>::new("empty").execute().await.unwrap();
        assert!(!outcome.is_success());
        assert_eq!(outcome.attempts_count(), 0);
        assert!(matches!(
            outcome.into_result(),
            Err(FetchError::AllStrategiesFailed { status: None, .. })
        ));
    }

    #[tokio::test]
    async fn test_stops_at_first_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let outcome = staged(&[404, 404, 200, 200, 200], &calls)
            .execute()
            .await
            .unwrap();

        assert!(outcome.is_success());
        assert_eq!(outcome.attempts_count(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(outcome.successful_strategy(), Some("stage3"));
        assert_eq!(outcome.value, Some(200));
    }

    #[tokio::test]
    async fn test_all_skipped_reports_last_status() {
        let calls = Arc::new(AtomicUsize::new(0));
        let outcome = staged(&[404, 403, 500], &calls).execute().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(outcome.last_status, Some(500));
        match outcome.into_result() {
            Err(FetchError::AllStrategiesFailed { status, snippet }) => {
                assert_eq!(status, Some(500));
                assert_eq!(snippet, "status 500");
            }
            other => panic!("expected AllStrategiesFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_fault_aborts() {
        let calls = Arc::new(AtomicUsize::new(0));
        let after = Arc::clone(&calls);
        let result = StrategyPipeline::<()>::new("test.fault")
            .then("broken", || async {
                Err(FetchError::Http(HttpError::InvalidUrl("boom".to_string())))
            })
            .then("never", move || async move {
                after.fetch_add(1, Ordering::SeqCst);
                Ok(Step::Accept(()))
            })
            .execute()
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}

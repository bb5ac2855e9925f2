//! Endpoint strategy type.
//!
//! A strategy is one way of achieving a logical operation against the
//! server: a particular path, encoding, or payload shape. Operations whose
//! server-side surface differs between installations are expressed as an
//! ordered list of strategies run by a
//! [`StrategyPipeline`](crate::pipeline::StrategyPipeline).

use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;

use crate::error::FetchError;
use crate::host::http::Response;

// ============================================================================
// Step
// ============================================================================

/// What a single strategy produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Step<T> {
    /// The candidate qualified; stop here.
    Accept(T),
    /// The candidate did not qualify; try the next one.
    Skip {
        /// Status the candidate answered with, if a request was made.
        status: Option<u16>,
        /// Bounded prefix of the body, for diagnostics.
        snippet: String,
    },
}

impl<T> Step<T> {
    /// Builds a skip from a response.
    pub fn skip(response: &Response) -> Self {
        Self::Skip {
            status: Some(response.status_code()),
            snippet: response.snippet(),
        }
    }

    /// Builds a skip for a candidate that could not be attempted.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Skip {
            status: None,
            snippet: reason.into(),
        }
    }

    /// Accepts `value` if the response is 2xx, otherwise skips.
    pub fn accept_if_success(response: &Response, value: T) -> Self {
        if response.is_success() {
            Self::Accept(value)
        } else {
            Self::skip(response)
        }
    }

    /// Returns true for [`Step::Accept`].
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept(_))
    }
}

// ============================================================================
// Endpoint Strategy
// ============================================================================

/// Future returned by a strategy.
pub type StrategyFuture<'a, T> = BoxFuture<'a, Result<Step<T>, FetchError>>;

/// One candidate in a fallback ordering.
///
/// The closure runs at most once. An `Err` is a transport fault and aborts
/// the whole pipeline; "this candidate did not work" is [`Step::Skip`].
pub struct EndpointStrategy<'a, T> {
    id: String,
    run: Box<dyn FnOnce() -> StrategyFuture<'a, T> + Send + 'a>,
}

impl<'a, T> EndpointStrategy<'a, T> {
    /// Creates a strategy from an async closure.
    pub fn new<F, Fut>(id: impl Into<String>, f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'a,
        Fut: Future<Output = Result<Step<T>, FetchError>> + Send + 'a,
    {
        Self {
            id: id.into(),
            run: Box::new(move || Box::pin(f())),
        }
    }

    /// Identifier used in logs and attempt records.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn into_parts(self) -> (String, Box<dyn FnOnce() -> StrategyFuture<'a, T> + Send + 'a>) {
        (self.id, self.run)
    }
}

impl<T> fmt::Debug for EndpointStrategy<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointStrategy")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

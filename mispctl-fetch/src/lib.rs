// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # mispctl Fetch
//!
//! Transport and control-flow building blocks for driving a MISP server as a
//! scripted user.
//!
//! ## Host APIs
//!
//! - [`host::http`] - Cookie-keeping HTTP session with a redirect guard
//! - [`host::health`] - Health polling of the server root
//!
//! ## Control flow
//!
//! - [`strategy::EndpointStrategy`] - One candidate endpoint/encoding
//! - [`pipeline::StrategyPipeline`] - Tries candidates in order until one is accepted
//! - [`retry::RetryPolicy`] - Bounded attempts with a fixed backoff
//!
//! ## Parsing
//!
//! - [`html`] - Anti-forgery token extraction and page markers
//! - [`tls`] - Certificate verification setting for the session
//!
//! ## Example
//!
//! ```ignore
//! use mispctl_fetch::{HttpClient, StrategyPipeline, Step};
//!
//! let client = HttpClient::builder("https://misp.local").build()?;
//! let outcome = StrategyPipeline::new("feeds.list")
//!     .then("feeds/index", || async { Ok(Step::Accept(())) })
//!     .execute()
//!     .await?;
//! ```

pub mod error;
pub mod host;
pub mod html;
pub mod pipeline;
pub mod retry;
pub mod strategy;
pub mod tls;

// Errors
pub use error::{FetchError, HttpError};

// Host APIs
pub use host::{
    health::HealthPoller,
    http::{HttpClient, HttpClientBuilder, RequestBody, Response, header_map},
};

// Strategy & Pipeline
pub use pipeline::{PipelineOutcome, StrategyAttempt, StrategyPipeline};
pub use retry::RetryPolicy;
pub use strategy::{EndpointStrategy, Step};
pub use tls::TlsVerification;

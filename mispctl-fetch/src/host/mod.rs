//! Host APIs for talking to the remote server.
//!
//! - [`http`] - Cookie-keeping HTTP session with redirect guard
//! - [`health`] - Health polling of the server root

pub mod health;
pub mod http;

pub use health::HealthPoller;
pub use http::{HttpClient, HttpClientBuilder, RequestBody, Response};

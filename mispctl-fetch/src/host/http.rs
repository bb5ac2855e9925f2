//! HTTP session with browser-like headers and a redirect guard.
//!
//! This module provides the single transport used against the remote server:
//! - One cookie jar shared by every request for the client's lifetime
//! - Fixed browser-like default headers
//! - A bounded per-call timeout
//! - Certificate verification resolved once from [`TlsVerification`]
//! - A redirect guard that re-issues a request without following redirects
//!   when the server bounces it to a known rogue host

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, HeaderMap, HeaderName, HeaderValue, PRAGMA,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use reqwest::{Certificate, Client, ClientBuilder, Method, StatusCode, redirect};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::HttpError;
use crate::tls::TlsVerification;

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Host fragment of the observed rogue redirect target.
pub const DEFAULT_ROGUE_REDIRECT_HOST: &str = "ironclad.ofdecian";

/// Maximum number of body characters kept for diagnostics.
pub const BODY_SNIPPET_LEN: usize = 300;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/140.0.0.0 Safari/537.36";

const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,\
    image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";

// ============================================================================
// Request / Response
// ============================================================================

/// Body of an outgoing request.
///
/// Kept by value so the redirect guard can replay it.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// `application/x-www-form-urlencoded` fields, in order.
    Form(Vec<(String, String)>),
    /// `application/json` document.
    Json(Value),
}

impl RequestBody {
    /// Builds a form body from borrowed pairs.
    pub fn form<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A fully read response.
#[derive(Debug, Clone)]
pub struct Response {
    /// Status code.
    pub status: StatusCode,
    /// Final effective URL after redirects.
    pub url: Url,
    /// Body text.
    pub body: String,
}

impl Response {
    async fn read(response: reqwest::Response) -> Result<Self, HttpError> {
        let status = response.status();
        let url = response.url().clone();
        let body = response.text().await?;
        Ok(Self { status, url, body })
    }

    /// Status as an integer.
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns true for 2xx.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns true for any status >= 400.
    pub fn is_error(&self) -> bool {
        self.status.as_u16() >= 400
    }

    /// Parses the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// First [`BODY_SNIPPET_LEN`] characters of the body.
    pub fn snippet(&self) -> String {
        self.body.chars().take(BODY_SNIPPET_LEN).collect()
    }
}

// ============================================================================
// HTTP Client
// ============================================================================

/// Builder for [`HttpClient`].
#[derive(Debug, Clone)]
pub struct HttpClientBuilder {
    base_url: String,
    tls: TlsVerification,
    timeout: Duration,
    rogue_redirect_host: String,
}

impl HttpClientBuilder {
    /// Sets the certificate verification mode.
    pub fn tls(mut self, tls: TlsVerification) -> Self {
        self.tls = tls;
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the host fragment that identifies a rogue redirect.
    pub fn rogue_redirect_host(mut self, fragment: impl Into<String>) -> Self {
        self.rogue_redirect_host = fragment.into();
        self
    }

    /// Builds the client.
    pub fn build(self) -> Result<HttpClient, HttpError> {
        let base_url = self.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(HttpError::InvalidUrl("base URL is required".to_string()));
        }
        let base = Url::parse(&base_url)
            .map_err(|e| HttpError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.host_str().is_none() {
            return Err(HttpError::InvalidUrl(format!("{base_url}: no host")));
        }

        let roots = match &self.tls {
            TlsVerification::CaBundle(path) => {
                let pem = std::fs::read(path)?;
                let certs = Certificate::from_pem_bundle(&pem)
                    .map_err(|e| HttpError::Tls(format!("{}: {e}", path.display())))?;
                if certs.is_empty() {
                    return Err(HttpError::Tls(format!(
                        "{}: no certificates found",
                        path.display()
                    )));
                }
                certs
            }
            _ => Vec::new(),
        };

        let jar = Arc::new(Jar::default());
        let follow = self.client_builder(&jar, &roots).build()?;
        let no_follow = self
            .client_builder(&jar, &roots)
            .redirect(redirect::Policy::none())
            .build()?;

        debug!(base_url = %base_url, tls = ?self.tls, "HTTP session created");

        Ok(HttpClient {
            base,
            base_url,
            follow,
            no_follow,
            rogue_redirect_host: self.rogue_redirect_host,
        })
    }

    fn client_builder(&self, jar: &Arc<Jar>, roots: &[Certificate]) -> ClientBuilder {
        let mut builder = Client::builder()
            .timeout(self.timeout)
            .default_headers(browser_headers())
            .cookie_provider(Arc::clone(jar));

        match &self.tls {
            TlsVerification::Disabled => {
                builder = builder.danger_accept_invalid_certs(true);
            }
            TlsVerification::System => {}
            TlsVerification::CaBundle(_) => {
                builder = builder.tls_built_in_root_certs(false);
                for cert in roots {
                    builder = builder.add_root_certificate(cert.clone());
                }
            }
        }
        builder
    }
}

/// HTTP session bound to one server.
///
/// Owns its cookie jar for its whole lifetime; two underlying clients share
/// the jar, one following redirects and one not.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base: Url,
    base_url: String,
    follow: Client,
    no_follow: Client,
    rogue_redirect_host: String,
}

impl HttpClient {
    /// Starts building a client for `base_url`.
    pub fn builder(base_url: impl Into<String>) -> HttpClientBuilder {
        HttpClientBuilder {
            base_url: base_url.into(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            rogue_redirect_host: DEFAULT_ROGUE_REDIRECT_HOST.to_string(),
        }
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a server-relative path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Returns true if `final_url` left the configured host and landed on
    /// the rogue redirect target.
    pub fn is_rogue_redirect(&self, final_url: &Url) -> bool {
        if self.rogue_redirect_host.is_empty() {
            return false;
        }
        let same_host = final_url.host_str() == self.base.host_str()
            && final_url.port_or_known_default() == self.base.port_or_known_default();
        !same_host && final_url.as_str().contains(&self.rogue_redirect_host)
    }

    /// Performs a request against `path`, following redirects.
    ///
    /// If the final URL is a rogue redirect, the same request is issued once
    /// more with redirects disabled and that response is returned instead.
    #[instrument(skip(self, headers, body), fields(method = %method, path = %path))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        headers: &HeaderMap,
        body: &RequestBody,
    ) -> Result<Response, HttpError> {
        let url = self.url_for(path);
        debug!(method = %method, url = %url, "Sending request");

        let response = self.send(&self.follow, &method, &url, headers, body).await?;
        debug!(
            method = %method,
            url = %url,
            status = %response.status,
            final_url = %response.url,
            "Response received"
        );

        if !self.is_rogue_redirect(&response.url) {
            return Ok(response);
        }

        warn!(
            url = %url,
            final_url = %response.url,
            "Redirected to external host, retrying without redirects"
        );
        let response = self.send(&self.no_follow, &method, &url, headers, body).await?;
        debug!(
            method = %method,
            url = %url,
            status = %response.status,
            "Response received (no redirects)"
        );
        Ok(response)
    }

    /// Performs a GET request.
    pub async fn get(&self, path: &str) -> Result<Response, HttpError> {
        self.request(Method::GET, path, &HeaderMap::new(), &RequestBody::Empty)
            .await
    }

    /// Performs a GET request with extra headers.
    pub async fn get_with_headers(
        &self,
        path: &str,
        headers: &HeaderMap,
    ) -> Result<Response, HttpError> {
        self.request(Method::GET, path, headers, &RequestBody::Empty)
            .await
    }

    /// Performs a POST request with extra headers.
    pub async fn post(
        &self,
        path: &str,
        headers: &HeaderMap,
        body: &RequestBody,
    ) -> Result<Response, HttpError> {
        self.request(Method::POST, path, headers, body).await
    }

    async fn send(
        &self,
        client: &Client,
        method: &Method,
        url: &str,
        headers: &HeaderMap,
        body: &RequestBody,
    ) -> Result<Response, HttpError> {
        let mut builder = client.request(method.clone(), url).headers(headers.clone());
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Form(fields) => builder.form(fields),
            RequestBody::Json(value) => builder.json(value),
        };
        let response = builder.send().await?;
        Response::read(response).await
    }
}

// ============================================================================
// Headers
// ============================================================================

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers
}

/// Builds a header map from name/value pairs, skipping values that are not
/// valid header text.
pub fn header_map<'a>(pairs: impl IntoIterator<Item = (HeaderName, &'a str)>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                headers.insert(name, value);
            }
            Err(_) => warn!(header = %name, "Skipping header with invalid value"),
        }
    }
    headers
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client_for(server: &Server, rogue: &str) -> HttpClient {
        HttpClient::builder(server.url())
            .rogue_redirect_host(rogue)
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap()
    }

    #[test]
    fn test_url_for_trims_slashes() {
        let client = HttpClient::builder("https://misp.example.org/").build().unwrap();
        assert_eq!(client.base_url(), "https://misp.example.org");
        assert_eq!(
            client.url_for("/users/login"),
            "https://misp.example.org/users/login"
        );
        assert_eq!(client.url_for(""), "https://misp.example.org/");
    }

    #[test]
    fn test_builder_rejects_missing_base() {
        assert!(HttpClient::builder("  ").build().is_err());
        assert!(HttpClient::builder("not a url").build().is_err());
    }

    #[test]
    fn test_builder_rejects_missing_bundle() {
        let result = HttpClient::builder("https://misp.example.org")
            .tls(TlsVerification::CaBundle("/nonexistent/ca.pem".into()))
            .build();
        assert!(matches!(result, Err(HttpError::Io(_))));
    }

    #[test]
    fn test_builder_rejects_bundle_without_certificates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"not a certificate").unwrap();

        let result = HttpClient::builder("https://misp.example.org")
            .tls(TlsVerification::CaBundle(file.path().to_path_buf()))
            .build();
        assert!(matches!(result, Err(HttpError::Tls(_))));
    }

    #[test]
    fn test_is_rogue_redirect() {
        let client = HttpClient::builder("https://misp.example.org").build().unwrap();

        let rogue = Url::parse("https://ironclad.ofdecian.example/landing").unwrap();
        let own = Url::parse("https://misp.example.org/users/login").unwrap();
        let other = Url::parse("https://sso.example.org/login").unwrap();

        assert!(client.is_rogue_redirect(&rogue));
        assert!(!client.is_rogue_redirect(&own));
        assert!(!client.is_rogue_redirect(&other));
    }

    #[test]
    fn test_own_host_never_rogue_even_if_fragment_matches() {
        let client = HttpClient::builder("https://misp.example.org")
            .rogue_redirect_host("misp.example")
            .build()
            .unwrap();
        let own = Url::parse("https://misp.example.org/feeds").unwrap();
        assert!(!client.is_rogue_redirect(&own));
    }

    #[test]
    fn test_snippet_is_bounded() {
        let response = Response {
            status: StatusCode::OK,
            url: Url::parse("https://misp.example.org/").unwrap(),
            body: "x".repeat(1000),
        };
        assert_eq!(response.snippet().len(), BODY_SNIPPET_LEN);
    }

    #[test]
    fn test_error_covers_nonstandard_statuses() {
        let response = |code: u16| Response {
            status: StatusCode::from_u16(code).unwrap(),
            url: Url::parse("https://misp.example.org/").unwrap(),
            body: String::new(),
        };
        assert!(!response(200).is_error());
        assert!(!response(302).is_error());
        assert!(response(400).is_error());
        assert!(response(503).is_error());
        assert!(response(600).is_error());
        assert!(response(999).is_error());
    }

    #[tokio::test]
    async fn test_rogue_redirect_retries_once_without_redirects() {
        let mut base = Server::new_async().await;
        let mut rogue = Server::new_async().await;

        let target = format!("{}/landing", rogue.url());
        let login = base
            .mock("GET", "/users/login")
            .with_status(302)
            .with_header("location", &target)
            .expect(2)
            .create_async()
            .await;
        let landing = rogue
            .mock("GET", "/landing")
            .with_status(200)
            .with_body("hijacked")
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&base, &rogue.host_with_port());
        let response = client.get("users/login").await.unwrap();

        assert_eq!(response.status_code(), 302);
        assert_ne!(response.body, "hijacked");
        login.assert_async().await;
        landing.assert_async().await;
    }

    #[tokio::test]
    async fn test_redirect_on_own_host_is_not_retried() {
        let mut base = Server::new_async().await;

        let old = base
            .mock("GET", "/old")
            .with_status(302)
            .with_header("location", "/new")
            .expect(1)
            .create_async()
            .await;
        let new = base
            .mock("GET", "/new")
            .with_status(200)
            .with_body("dashboard")
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&base, "127.0.0.1");
        let response = client.get("old").await.unwrap();

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.body, "dashboard");
        assert!(response.url.path().ends_with("/new"));
        old.assert_async().await;
        new.assert_async().await;
    }

    #[tokio::test]
    async fn test_redirect_to_unflagged_host_is_followed() {
        let mut base = Server::new_async().await;
        let mut sso = Server::new_async().await;

        let target = format!("{}/sso", sso.url());
        let start = base
            .mock("GET", "/")
            .with_status(302)
            .with_header("location", &target)
            .expect(1)
            .create_async()
            .await;
        let landing = sso
            .mock("GET", "/sso")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&base, "ironclad.ofdecian");
        let response = client.get("").await.unwrap();

        assert_eq!(response.status_code(), 200);
        start.assert_async().await;
        landing.assert_async().await;
    }

    #[tokio::test]
    async fn test_rogue_redirect_replays_form_body() {
        let mut base = Server::new_async().await;
        let mut rogue = Server::new_async().await;

        let target = format!("{}/landing", rogue.url());
        let submit = base
            .mock("POST", "/users/login")
            .match_body(Matcher::UrlEncoded("_method".into(), "POST".into()))
            .with_status(302)
            .with_header("location", &target)
            .expect(2)
            .create_async()
            .await;
        let _landing = rogue
            .mock("GET", "/landing")
            .with_status(200)
            .create_async()
            .await;

        let client = client_for(&base, &rogue.host_with_port());
        let body = RequestBody::form([("_method", "POST")]);
        let response = client
            .post("users/login", &HeaderMap::new(), &body)
            .await
            .unwrap();

        assert_eq!(response.status_code(), 302);
        submit.assert_async().await;
    }

    #[tokio::test]
    async fn test_cookies_persist_across_requests() {
        let mut base = Server::new_async().await;

        let _login = base
            .mock("GET", "/users/login")
            .with_status(200)
            .with_header("set-cookie", "MISP-session=abc123; Path=/")
            .create_async()
            .await;
        let home = base
            .mock("GET", "/")
            .match_header("cookie", Matcher::Regex("MISP-session=abc123".into()))
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&base, DEFAULT_ROGUE_REDIRECT_HOST);
        client.get("users/login").await.unwrap();
        let response = client.get("").await.unwrap();

        assert_eq!(response.status_code(), 200);
        home.assert_async().await;
    }

    #[tokio::test]
    async fn test_browser_headers_sent_and_overridable() {
        let mut base = Server::new_async().await;

        let mock = base
            .mock("GET", "/feeds")
            .match_header("user-agent", Matcher::Regex("Mozilla/5.0".into()))
            .match_header("accept", "application/json")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&base, DEFAULT_ROGUE_REDIRECT_HOST);
        let headers = header_map([(ACCEPT, "application/json")]);
        client.get_with_headers("feeds", &headers).await.unwrap();

        mock.assert_async().await;
    }
}

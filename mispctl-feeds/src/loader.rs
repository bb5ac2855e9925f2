//! Default feed catalogue loading through the web UI.

use mispctl_fetch::html::extract_tokens;
use mispctl_fetch::{RequestBody, Response};
use tracing::{info, instrument};

use crate::client::MispClient;
use crate::error::MispError;

/// Feed management page carrying the form tokens.
const FEEDS_PAGE_PATH: &str = "Feeds";

/// Action that imports the server's bundled default feeds.
const LOAD_DEFAULT_FEEDS_PATH: &str = "feeds/loadDefaultFeeds";

impl MispClient {
    /// Loads the server's default feed catalogue.
    ///
    /// Needs a logged-in session. Tokens are read off the feeds page and
    /// posted back with the action; the server's response is returned so the
    /// caller can report its status.
    #[instrument(skip(self))]
    pub async fn load_default_feeds(&self) -> Result<Response, MispError> {
        let page = self.http().get(FEEDS_PAGE_PATH).await?;
        if page.is_error() {
            return Err(MispError::FeedsPageUnavailable(page.status_code()));
        }

        let tokens = extract_tokens(&page.body);
        let mut form = vec![("_method".to_string(), "POST".to_string())];
        form.extend(
            tokens
                .form_fields()
                .into_iter()
                .map(|(name, value)| (name.to_string(), value)),
        );

        let headers = self.form_headers(FEEDS_PAGE_PATH);
        let response = self
            .http()
            .post(LOAD_DEFAULT_FEEDS_PATH, &headers, &RequestBody::Form(form))
            .await?;
        if response.is_error() {
            return Err(MispError::LoadDefaultFeedsFailed(response.status_code()));
        }

        info!(status = response.status_code(), "Default feeds loaded");
        Ok(response)
    }
}

//! Bulk triggers: fetch every feed, cache every feed.

use mispctl_fetch::{FetchError, RequestBody, StrategyPipeline, Step};
use tracing::{info, instrument, warn};

use crate::client::{MispClient, api_headers};

/// Fetch-all action.
const FETCH_ALL_PATH: &str = "feeds/fetchFromAllFeeds";

/// Cache-all action.
const CACHE_ALL_PATH: &str = "feeds/cacheFeeds/all";

impl MispClient {
    /// Triggers fetching from all enabled feeds.
    pub async fn fetch_all_feeds(&self, api_key: &str) -> Result<bool, FetchError> {
        self.bulk_trigger("feeds.fetch_all", FETCH_ALL_PATH, api_key).await
    }

    /// Triggers caching of all feeds.
    pub async fn cache_all_feeds(&self, api_key: &str) -> Result<bool, FetchError> {
        self.bulk_trigger("feeds.cache_all", CACHE_ALL_PATH, api_key).await
    }

    /// POSTs to `path` with no body, then once more as a form carrying
    /// `_method=POST`. Only the extensionless path is tried.
    #[instrument(skip(self, api_key))]
    async fn bulk_trigger(
        &self,
        operation: &str,
        path: &'static str,
        api_key: &str,
    ) -> Result<bool, FetchError> {
        let headers = api_headers(api_key);
        let headers = &headers;

        let outcome = StrategyPipeline::new(operation)
            .then("post", move || async move {
                let response = self.http().post(path, headers, &RequestBody::Empty).await?;
                Ok(Step::accept_if_success(&response, ()))
            })
            .then("post.override", move || async move {
                let body = RequestBody::form([("_method", "POST")]);
                let response = self.http().post(path, headers, &body).await?;
                Ok(Step::accept_if_success(&response, ()))
            })
            .execute()
            .await?;

        if outcome.is_success() {
            info!(operation, "Bulk trigger accepted");
        } else {
            warn!(
                operation,
                status = ?outcome.last_status,
                body = %outcome.last_snippet,
                "Bulk trigger failed"
            );
        }
        Ok(outcome.is_success())
    }
}

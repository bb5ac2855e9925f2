//! Enabling a single feed.
//!
//! Five candidate requests, tried in order until one answers 2xx:
//!
//! | # | Path | Body |
//! |---|------|------|
//! | 1 | `feeds/edit/{id}.json` | `{"enabled": true, "caching_enabled": true}` |
//! | 2 | `feeds/edit/{id}.json` | same, plus `"id"` |
//! | 3 | `feeds/edit/{id}.json` | full feed definition with the flags merged in |
//! | 4 | `feeds/edit/{id}` | form `enabled=1&caching_enabled=1` |
//! | 5 | `feeds/edit/{id}` | same form with `_method=POST` first |
//!
//! Stage 3 is skipped without a request when the feed definition cannot be
//! read back as a JSON object.

use mispctl_fetch::{FetchError, RequestBody, StrategyPipeline, Step};
use reqwest::header::HeaderMap;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::client::{MispClient, api_headers};

impl MispClient {
    /// Enables a feed and its caching.
    ///
    /// Returns `Ok(false)` when every stage answered with a non-2xx status.
    #[instrument(skip(self, api_key))]
    pub async fn enable_feed(&self, feed_id: &str, api_key: &str) -> Result<bool, FetchError> {
        let headers = api_headers(api_key);
        let headers = &headers;
        let json_path = format!("feeds/edit/{feed_id}.json");
        let json_path = json_path.as_str();
        let form_path = format!("feeds/edit/{feed_id}");
        let form_path = form_path.as_str();

        let outcome = StrategyPipeline::new("feeds.enable")
            .then("edit.json.minimal", move || async move {
                let body = json!({"enabled": true, "caching_enabled": true});
                self.try_edit(json_path, headers, RequestBody::Json(body)).await
            })
            .then("edit.json.with_id", move || async move {
                let body = json!({"id": feed_id, "enabled": true, "caching_enabled": true});
                self.try_edit(json_path, headers, RequestBody::Json(body)).await
            })
            .then("edit.json.merged", move || async move {
                match self.get_feed(feed_id, api_key).await? {
                    Some(feed) if feed.attributes().is_some() => {
                        let body = feed.merged_enable_payload(feed_id);
                        self.try_edit(json_path, headers, RequestBody::Json(body)).await
                    }
                    _ => Ok(Step::unavailable("feed definition unavailable")),
                }
            })
            .then("edit.form", move || async move {
                let body = RequestBody::form([("enabled", "1"), ("caching_enabled", "1")]);
                self.try_edit(form_path, headers, body).await
            })
            .then("edit.form.override", move || async move {
                let body = RequestBody::form([
                    ("_method", "POST"),
                    ("enabled", "1"),
                    ("caching_enabled", "1"),
                ]);
                self.try_edit(form_path, headers, body).await
            })
            .execute()
            .await?;

        match outcome.successful_strategy() {
            Some(strategy) => info!(strategy, "Feed enabled"),
            None => warn!(
                status = ?outcome.last_status,
                body = %outcome.last_snippet,
                "Failed to enable feed"
            ),
        }
        Ok(outcome.is_success())
    }

    async fn try_edit(
        &self,
        path: &str,
        headers: &HeaderMap,
        body: RequestBody,
    ) -> Result<Step<()>, FetchError> {
        let response = self.http().post(path, headers, &body).await?;
        Ok(Step::accept_if_success(&response, ()))
    }
}

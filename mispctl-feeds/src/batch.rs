//! Enabling every listed feed.

use mispctl_core::EnableSummary;
use mispctl_fetch::FetchError;
use tracing::{debug, info, instrument};

use crate::client::MispClient;

impl MispClient {
    /// Lists all feeds and enables each one that carries an identifier.
    ///
    /// Descriptors without a usable id count toward `total` only. A feed
    /// that fails to enable is tallied and the run moves on; transport
    /// faults abort.
    #[instrument(skip(self, api_key))]
    pub async fn enable_all_feeds(&self, api_key: &str) -> Result<EnableSummary, FetchError> {
        let feeds = self.list_feeds(api_key).await?;
        let mut summary = EnableSummary::new(feeds.len());

        for feed in &feeds {
            let Some(feed_id) = feed.id() else {
                debug!(feed = %feed.as_value(), "Skipping feed without id");
                continue;
            };
            let ok = self.enable_feed(&feed_id, api_key).await?;
            summary.record(ok);
        }

        info!(%summary, "Feed configuration finished");
        Ok(summary)
    }
}

//! Feed listing and lookup.

use mispctl_core::FeedDescriptor;
use mispctl_fetch::{FetchError, StrategyPipeline, Step};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::client::{MispClient, api_headers};

/// Listing paths, tried in order.
const LIST_PATHS: [&str; 4] = ["feeds/index", "feeds/index.json", "feeds", "feeds.json"];

/// Reads a listing body: a bare array, or an object with a `data` array.
fn parse_feed_list(body: &str) -> Option<Vec<FeedDescriptor>> {
    let items = match serde_json::from_str::<Value>(body).ok()? {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => return None,
        },
        _ => return None,
    };
    Some(items.into_iter().map(FeedDescriptor::from).collect())
}

impl MispClient {
    /// Lists all feed descriptors.
    ///
    /// A candidate qualifies only with status 200 and a body of one of the
    /// two accepted listing shapes. When none qualifies the error carries
    /// the last status and body snippet.
    #[instrument(skip(self, api_key))]
    pub async fn list_feeds(&self, api_key: &str) -> Result<Vec<FeedDescriptor>, FetchError> {
        let headers = api_headers(api_key);
        let headers = &headers;

        let mut pipeline = StrategyPipeline::new("feeds.list");
        for path in LIST_PATHS {
            pipeline = pipeline.then(path, move || async move {
                let response = self.http().get_with_headers(path, headers).await?;
                if response.status_code() != 200 {
                    return Ok(Step::skip(&response));
                }
                Ok(match parse_feed_list(&response.body) {
                    Some(feeds) => Step::Accept(feeds),
                    None => Step::skip(&response),
                })
            });
        }

        let feeds = pipeline.execute().await?.into_result()?;
        debug!(count = feeds.len(), "Feeds listed");
        Ok(feeds)
    }

    /// Fetches one feed definition, as returned by the server.
    ///
    /// The first candidate answering 200 decides: its body is returned if it
    /// parses as JSON and `None` otherwise. `None` also means no candidate
    /// answered 200.
    #[instrument(skip(self, api_key))]
    pub async fn get_feed(
        &self,
        feed_id: &str,
        api_key: &str,
    ) -> Result<Option<FeedDescriptor>, FetchError> {
        let headers = api_headers(api_key);
        let headers = &headers;
        let paths = [format!("feeds/view/{feed_id}.json"), format!("feeds/{feed_id}.json")];

        let mut pipeline = StrategyPipeline::new("feeds.view");
        for path in paths {
            pipeline = pipeline.then(path.clone(), move || async move {
                let response = self.http().get_with_headers(&path, headers).await?;
                if response.status_code() != 200 {
                    return Ok(Step::skip(&response));
                }
                Ok(Step::Accept(
                    response.json::<Value>().ok().map(FeedDescriptor::from),
                ))
            });
        }

        Ok(pipeline.execute().await?.value.flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mispctl_fetch::HttpClient;
    use mockito::Server;
    use serde_json::json;
    use std::time::Duration;

    fn client_for(server: &Server) -> MispClient {
        let http = HttpClient::builder(server.url())
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        MispClient::new(http)
    }

    #[test]
    fn test_parse_feed_list_shapes() {
        let bare = parse_feed_list(r#"[{"Feed":{"id":"1"}},{"id":2}]"#).unwrap();
        assert_eq!(bare.len(), 2);

        let wrapped = parse_feed_list(r#"{"data":[{"Feed":{"id":"1"}}]}"#).unwrap();
        assert_eq!(wrapped[0].id().as_deref(), Some("1"));

        assert!(parse_feed_list(r#"{"feeds":[]}"#).is_none());
        assert!(parse_feed_list(r#"{"data":"nope"}"#).is_none());
        assert!(parse_feed_list("<html></html>").is_none());
        assert!(parse_feed_list("42").is_none());
    }

    #[tokio::test]
    async fn test_list_falls_through_to_qualifying_path() {
        let mut server = Server::new_async().await;
        let index = server
            .mock("GET", "/feeds/index")
            .match_header("authorization", "key")
            .match_header("accept", "application/json")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;
        let index_json = server
            .mock("GET", "/feeds/index.json")
            .with_status(200)
            .with_body("<html>login</html>")
            .expect(1)
            .create_async()
            .await;
        let feeds = server
            .mock("GET", "/feeds")
            .with_status(200)
            .with_body(json!({"data": [{"Feed": {"id": "7"}}]}).to_string())
            .expect(1)
            .create_async()
            .await;
        let feeds_json = server
            .mock("GET", "/feeds.json")
            .expect(0)
            .create_async()
            .await;

        let listed = client_for(&server).list_feeds("key").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id().as_deref(), Some("7"));

        index.assert_async().await;
        index_json.assert_async().await;
        feeds.assert_async().await;
        feeds_json.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_reports_last_failure() {
        let mut server = Server::new_async().await;
        let mut missing = Vec::new();
        for path in ["/feeds/index", "/feeds/index.json", "/feeds"] {
            missing.push(server.mock("GET", path).with_status(404).create_async().await);
        }
        let _last = server
            .mock("GET", "/feeds.json")
            .with_status(403)
            .with_body("Authentication failed")
            .create_async()
            .await;

        match client_for(&server).list_feeds("bad").await {
            Err(FetchError::AllStrategiesFailed { status, snippet }) => {
                assert_eq!(status, Some(403));
                assert_eq!(snippet, "Authentication failed");
            }
            other => panic!("expected AllStrategiesFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_feed_second_path() {
        let mut server = Server::new_async().await;
        let _view = server
            .mock("GET", "/feeds/view/3.json")
            .with_status(404)
            .create_async()
            .await;
        let _flat = server
            .mock("GET", "/feeds/3.json")
            .with_status(200)
            .with_body(json!({"Feed": {"id": "3", "name": "CIRCL"}}).to_string())
            .create_async()
            .await;

        let feed = client_for(&server).get_feed("3", "key").await.unwrap().unwrap();
        assert_eq!(feed.as_value()["Feed"]["name"], "CIRCL");
    }

    #[tokio::test]
    async fn test_get_feed_unparseable_200_stops() {
        let mut server = Server::new_async().await;
        let _view = server
            .mock("GET", "/feeds/view/3.json")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;
        let flat = server
            .mock("GET", "/feeds/3.json")
            .expect(0)
            .create_async()
            .await;

        assert!(client_for(&server).get_feed("3", "key").await.unwrap().is_none());
        flat.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_feed_not_found() {
        let mut server = Server::new_async().await;
        let _view = server
            .mock("GET", "/feeds/view/3.json")
            .with_status(404)
            .create_async()
            .await;
        let _flat = server
            .mock("GET", "/feeds/3.json")
            .with_status(404)
            .create_async()
            .await;

        assert!(client_for(&server).get_feed("3", "key").await.unwrap().is_none());
    }
}

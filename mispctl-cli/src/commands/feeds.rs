//! Single-step REST commands.

use anyhow::Result;
use mispctl_feeds::MispClient;

use crate::ExitCode;
use crate::config::Config;

fn require_api_key(config: &Config) -> Option<&str> {
    let key = config.api_key.as_deref();
    if key.is_none() {
        eprintln!("MISP_API_KEY is required");
    }
    key
}

fn ok_or_failed(ok: bool) -> &'static str {
    if ok { "OK" } else { "FAILED" }
}

/// `feeds-count` - prints the number of listed feeds.
pub async fn count(client: &MispClient, config: &Config) -> Result<i32> {
    let Some(api_key) = require_api_key(config) else {
        return Ok(ExitCode::MissingConfig.into());
    };
    let feeds = client.list_feeds(api_key).await?;
    println!("{}", feeds.len());
    Ok(ExitCode::Success.into())
}

/// `configure-feeds` - enables every feed and prints the summary.
pub async fn configure(client: &MispClient, config: &Config) -> Result<i32> {
    let Some(api_key) = require_api_key(config) else {
        return Ok(ExitCode::MissingConfig.into());
    };
    let summary = client.enable_all_feeds(api_key).await?;
    println!("{summary}");
    Ok(if summary.is_clean() {
        ExitCode::Success
    } else {
        ExitCode::EnableFailed
    }
    .into())
}

/// `cache-feeds` - triggers caching of all feeds.
pub async fn cache(client: &MispClient, config: &Config) -> Result<i32> {
    let Some(api_key) = require_api_key(config) else {
        return Ok(ExitCode::MissingConfig.into());
    };
    let ok = client.cache_all_feeds(api_key).await?;
    println!("{}", ok_or_failed(ok));
    Ok(if ok { ExitCode::Success } else { ExitCode::CacheFailed }.into())
}

/// `fetch-all-feeds` - triggers fetching from all feeds.
pub async fn fetch(client: &MispClient, config: &Config) -> Result<i32> {
    let Some(api_key) = require_api_key(config) else {
        return Ok(ExitCode::MissingConfig.into());
    };
    let ok = client.fetch_all_feeds(api_key).await?;
    println!("{}", ok_or_failed(ok));
    Ok(if ok { ExitCode::Success } else { ExitCode::FetchFailed }.into())
}

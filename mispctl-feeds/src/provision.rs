//! End-to-end provisioning.
//!
//! Health, login, default feeds, enable all, fetch all, cache all. Each stage
//! runs only if the previous one succeeded, writes one line to the report
//! sink, and maps its failure to a distinct [`ProvisionOutcome`].

use std::io::Write;
use std::time::Duration;

use mispctl_core::Credentials;
use mispctl_fetch::{HealthPoller, RetryPolicy};
use tracing::{error, info, instrument};

use crate::client::MispClient;
use crate::error::MispError;

/// Default pause between health polls.
const DEFAULT_HEALTH_INTERVAL_SECS: u64 = 10;

/// Default number of login attempts.
const DEFAULT_LOGIN_ATTEMPTS: u32 = 10;

/// Default pause between login attempts.
const DEFAULT_LOGIN_BACKOFF_SECS: u64 = 10;

// ============================================================================
// Settings
// ============================================================================

/// Timing knobs for [`provision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionSettings {
    /// Overall health budget; `None` waits forever.
    pub health_timeout: Option<Duration>,
    /// Pause between health polls.
    pub health_interval: Duration,
    /// Attempts and backoff for the whole login flow.
    pub login_retry: RetryPolicy,
}

impl Default for ProvisionSettings {
    fn default() -> Self {
        Self {
            health_timeout: None,
            health_interval: Duration::from_secs(DEFAULT_HEALTH_INTERVAL_SECS),
            login_retry: RetryPolicy::new(
                DEFAULT_LOGIN_ATTEMPTS,
                Duration::from_secs(DEFAULT_LOGIN_BACKOFF_SECS),
            ),
        }
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// How a provisioning run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// Every stage succeeded.
    Success,
    /// The server root never answered 200 within the budget.
    Unhealthy,
    /// Username or password not configured.
    MissingCredentials,
    /// Every login attempt failed.
    LoginFailed,
    /// The default feed catalogue could not be loaded.
    DefaultFeedLoadFailed,
    /// No API key configured.
    MissingApiKey,
    /// At least one feed could not be enabled.
    FeedEnableFailed,
    /// The fetch-all trigger was rejected.
    BulkFetchFailed,
    /// The cache-all trigger was rejected.
    BulkCacheFailed,
}

impl ProvisionOutcome {
    /// Process exit code for this outcome.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::MissingCredentials => 2,
            Self::Unhealthy => 9,
            Self::DefaultFeedLoadFailed => 10,
            Self::MissingApiKey => 11,
            Self::FeedEnableFailed => 12,
            Self::BulkFetchFailed => 13,
            Self::BulkCacheFailed => 14,
            Self::LoginFailed => 15,
        }
    }

    /// Returns true for [`ProvisionOutcome::Success`].
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Runs the full provisioning sequence against `client`.
///
/// Credentials and API key are checked lazily, at the stage that first
/// needs them. Transport faults in the REST stages abort with `Err`.
#[instrument(skip_all, fields(base_url = %client.http().base_url()))]
pub async fn provision<W: Write>(
    client: &MispClient,
    credentials: Option<&Credentials>,
    api_key: Option<&str>,
    settings: &ProvisionSettings,
    report: &mut W,
) -> Result<ProvisionOutcome, MispError> {
    let poller = HealthPoller::new()
        .with_timeout(settings.health_timeout)
        .with_interval(settings.health_interval);
    if !poller.wait_until_healthy(client.http()).await {
        writeln!(report, "health: FAILED (no 200 within timeout)")?;
        return Ok(ProvisionOutcome::Unhealthy);
    }
    writeln!(report, "health: OK")?;

    let Some(credentials) = credentials else {
        writeln!(report, "login: FAILED (username and password are required)")?;
        return Ok(ProvisionOutcome::MissingCredentials);
    };
    if let Err(e) = client
        .login_with_retries(credentials, &settings.login_retry)
        .await
    {
        error!(error = %e, "Login failed");
        writeln!(report, "login: FAILED ({e})")?;
        return Ok(ProvisionOutcome::LoginFailed);
    }
    writeln!(report, "login: OK")?;

    match client.load_default_feeds().await {
        Ok(response) => writeln!(report, "load-default-feeds: {}", response.status_code())?,
        Err(e) => {
            error!(error = %e, "Default feed load failed");
            writeln!(report, "load-default-feeds: FAILED ({e})")?;
            return Ok(ProvisionOutcome::DefaultFeedLoadFailed);
        }
    }

    let Some(api_key) = api_key.filter(|k| !k.is_empty()) else {
        writeln!(report, "api-key: MISSING (MISP_API_KEY)")?;
        return Ok(ProvisionOutcome::MissingApiKey);
    };

    let summary = client.enable_all_feeds(api_key).await?;
    writeln!(report, "configure-feeds: {summary}")?;
    if !summary.is_clean() {
        return Ok(ProvisionOutcome::FeedEnableFailed);
    }

    let fetched = client.fetch_all_feeds(api_key).await?;
    writeln!(report, "fetch-all-feeds: {}", ok_or_failed(fetched))?;
    if !fetched {
        return Ok(ProvisionOutcome::BulkFetchFailed);
    }

    let cached = client.cache_all_feeds(api_key).await?;
    writeln!(report, "cache-feeds: {}", ok_or_failed(cached))?;
    if !cached {
        return Ok(ProvisionOutcome::BulkCacheFailed);
    }

    info!("Provisioning complete");
    Ok(ProvisionOutcome::Success)
}

fn ok_or_failed(ok: bool) -> &'static str {
    if ok { "OK" } else { "FAILED" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let outcomes = [
            ProvisionOutcome::Success,
            ProvisionOutcome::Unhealthy,
            ProvisionOutcome::MissingCredentials,
            ProvisionOutcome::LoginFailed,
            ProvisionOutcome::DefaultFeedLoadFailed,
            ProvisionOutcome::MissingApiKey,
            ProvisionOutcome::FeedEnableFailed,
            ProvisionOutcome::BulkFetchFailed,
            ProvisionOutcome::BulkCacheFailed,
        ];
        let mut codes: Vec<i32> = outcomes.iter().map(|o| o.exit_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), outcomes.len());
        assert_eq!(ProvisionOutcome::Success.exit_code(), 0);
        assert_eq!(ProvisionOutcome::Unhealthy.exit_code(), 9);
        assert_eq!(ProvisionOutcome::BulkCacheFailed.exit_code(), 14);
    }

    #[test]
    fn test_default_settings() {
        let settings = ProvisionSettings::default();
        assert_eq!(settings.health_timeout, None);
        assert_eq!(settings.health_interval, Duration::from_secs(10));
        assert_eq!(settings.login_retry.max_attempts, 10);
        assert_eq!(settings.login_retry.backoff, Duration::from_secs(10));
    }
}

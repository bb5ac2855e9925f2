//! `provision-feeds` - the full provisioning sequence.

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use mispctl_feeds::{MispClient, ProvisionSettings, provision};
use mispctl_fetch::RetryPolicy;

use crate::config::Config;

/// Arguments for the provision-feeds command.
#[derive(Args, Debug)]
pub struct ProvisionArgs {
    /// Give up waiting for the server after this many seconds (default: wait forever).
    #[arg(long)]
    pub health_timeout: Option<u64>,

    /// Seconds between health polls.
    #[arg(long, default_value_t = 10)]
    pub health_interval: u64,

    /// Login attempts before giving up.
    #[arg(long, default_value_t = 10)]
    pub login_attempts: u32,

    /// Seconds between login attempts.
    #[arg(long, default_value_t = 10)]
    pub login_backoff: u64,
}

impl ProvisionArgs {
    fn settings(&self) -> ProvisionSettings {
        ProvisionSettings {
            health_timeout: self.health_timeout.map(Duration::from_secs),
            health_interval: Duration::from_secs(self.health_interval),
            login_retry: RetryPolicy::new(
                self.login_attempts,
                Duration::from_secs(self.login_backoff),
            ),
        }
    }
}

/// Runs the provision-feeds command.
pub async fn run(args: &ProvisionArgs, client: &MispClient, config: &Config) -> Result<i32> {
    let credentials = config.credentials().ok();
    let mut stdout = std::io::stdout();
    let outcome = provision(
        client,
        credentials.as_ref(),
        config.api_key.as_deref(),
        &args.settings(),
        &mut stdout,
    )
    .await?;
    Ok(outcome.exit_code())
}

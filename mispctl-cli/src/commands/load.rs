//! `load-default-feeds` - single login, then load the default catalogue.

use anyhow::Result;
use mispctl_feeds::{MispClient, MispError};

use crate::ExitCode;
use crate::config::Config;

/// Runs the load-default-feeds command.
pub async fn run(client: &MispClient, config: &Config) -> Result<i32> {
    let credentials = match config.credentials() {
        Ok(credentials) => credentials,
        Err(e) => {
            eprintln!("{e}");
            return Ok(ExitCode::MissingConfig.into());
        }
    };

    client.login(&credentials).await?;

    match client.load_default_feeds().await {
        Ok(response) => {
            println!("Status: {}", response.status_code());
            println!("OK");
            Ok(ExitCode::Success.into())
        }
        Err(MispError::LoadDefaultFeedsFailed(status)) => {
            println!("Status: {status}");
            println!("FAILED");
            Ok(ExitCode::Error.into())
        }
        Err(e) => Err(e.into()),
    }
}

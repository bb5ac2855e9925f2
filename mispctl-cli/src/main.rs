// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! mispctl - provision MISP feeds as a scripted user.
//!
//! # Examples
//!
//! ```bash
//! # Wait for the server, log in, then enable, fetch and cache every feed
//! mispctl provision-feeds
//!
//! # Give up if the server is not up within ten minutes
//! mispctl provision-feeds --health-timeout 600
//!
//! # Individual steps
//! mispctl load-default-feeds
//! mispctl feeds-count
//! mispctl configure-feeds --debug
//! ```

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{feeds, load, provision};
use config::Config;

// ============================================================================
// CLI Definition
// ============================================================================

/// mispctl - MISP feed provisioning.
#[derive(Parser)]
#[command(name = "mispctl")]
#[command(about = "Provision MISP threat-intelligence feeds as a robot user")]
#[command(long_about = r#"
mispctl drives a MISP server through its web form and REST API: it waits for
the server to come up, logs in, loads the default feed catalogue, then
enables, fetches and caches every feed.

Configuration comes from the environment (a .env file is honoured):
  MISP_BASE_URL               Server base URL
  MISP_USERNAME/MISP_PASSWORD Web login
  MISP_API_KEY                REST API key
  MISP_CERT_VALIDATION        0/false/no/off/n disables TLS verification
  MISP_CA_CERT                CA bundle path or inline PEM
"#)]
#[command(version)]
pub struct Cli {
    /// Command to run.
    #[command(subcommand)]
    pub command: Commands,

    /// MISP base URL.
    #[arg(long, env = "MISP_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Verbose debug logging.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 30, global = true)]
    pub timeout: u64,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Log in and load the default feed catalogue.
    LoadDefaultFeeds,

    /// Print the number of configured feeds.
    FeedsCount,

    /// Enable and turn on caching for every feed.
    ConfigureFeeds,

    /// Trigger caching of all feeds.
    CacheFeeds,

    /// Trigger fetching from all feeds.
    FetchAllFeeds,

    /// Run the full provisioning sequence.
    ProvisionFeeds(provision::ProvisionArgs),
}

/// CLI exit codes for the single-step commands.
///
/// `provision-feeds` maps its own outcomes, see
/// [`ProvisionOutcome::exit_code`](mispctl_feeds::ProvisionOutcome::exit_code).
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Required configuration missing.
    MissingConfig = 2,
    /// At least one feed could not be enabled.
    EnableFailed = 3,
    /// Cache-all trigger rejected.
    CacheFailed = 4,
    /// Fetch-all trigger rejected.
    FetchFailed = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("mispctl=debug,warn")
        } else {
            EnvFilter::new("mispctl=info,warn")
        }
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    setup_logging(cli.debug);

    let code = match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::Error.into()
        }
    };
    std::process::exit(code);
}

async fn run(cli: &Cli) -> Result<i32> {
    let Some(base_url) = cli.base_url.as_deref().filter(|u| !u.trim().is_empty()) else {
        eprintln!("MISP_BASE_URL is required (via --base-url or env)");
        return Ok(ExitCode::MissingConfig.into());
    };

    let config = Config::from_env()?;
    let client = config.connect(base_url, std::time::Duration::from_secs(cli.timeout))?;

    match &cli.command {
        Commands::LoadDefaultFeeds => load::run(&client, &config).await,
        Commands::FeedsCount => feeds::count(&client, &config).await,
        Commands::ConfigureFeeds => feeds::configure(&client, &config).await,
        Commands::CacheFeeds => feeds::cache(&client, &config).await,
        Commands::FetchAllFeeds => feeds::fetch(&client, &config).await,
        Commands::ProvisionFeeds(args) => provision::run(args, &client, &config).await,
    }
}

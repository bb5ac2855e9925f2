// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # mispctl Feeds
//!
//! Drives a MISP server the way an operator would: logs in through the web
//! form, loads the default feed catalogue, then configures and triggers the
//! feeds through the REST API.
//!
//! | Operation | Surface | Auth |
//! |-----------|---------|------|
//! | [`MispClient::login`] | `users/login` form | username/password |
//! | [`MispClient::load_default_feeds`] | `Feeds` page + form | session cookie |
//! | [`MispClient::list_feeds`] | REST, four path variants | API key |
//! | [`MispClient::get_feed`] | REST, two path variants | API key |
//! | [`MispClient::enable_feed`] | REST, five-stage ladder | API key |
//! | [`MispClient::cache_all_feeds`] | REST bulk trigger | API key |
//! | [`MispClient::fetch_all_feeds`] | REST bulk trigger | API key |
//!
//! [`provision`] runs the whole sequence and reports one line per stage.
//!
//! ## Usage
//!
//! ```ignore
//! use mispctl_feeds::{MispClient, ProvisionSettings, provision};
//!
//! let client = MispClient::new(http);
//! let outcome = provision(&client, Some(&creds), Some(&key), &ProvisionSettings::default(), &mut std::io::stdout()).await?;
//! std::process::exit(outcome.exit_code());
//! ```

pub mod api;
pub mod batch;
pub mod client;
pub mod error;
pub mod loader;
pub mod login;
pub mod provision;

pub use client::MispClient;
pub use error::MispError;
pub use provision::{ProvisionOutcome, ProvisionSettings, provision};

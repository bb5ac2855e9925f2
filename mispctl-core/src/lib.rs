// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `mispctl` Core
//!
//! Core types shared by the `mispctl` crates.
//!
//! - [`Credentials`] - Username/password pair used for the HTML login
//! - [`TokenTriplet`] - Anti-forgery form fields scraped from a page
//! - [`FeedDescriptor`] - A feed as returned by the REST API (flat or enveloped)
//! - [`EnableSummary`] - Counters produced by enabling every feed
//! - [`CoreError`] - Error type for model validation

pub mod error;
pub mod models;

pub use error::CoreError;

pub use models::{
    Credentials, EnableSummary, FEED_ENVELOPE_KEY, FeedDescriptor, TOKEN_FIELDS_FIELD,
    TOKEN_KEY_FIELD, TOKEN_UNLOCKED_FIELD, TokenTriplet,
};

//! Domain models for `mispctl`.
//!
//! - [`credentials`] - Login credentials
//! - [`token`] - Anti-forgery token triplet
//! - [`feed`] - Feed descriptors as returned by the REST API
//! - [`summary`] - Enable-all summary counters

mod credentials;
mod feed;
mod summary;
mod token;

pub use credentials::Credentials;
pub use feed::{FEED_ENVELOPE_KEY, FeedDescriptor};
pub use summary::EnableSummary;
pub use token::{TOKEN_FIELDS_FIELD, TOKEN_KEY_FIELD, TOKEN_UNLOCKED_FIELD, TokenTriplet};

//! Errors raised by the web-form flows and the provisioning driver.

use mispctl_fetch::{FetchError, HttpError};
use thiserror::Error;

/// Errors from login, default-feed loading, and provisioning.
#[derive(Debug, Error)]
pub enum MispError {
    /// Transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// REST operation failure.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The login page could not be loaded.
    #[error("Failed to load login page: status {0}")]
    LoginPageUnavailable(u16),

    /// The login submission was answered with an error status.
    #[error("Login POST failed: status {0}")]
    LoginRejected(u16),

    /// Neither the login response nor the dashboard shows a logout link.
    #[error("Login may have failed (logout link not found)")]
    LogoutLinkMissing,

    /// The feeds page could not be loaded.
    #[error("Failed to load Feeds page: status {0}")]
    FeedsPageUnavailable(u16),

    /// The default-feed load request was answered with an error status.
    #[error("loadDefaultFeeds failed: status {0}")]
    LoadDefaultFeedsFailed(u16),

    /// Writing the stage report failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

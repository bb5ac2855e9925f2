//! Certificate verification setting for the HTTP session.

use std::path::{Path, PathBuf};

/// How the session verifies the server certificate.
///
/// Resolved once from configuration and handed to
/// [`HttpClientBuilder::tls`](crate::HttpClientBuilder::tls).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// Accept any certificate.
    Disabled,
    /// Verify against the built-in root store.
    #[default]
    System,
    /// Verify against the PEM bundle at this path only.
    CaBundle(PathBuf),
}

impl TlsVerification {
    /// Returns the bundle path, if one is configured.
    pub fn bundle_path(&self) -> Option<&Path> {
        match self {
            Self::CaBundle(path) => Some(path),
            _ => None,
        }
    }
}

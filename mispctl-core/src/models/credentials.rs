//! Login credentials.

use std::fmt;

use crate::error::CoreError;

/// Username and password for the HTML login form.
///
/// Supplied once at process start and never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates credentials, rejecting empty values.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self, CoreError> {
        let username = username.into();
        let password = password.into();
        if username.is_empty() || password.is_empty() {
            return Err(CoreError::MissingConfig(
                "username and password must both be set".to_string(),
            ));
        }
        Ok(Self { username, password })
    }

    /// The login email / username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The password.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

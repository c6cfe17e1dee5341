//! Transient login data.

use serde::Serialize;
use std::fmt;

/// A username/password pair for opening an SFTP or SSH session.
///
/// Produced fresh per request and never persisted.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct LoginData {
    /// SFTP username.
    pub username: String,

    /// Freshly rotated password.
    pub password: String,

    /// SFTP hostname, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl LoginData {
    /// Creates login data without a host.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            host: None,
        }
    }

    /// Attaches the SFTP hostname.
    pub fn with_host(mut self, host: Option<String>) -> Self {
        self.host = host;
        self
    }
}

impl fmt::Debug for LoginData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginData")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .finish()
    }
}

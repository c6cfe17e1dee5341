//! Bearer token model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How long a freshly issued token is trusted, in seconds.
///
/// The control plane expires tokens after 60 minutes; trusting them for 59
/// keeps requests clear of the server-side boundary.
pub const DEFAULT_VALIDITY_WINDOW_SECS: i64 = 59 * 60;

/// A bearer token plus the moment it was issued.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialToken {
    /// Opaque access token presented as `Authorization: Bearer`.
    pub access_token: String,

    /// Opaque refresh token, if the grant returned one.
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// When the token was issued.
    pub issued_at: DateTime<Utc>,
}

impl CredentialToken {
    /// Creates a token issued now.
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            issued_at: Utc::now(),
        }
    }

    /// Overrides the issuance time.
    pub fn with_issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        self.issued_at = issued_at;
        self
    }

    /// Returns the default validity window.
    pub fn default_validity_window() -> Duration {
        Duration::seconds(DEFAULT_VALIDITY_WINDOW_SECS)
    }

    /// Age of the token at `now`.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now - self.issued_at
    }

    /// Returns true while `now - issued_at < window`.
    pub fn is_valid_at(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.age_at(now) < window
    }

    /// The instant after which the token is no longer trusted.
    pub fn valid_until(&self, window: Duration) -> DateTime<Utc> {
        self.issued_at + window
    }
}

impl fmt::Debug for CredentialToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialToken")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

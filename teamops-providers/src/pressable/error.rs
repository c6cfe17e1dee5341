//! Pressable-specific errors.

use teamops_core::SiteId;
use teamops_fetch::{CodecError, HttpError};
use thiserror::Error;

/// Pressable-specific errors.
///
/// Configuration and authentication failures are fatal: retrying with the
/// same credentials cannot succeed, and repeated 401s risk locking the
/// account. Everything else is recoverable and leaves the caller with no
/// result for that call.
#[derive(Debug, Error)]
pub enum PressableError {
    /// Client id or secret is missing, or neither a password grant nor a
    /// refresh token is configured.
    #[error("No usable Pressable credentials: {0}")]
    AuthConfiguration(String),

    /// The token endpoint did not hand out an access token.
    #[error("Token exchange failed: {0}")]
    AuthExchange(String),

    /// A call was rejected with HTTP 401.
    #[error("Authentication rejected (HTTP 401) by {endpoint}")]
    Authentication {
        /// Endpoint that answered 401.
        endpoint: String,
    },

    /// Any other non-2xx response, or no response at all.
    #[error("Pressable API error{}: {message}", status_suffix(.status))]
    RemoteApi {
        /// HTTP status, `None` when the request failed before a response.
        status: Option<u16>,
        /// Message extracted from the response body.
        message: String,
    },

    /// Polling exhausted without the collaborator becoming visible.
    #[error("Could not find collaborator {email} on site {site_id} after {attempts} attempts")]
    CollaboratorNotFound {
        /// Site that was searched.
        site_id: SiteId,
        /// Email that was searched for.
        email: String,
        /// Number of lookups performed.
        attempts: u32,
    },

    /// The token could not be persisted.
    #[error("Failed to cache token: {0}")]
    CacheWrite(String),

    /// The body was JSON but not the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The configuration is unusable (e.g. malformed URL).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl PressableError {
    /// Returns true for errors that must stop the whole operation.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PressableError::AuthConfiguration(_)
                | PressableError::AuthExchange(_)
                | PressableError::Authentication { .. }
                | PressableError::InvalidConfig(_)
        )
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            PressableError::RemoteApi { status, .. } => *status,
            PressableError::Authentication { .. } => Some(401),
            _ => None,
        }
    }

    /// What the operator should check.
    pub fn operator_hint(&self) -> &'static str {
        match self {
            PressableError::AuthConfiguration(_) => {
                "Set pressable.client_id and pressable.client_secret, plus either \
                 account_email/account_password or a refresh_token, in the config file, \
                 the TEAMOPS_PRESSABLE_* environment variables or the keychain."
            }
            PressableError::AuthExchange(_) => {
                "Check the API application's client ID/secret and the account \
                 credentials in the Pressable dashboard."
            }
            PressableError::Authentication { .. } => {
                "Stopped to avoid an account lockout. Verify the credentials before \
                 running again; delete the token cache if it holds a revoked token."
            }
            PressableError::RemoteApi { .. } => {
                "The Pressable API rejected the call; check the site ID and try again later."
            }
            PressableError::CollaboratorNotFound { .. } => {
                "The collaborator may still be propagating; retry in a minute or \
                 check the site's SFTP users in the dashboard."
            }
            PressableError::CacheWrite(_) => {
                "Check permissions and free space of the cache directory."
            }
            PressableError::InvalidResponse(_) => {
                "The Pressable API returned an unexpected payload."
            }
            PressableError::InvalidConfig(_) => "Fix the value in the config file.",
        }
    }
}

impl From<HttpError> for PressableError {
    fn from(err: HttpError) -> Self {
        let message = if err.is_timeout() {
            format!("Request timed out: {err}")
        } else {
            err.to_string()
        };
        PressableError::RemoteApi {
            status: None,
            message,
        }
    }
}

impl From<CodecError> for PressableError {
    fn from(err: CodecError) -> Self {
        PressableError::InvalidResponse(err.to_string())
    }
}

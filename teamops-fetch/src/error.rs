//! Error types for transport, codec and keychain operations.

use thiserror::Error;

// ============================================================================
// HTTP Error
// ============================================================================

/// HTTP transport error.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request could not be sent or the response could not be read.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Request body could not be encoded.
    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] CodecError),

    /// Timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),
}

impl HttpError {
    /// Returns true if the request never produced a response in time.
    pub fn is_timeout(&self) -> bool {
        match self {
            HttpError::Timeout(_) => true,
            HttpError::Request(e) => e.is_timeout(),
            _ => false,
        }
    }
}

// ============================================================================
// Codec Error
// ============================================================================

/// JSON codec error.
#[derive(Debug, Error)]
pub enum CodecError {
    /// JSON was valid but did not match the expected shape.
    #[error("Unexpected JSON shape for {target}: {source}")]
    Shape {
        /// Name of the type being decoded.
        target: &'static str,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// Value could not be encoded.
    #[error("Failed to encode JSON: {0}")]
    Encode(#[source] serde_json::Error),
}

// ============================================================================
// Keychain Error
// ============================================================================

/// Error type for keychain operations.
#[derive(Debug, Error)]
pub enum KeychainError {
    /// Access denied.
    #[error("Access denied to keychain")]
    AccessDenied,

    /// Platform error.
    #[error("Platform error: {0}")]
    Platform(String),

    /// Generic error.
    #[error("Keychain error: {0}")]
    Other(String),
}

impl From<keyring::Error> for KeychainError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::PlatformFailure(e) => KeychainError::Platform(e.to_string()),
            keyring::Error::NoStorageAccess(_) => KeychainError::AccessDenied,
            _ => KeychainError::Other(err.to_string()),
        }
    }
}

//! Persisted control-plane bearer token.
//!
//! The on-disk record keeps the field names of existing cache files:
//!
//! ```json
//! {
//!   "access_token": "...",
//!   "refresh_token": "...",
//!   "created_at": 1735000000
//! }
//! ```
//!
//! `created_at` is in Unix seconds. A record is trusted while
//! `now - created_at` is below the validity window (59 minutes by default).
//!
//! The cache is single-tenant and last-writer-wins: two processes racing to
//! refresh may both acquire tokens, and whichever writes last is kept.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use teamops_core::CredentialToken;
use tracing::{debug, instrument, warn};

use crate::error::StoreError;
use crate::persistence::{default_token_cache_path, load_json, save_json};

/// On-disk token record.
#[derive(Serialize, Deserialize)]
struct TokenRecord {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    created_at: i64,
}

impl TokenRecord {
    fn into_token(self) -> Option<CredentialToken> {
        let issued_at = Utc.timestamp_opt(self.created_at, 0).single()?;
        Some(CredentialToken {
            access_token: self.access_token,
            refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
            issued_at,
        })
    }
}

impl From<&CredentialToken> for TokenRecord {
    fn from(token: &CredentialToken) -> Self {
        Self {
            access_token: token.access_token.clone(),
            refresh_token: token.refresh_token.clone(),
            created_at: token.issued_at.timestamp(),
        }
    }
}

/// File-backed cache of the control-plane bearer token.
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
    validity: Duration,
}

impl TokenCache {
    /// Cache at the fixed default location.
    pub fn new() -> Self {
        Self::at(default_token_cache_path())
    }

    /// Cache at a specific path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            validity: CredentialToken::default_validity_window(),
        }
    }

    /// Overrides the validity window.
    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = validity;
        self
    }

    /// Path of the cache file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validity window.
    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Returns the cached token if it is still valid now.
    pub async fn read(&self) -> Option<CredentialToken> {
        self.read_at(Utc::now()).await
    }

    /// Returns the cached token if it is still valid at `now`.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn read_at(&self, now: DateTime<Utc>) -> Option<CredentialToken> {
        let token = self.load().await?;

        if token.is_valid_at(now, self.validity) {
            debug!(age_secs = token.age_at(now).num_seconds(), "Cached token is valid");
            Some(token)
        } else {
            debug!(age_secs = token.age_at(now).num_seconds(), "Cached token expired");
            None
        }
    }

    /// Returns the last persisted token regardless of its age.
    ///
    /// `None` when there is no record or it cannot be parsed.
    pub async fn load(&self) -> Option<CredentialToken> {
        match load_json::<TokenRecord>(&self.path).await {
            Ok(record) => {
                let token = record.into_token();
                if token.is_none() {
                    warn!(path = %self.path.display(), "Token cache has an invalid timestamp");
                }
                token
            }
            Err(e) if e.is_not_found() => {
                debug!(path = %self.path.display(), "No token cache");
                None
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable token cache");
                None
            }
        }
    }

    /// Refresh token of the last persisted record, even when expired.
    pub async fn last_refresh_token(&self) -> Option<String> {
        self.load().await.and_then(|t| t.refresh_token)
    }

    /// Persists the token, replacing any previous record.
    ///
    /// Callers treat an error as "proceed without caching".
    #[instrument(skip(self, token), fields(path = %self.path.display()))]
    pub async fn write(&self, token: &CredentialToken) -> Result<(), StoreError> {
        save_json(&self.path, &TokenRecord::from(token)).await?;
        debug!("Token cached");
        Ok(())
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cache_in(dir: &TempDir) -> TokenCache {
        TokenCache::at(dir.path().join("pressable-token.json"))
    }

    #[tokio::test]
    async fn test_read_respects_validity_window() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);

        let issued = Utc.timestamp_opt(Utc::now().timestamp(), 0).unwrap();
        let token = CredentialToken::new("T1", Some("R1".into())).with_issued_at(issued);
        cache.write(&token).await.unwrap();

        let window = cache.validity();
        let before = cache.read_at(issued + window - Duration::seconds(1)).await;
        let after = cache.read_at(issued + window + Duration::seconds(1)).await;

        assert_eq!(before, Some(token));
        assert_eq!(after, None);
    }

    #[tokio::test]
    async fn test_hour_old_record_is_absent() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);

        let created_at = Utc::now().timestamp() - 3600;
        let raw = format!(
            r#"{{"access_token":"old","refresh_token":"R0","created_at":{created_at}}}"#
        );
        tokio::fs::write(cache.path(), raw).await.unwrap();

        assert!(cache.read().await.is_none());
        // The refresh token stays usable for the refresh grant.
        assert_eq!(cache.last_refresh_token().await.as_deref(), Some("R0"));
    }

    #[tokio::test]
    async fn test_missing_file_is_absent() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);

        assert!(cache.read().await.is_none());
        assert!(cache.last_refresh_token().await.is_none());
    }

    #[tokio::test]
    async fn test_unparsable_file_is_absent() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);

        tokio::fs::write(cache.path(), "{not json").await.unwrap();
        assert!(cache.read().await.is_none());

        tokio::fs::write(cache.path(), r#"{"access_token":"x"}"#)
            .await
            .unwrap();
        assert!(cache.read().await.is_none());
    }

    #[tokio::test]
    async fn test_written_record_keeps_field_names() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);

        let token = CredentialToken::new("T1", Some("R1".into()));
        cache.write(&token).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&tokio::fs::read_to_string(cache.path()).await.unwrap()).unwrap();
        assert_eq!(raw["access_token"], "T1");
        assert_eq!(raw["refresh_token"], "R1");
        assert_eq!(raw["created_at"], token.issued_at.timestamp());
    }

    #[tokio::test]
    async fn test_write_replaces_previous_record() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);

        cache.write(&CredentialToken::new("T1", None)).await.unwrap();
        cache
            .write(&CredentialToken::new("T2", Some("R2".into())))
            .await
            .unwrap();

        let token = cache.read().await.unwrap();
        assert_eq!(token.access_token, "T2");
        assert_eq!(token.refresh_token.as_deref(), Some("R2"));
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        tokio::fs::write(&blocker, "x").await.unwrap();

        let cache = TokenCache::at(blocker.join("pressable-token.json"));
        assert!(cache.write(&CredentialToken::new("T1", None)).await.is_err());
    }

    #[tokio::test]
    async fn test_custom_validity() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir).with_validity(Duration::seconds(10));

        let issued = Utc::now() - Duration::seconds(30);
        cache
            .write(&CredentialToken::new("T1", None).with_issued_at(issued))
            .await
            .unwrap();

        assert!(cache.read().await.is_none());
    }
}

//! Bearer token acquisition.
//!
//! The token endpoint takes a form body with the API application's client
//! credentials plus one grant:
//!
//! - `grant_type=password` with `username`/`password`
//! - `grant_type=refresh_token` with `refresh_token`
//!
//! The password grant wins whenever it is fully configured.

use std::fmt;

use serde::Deserialize;
use teamops_core::CredentialToken;
use teamops_fetch::{HttpRequest, HttpTransport};
use teamops_store::{PressableConfig, TokenCache};
use tracing::{debug, info, instrument, warn};

use super::error::PressableError;
use super::parser;

// ============================================================================
// Grant
// ============================================================================

/// Credentials presented to the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub enum Grant {
    /// Account email and password.
    Password {
        /// Account email.
        username: String,
        /// Account password.
        password: String,
    },
    /// A previously issued refresh token.
    RefreshToken {
        /// The refresh token.
        refresh_token: String,
    },
}

impl Grant {
    /// The `grant_type` form value.
    pub fn kind(&self) -> &'static str {
        match self {
            Grant::Password { .. } => "password",
            Grant::RefreshToken { .. } => "refresh_token",
        }
    }

    fn form_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Grant::Password { username, password } => vec![
                ("username", username.clone()),
                ("password", password.clone()),
            ],
            Grant::RefreshToken { refresh_token } => {
                vec![("refresh_token", refresh_token.clone())]
            }
        }
    }
}

impl fmt::Debug for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grant::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Grant::RefreshToken { .. } => f
                .debug_struct("RefreshToken")
                .field("refresh_token", &"<redacted>")
                .finish(),
        }
    }
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

// ============================================================================
// Auth
// ============================================================================

/// Exchanges configured credentials for bearer tokens and caches them.
#[derive(Debug, Clone)]
pub struct PressableAuth {
    transport: HttpTransport,
    token_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    account_email: Option<String>,
    account_password: Option<String>,
    configured_refresh_token: Option<String>,
    cache: TokenCache,
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

impl PressableAuth {
    /// Creates the authenticator from resolved configuration.
    pub fn new(config: &PressableConfig, transport: HttpTransport, cache: TokenCache) -> Self {
        Self {
            transport,
            token_url: config.token_url.clone(),
            client_id: non_empty(config.client_id.as_ref()),
            client_secret: non_empty(config.client_secret.as_ref()),
            account_email: non_empty(config.account_email.as_ref()),
            account_password: non_empty(config.account_password.as_ref()),
            configured_refresh_token: non_empty(config.refresh_token.as_ref()),
            cache,
        }
    }

    /// The token cache this authenticator writes to.
    pub fn token_cache(&self) -> &TokenCache {
        &self.cache
    }

    /// Returns true when both halves of the password grant are configured.
    pub fn has_password_grant(&self) -> bool {
        self.account_email.is_some() && self.account_password.is_some()
    }

    /// Picks the grant to use.
    ///
    /// Password grant first; otherwise the cached refresh token, then the
    /// configured one.
    pub fn select_grant(&self, cached_refresh: Option<String>) -> Result<Grant, PressableError> {
        if let (Some(username), Some(password)) = (&self.account_email, &self.account_password) {
            return Ok(Grant::Password {
                username: username.clone(),
                password: password.clone(),
            });
        }

        cached_refresh
            .filter(|t| !t.is_empty())
            .or_else(|| self.configured_refresh_token.clone())
            .map(|refresh_token| Grant::RefreshToken { refresh_token })
            .ok_or_else(|| {
                PressableError::AuthConfiguration(
                    "neither account email/password nor a refresh token is available".to_string(),
                )
            })
    }

    /// Obtains a fresh token and caches it.
    ///
    /// A cache write failure is logged; the token is still returned.
    #[instrument(skip(self))]
    pub async fn acquire(&self) -> Result<CredentialToken, PressableError> {
        let (client_id, client_secret) = match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => (id.clone(), secret.clone()),
            _ => {
                return Err(PressableError::AuthConfiguration(
                    "client_id and client_secret are required".to_string(),
                ));
            }
        };

        let cached_refresh = if self.has_password_grant() {
            None
        } else {
            self.cache.last_refresh_token().await
        };
        let grant = self.select_grant(cached_refresh)?;
        debug!(grant = grant.kind(), "Requesting token");

        let token = self.exchange(&grant, client_id, client_secret).await?;
        info!(grant = grant.kind(), "Acquired Pressable token");

        if let Err(e) = self.cache.write(&token).await {
            let err = PressableError::CacheWrite(e.to_string());
            warn!(error = %err, "Proceeding without a cached token");
        }

        Ok(token)
    }

    async fn exchange(
        &self,
        grant: &Grant,
        client_id: String,
        client_secret: String,
    ) -> Result<CredentialToken, PressableError> {
        let mut form = vec![
            ("grant_type", grant.kind().to_string()),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ];
        form.extend(grant.form_fields());

        let response = self
            .transport
            .send(HttpRequest::post(&self.token_url).form(form))
            .await
            .map_err(|e| PressableError::AuthExchange(e.to_string()))?;

        if response.status == 401 {
            warn!("Token endpoint rejected the credentials");
            return Err(PressableError::Authentication {
                endpoint: self.token_url.clone(),
            });
        }

        if !response.is_success() {
            let reason = parser::error_message(response.body.as_ref())
                .unwrap_or_else(|| "no error message".to_string());
            return Err(PressableError::AuthExchange(format!(
                "HTTP {}: {reason}",
                response.status
            )));
        }

        let parsed: TokenResponse = response
            .body
            .map(serde_json::from_value::<TokenResponse>)
            .transpose()
            .map_err(|e| PressableError::AuthExchange(format!("unexpected token response: {e}")))?
            .ok_or_else(|| PressableError::AuthExchange("empty token response".to_string()))?;

        let access_token = parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                PressableError::AuthExchange("response has no access_token".to_string())
            })?;

        // Keep the refresh token we used when the server does not rotate it.
        let refresh_token = parsed.refresh_token.filter(|t| !t.is_empty()).or_else(|| {
            match grant {
                Grant::RefreshToken { refresh_token } => Some(refresh_token.clone()),
                Grant::Password { .. } => None,
            }
        });

        Ok(CredentialToken::new(access_token, refresh_token))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn base_config(server: &MockServer) -> PressableConfig {
        PressableConfig {
            token_url: format!("{}/auth/token", server.uri()),
            client_id: Some("cid".into()),
            client_secret: Some("csecret".into()),
            ..PressableConfig::default()
        }
    }

    fn with_password(mut config: PressableConfig) -> PressableConfig {
        config.account_email = Some("ops@example.com".into());
        config.account_password = Some("hunter2".into());
        config
    }

    fn auth(config: &PressableConfig, dir: &TempDir) -> PressableAuth {
        PressableAuth::new(
            config,
            HttpTransport::new().unwrap(),
            TokenCache::at(dir.path().join("pressable-token.json")),
        )
    }

    #[tokio::test]
    async fn test_acquire_with_password_grant_writes_cache() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();

        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .and(body_string_contains("grant_type=password"))
            .and(body_string_contains("client_id=cid"))
            .and(body_string_contains("client_secret=csecret"))
            .and(body_string_contains("password=hunter2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "T1", "refresh_token": "R1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let auth = auth(&with_password(base_config(&server)), &dir);
        let before = Utc::now() - Duration::seconds(1);
        let token = auth.acquire().await.unwrap();

        assert_eq!(token.access_token, "T1");
        assert_eq!(token.refresh_token.as_deref(), Some("R1"));

        let cached = auth.token_cache().read().await.unwrap();
        assert_eq!(cached.access_token, "T1");
        assert!(cached.issued_at >= before);
        assert!(cached.issued_at <= Utc::now());
    }

    #[tokio::test]
    async fn test_password_grant_preferred_over_refresh_token() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();

        Mock::given(method("POST"))
            .and(body_string_contains("grant_type=password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "T1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "T2"})))
            .expect(0)
            .mount(&server)
            .await;

        let mut config = with_password(base_config(&server));
        config.refresh_token = Some("R-config".into());
        let auth = auth(&config, &dir);

        // A cached refresh token does not change the choice either.
        let stale = CredentialToken::new("old", Some("R-cached".into()))
            .with_issued_at(Utc::now() - Duration::hours(2));
        auth.token_cache().write(&stale).await.unwrap();

        assert!(matches!(
            auth.select_grant(Some("R-cached".into())).unwrap(),
            Grant::Password { .. }
        ));
        assert_eq!(auth.acquire().await.unwrap().access_token, "T1");
    }

    #[tokio::test]
    async fn test_refresh_grant_uses_cached_refresh_token() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();

        Mock::given(method("POST"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=R-cached"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "T2"})))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = base_config(&server);
        config.refresh_token = Some("R-config".into());
        let auth = auth(&config, &dir);

        let stale = CredentialToken::new("old", Some("R-cached".into()))
            .with_issued_at(Utc::now() - Duration::hours(2));
        auth.token_cache().write(&stale).await.unwrap();

        let token = auth.acquire().await.unwrap();
        assert_eq!(token.access_token, "T2");
        // Not rotated by the server, so the used one is kept.
        assert_eq!(token.refresh_token.as_deref(), Some("R-cached"));
    }

    #[tokio::test]
    async fn test_refresh_grant_falls_back_to_configured_token() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();

        Mock::given(method("POST"))
            .and(body_string_contains("refresh_token=R-config"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "T3", "refresh_token": "R-new"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut config = base_config(&server);
        config.refresh_token = Some("R-config".into());
        let auth = auth(&config, &dir);

        let token = auth.acquire().await.unwrap();
        assert_eq!(token.refresh_token.as_deref(), Some("R-new"));
        assert_eq!(
            auth.token_cache().last_refresh_token().await.as_deref(),
            Some("R-new")
        );
    }

    #[tokio::test]
    async fn test_no_grant_is_configuration_error() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = auth(&base_config(&server), &dir).acquire().await.unwrap_err();
        assert!(matches!(err, PressableError::AuthConfiguration(_)));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_missing_client_credentials_is_configuration_error() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();

        let mut config = with_password(base_config(&server));
        config.client_secret = Some(String::new());

        let err = auth(&config, &dir).acquire().await.unwrap_err();
        assert!(matches!(err, PressableError::AuthConfiguration(_)));
    }

    #[tokio::test]
    async fn test_response_without_access_token() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "Bearer"})))
            .mount(&server)
            .await;

        let auth = auth(&with_password(base_config(&server)), &dir);
        let err = auth.acquire().await.unwrap_err();

        assert!(matches!(err, PressableError::AuthExchange(_)));
        assert!(auth.token_cache().read().await.is_none());
    }

    #[tokio::test]
    async fn test_rejected_exchange() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_client"})),
            )
            .mount(&server)
            .await;

        let err = auth(&with_password(base_config(&server)), &dir)
            .acquire()
            .await
            .unwrap_err();

        match err {
            PressableError::AuthExchange(message) => assert!(message.contains("invalid_client")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_token_endpoint_401_is_authentication_error() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let err = auth(&with_password(base_config(&server)), &dir)
            .acquire()
            .await
            .unwrap_err();
        assert!(matches!(err, PressableError::Authentication { .. }));
    }

    #[tokio::test]
    async fn test_cache_write_failure_still_returns_token() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        tokio::fs::write(&blocker, "x").await.unwrap();

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "T1"})))
            .mount(&server)
            .await;

        let auth = PressableAuth::new(
            &with_password(base_config(&server)),
            HttpTransport::new().unwrap(),
            TokenCache::at(blocker.join("pressable-token.json")),
        );

        assert_eq!(auth.acquire().await.unwrap().access_token, "T1");
    }

    #[test]
    fn test_grant_debug_redacts() {
        let grant = Grant::Password {
            username: "ops@example.com".into(),
            password: "hunter2".into(),
        };
        let debug = format!("{grant:?}");
        assert!(debug.contains("ops@example.com"));
        assert!(!debug.contains("hunter2"));
    }
}

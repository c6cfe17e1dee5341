//! Configuration management.
//!
//! Values are resolved in three layers, later layers filling or overriding
//! earlier ones:
//!
//! 1. **File** - `<config dir>/teamops/config.json`
//! 2. **Environment** - `TEAMOPS_PRESSABLE_*` variables override the file
//! 3. **Keychain** - secrets still unset are looked up under
//!    `teamops:pressable`

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use teamops_fetch::host::keychain::{accounts, services};
use teamops_fetch::KeychainApi;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::persistence::default_config_path;

/// Default control-plane API base URL.
pub const DEFAULT_PRESSABLE_API_BASE: &str = "https://my.pressable.com/v1/";

/// Default control-plane token endpoint.
pub const DEFAULT_PRESSABLE_TOKEN_URL: &str = "https://my.pressable.com/auth/token";

/// Environment variable names.
pub mod env {
    /// OAuth client ID.
    pub const CLIENT_ID: &str = "TEAMOPS_PRESSABLE_CLIENT_ID";
    /// OAuth client secret.
    pub const CLIENT_SECRET: &str = "TEAMOPS_PRESSABLE_CLIENT_SECRET";
    /// Account email for the password grant.
    pub const ACCOUNT_EMAIL: &str = "TEAMOPS_PRESSABLE_ACCOUNT_EMAIL";
    /// Account password for the password grant.
    pub const ACCOUNT_PASSWORD: &str = "TEAMOPS_PRESSABLE_ACCOUNT_PASSWORD";
    /// Fallback refresh token.
    pub const REFRESH_TOKEN: &str = "TEAMOPS_PRESSABLE_REFRESH_TOKEN";
    /// Reserved bot collaborator email.
    pub const BOT_EMAIL: &str = "TEAMOPS_PRESSABLE_BOT_EMAIL";
    /// Concierge fallback email.
    pub const CONCIERGE_EMAIL: &str = "TEAMOPS_PRESSABLE_CONCIERGE_EMAIL";
}

// ============================================================================
// Config Types
// ============================================================================

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Hosting control-plane settings.
    #[serde(default)]
    pub pressable: PressableConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Log level used when neither `--verbose` nor `RUST_LOG` is given.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Hosting control-plane settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct PressableConfig {
    /// API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Token endpoint URL.
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// OAuth client ID of the API application.
    #[serde(default)]
    pub client_id: Option<String>,
    /// OAuth client secret of the API application.
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Account email for the password grant.
    #[serde(default)]
    pub account_email: Option<String>,
    /// Account password for the password grant.
    #[serde(default)]
    pub account_password: Option<String>,
    /// Fallback refresh token used before any token has been cached.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Reserved email of the automation collaborator.
    #[serde(default)]
    pub bot_collaborator_email: Option<String>,
    /// Account used for login data when the bot cannot be provisioned.
    #[serde(default)]
    pub concierge_email: Option<String>,
}

fn default_request_timeout() -> u64 {
    60
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_api_base() -> String {
    DEFAULT_PRESSABLE_API_BASE.to_string()
}

fn default_token_url() -> String {
    DEFAULT_PRESSABLE_TOKEN_URL.to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            log_level: default_log_level(),
        }
    }
}

impl Default for PressableConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            token_url: default_token_url(),
            client_id: None,
            client_secret: None,
            account_email: None,
            account_password: None,
            refresh_token: None,
            bot_collaborator_email: None,
            concierge_email: None,
        }
    }
}

impl fmt::Debug for PressableConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(secret: Option<&String>) -> Option<&'static str> {
            secret.map(|_| "<redacted>")
        }

        f.debug_struct("PressableConfig")
            .field("api_base", &self.api_base)
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(self.client_secret.as_ref()))
            .field("account_email", &self.account_email)
            .field("account_password", &redact(self.account_password.as_ref()))
            .field("refresh_token", &redact(self.refresh_token.as_ref()))
            .field("bot_collaborator_email", &self.bot_collaborator_email)
            .field("concierge_email", &self.concierge_email)
            .finish()
    }
}

impl PressableConfig {
    /// A copy safe to print: secrets replaced by a marker.
    pub fn redacted(&self) -> Self {
        let mark = |s: &Option<String>| s.as_ref().map(|_| "********".to_string());
        Self {
            client_secret: mark(&self.client_secret),
            account_password: mark(&self.account_password),
            refresh_token: mark(&self.refresh_token),
            ..self.clone()
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

impl Config {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        default_config_path()
    }

    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, StoreError> {
        Self::load_from(&Self::default_path())
    }

    /// Loads configuration from a specific path; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| StoreError::Config(format!("{}: {e}", path.display())))?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Applies `TEAMOPS_PRESSABLE_*` environment overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    ///
    /// Empty values are ignored.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let p = &mut self.pressable;

        for (name, slot) in [
            (env::CLIENT_ID, &mut p.client_id),
            (env::CLIENT_SECRET, &mut p.client_secret),
            (env::ACCOUNT_EMAIL, &mut p.account_email),
            (env::ACCOUNT_PASSWORD, &mut p.account_password),
            (env::REFRESH_TOKEN, &mut p.refresh_token),
            (env::BOT_EMAIL, &mut p.bot_collaborator_email),
            (env::CONCIERGE_EMAIL, &mut p.concierge_email),
        ] {
            if let Some(value) = get(name) {
                debug!(variable = name, "Config override from environment");
                *slot = Some(value);
            }
        }

        self
    }

    /// Fills secrets that are still unset from the keychain.
    ///
    /// Keychain failures are logged and leave the secret unset.
    pub async fn resolve_secrets<K: KeychainApi + ?Sized>(mut self, keychain: &K) -> Self {
        let p = &mut self.pressable;

        for (account, slot) in [
            (accounts::CLIENT_SECRET, &mut p.client_secret),
            (accounts::ACCOUNT_PASSWORD, &mut p.account_password),
            (accounts::REFRESH_TOKEN, &mut p.refresh_token),
        ] {
            if slot.as_deref().is_some_and(|s| !s.is_empty()) {
                continue;
            }

            match keychain.get(services::PRESSABLE, account).await {
                Ok(Some(secret)) => {
                    debug!(account, "Secret loaded from keychain");
                    *slot = Some(secret);
                }
                Ok(None) => {}
                Err(e) => warn!(account, error = %e, "Keychain lookup failed"),
            }
        }

        self
    }
}

// ============================================================================
// Tests
// ============================================================================

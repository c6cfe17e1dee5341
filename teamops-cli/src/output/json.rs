//! JSON output formatting.

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Serialize, Serializer};
use teamops_core::{CredentialToken, SftpUser, SiteId};
use teamops_providers::pressable::ResolvedLogin;

// ============================================================================
// Output Types
// ============================================================================

/// Status of the cached bearer token. Never carries the token itself.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenStatusOutput {
    pub cached: bool,
    pub valid: bool,
    pub cache_path: String,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_datetime_opt")]
    pub issued_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_datetime_opt")]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_secs: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_secs: Option<i64>,
    pub has_refresh_token: bool,
    pub validity_secs: i64,
}

impl TokenStatusOutput {
    /// Describes `token` (if any) as seen at `now`.
    pub fn new(
        token: Option<&CredentialToken>,
        validity: Duration,
        now: DateTime<Utc>,
        cache_path: &Path,
    ) -> Self {
        let cache_path = cache_path.display().to_string();
        let validity_secs = validity.num_seconds();

        let Some(token) = token else {
            return Self {
                cached: false,
                valid: false,
                cache_path,
                issued_at: None,
                valid_until: None,
                age_secs: None,
                remaining_secs: None,
                has_refresh_token: false,
                validity_secs,
            };
        };

        let valid_until = token.valid_until(validity);
        Self {
            cached: true,
            valid: token.is_valid_at(now, validity),
            cache_path,
            issued_at: Some(token.issued_at),
            valid_until: Some(valid_until),
            age_secs: Some(token.age_at(now).num_seconds()),
            remaining_secs: Some((valid_until - now).num_seconds().max(0)),
            has_refresh_token: token.refresh_token.is_some(),
            validity_secs,
        }
    }

    /// Share of the validity window still left, 0 to 100.
    #[allow(clippy::cast_precision_loss)]
    pub fn percent_remaining(&self) -> f64 {
        match self.remaining_secs {
            Some(remaining) if self.validity_secs > 0 => {
                (remaining as f64 / self.validity_secs as f64 * 100.0).clamp(0.0, 100.0)
            }
            _ => 0.0,
        }
    }
}

/// SFTP users of one site.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorsOutput<'a> {
    pub site_id: SiteId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_email: Option<&'a str>,
    pub users: Vec<SftpUserOutput<'a>>,
}

/// One SFTP user.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SftpUserOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    pub owner: bool,
    pub is_bot: bool,
}

impl<'a> CollaboratorsOutput<'a> {
    /// Builds the listing, flagging the bot collaborator.
    pub fn new(site_id: SiteId, users: &'a [SftpUser], bot_email: Option<&'a str>) -> Self {
        let users = users
            .iter()
            .map(|user| SftpUserOutput {
                id: user.id,
                username: user.username.as_deref(),
                email: user.email.as_deref(),
                owner: user.owner.unwrap_or(false),
                is_bot: bot_email.is_some_and(|bot| user.email_matches(bot)),
            })
            .collect();

        Self {
            site_id,
            bot_email,
            users,
        }
    }
}

/// Login data handed out for a site.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutput<'a> {
    pub site_id: SiteId,
    #[serde(flatten)]
    pub login: &'a ResolvedLogin,
}

fn serialize_datetime_opt<S>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
        None => serializer.serialize_none(),
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON output formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }
}

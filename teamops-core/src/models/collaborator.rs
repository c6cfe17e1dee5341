//! Hosted sites, SFTP users and collaborators.

use serde::{Deserialize, Deserializer, Serialize};

/// Numeric identifier of a hosted site.
pub type SiteId = u64;

// ============================================================================
// Wire Types
// ============================================================================

/// A hosted site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    /// Site ID.
    pub id: SiteId,

    /// Site name (slug).
    #[serde(default)]
    pub name: Option<String>,

    /// Primary URL.
    #[serde(default)]
    pub url: Option<String>,

    /// SFTP hostname for the site.
    #[serde(default, alias = "sftp_domain")]
    pub sftp_domain: Option<String>,
}

/// An SFTP user attached to a site.
///
/// Freshly created collaborators can show up here before their generated
/// username does, so every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SftpUser {
    /// SFTP user ID.
    #[serde(default)]
    pub id: Option<u64>,

    /// Generated SFTP username.
    #[serde(default)]
    pub username: Option<String>,

    /// Email of the account behind this SFTP user.
    #[serde(default)]
    pub email: Option<String>,

    /// Whether this is the site owner.
    #[serde(default)]
    pub owner: Option<bool>,
}

impl SftpUser {
    /// Case-insensitive exact match on the email address.
    pub fn email_matches(&self, email: &str) -> bool {
        self.email
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(email))
    }

    /// Converts into a [`BotCollaborator`] once the username is visible.
    pub fn into_collaborator(
        self,
        site_id: SiteId,
        sftp_hostname: Option<String>,
    ) -> Option<BotCollaborator> {
        let username = self.username.filter(|u| !u.is_empty())?;

        Some(BotCollaborator {
            id: self.id,
            username,
            email: self.email.unwrap_or_default(),
            sftp_hostname,
            site_id,
        })
    }
}

/// A collaborator record as returned by the batch create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    /// Collaborator ID.
    #[serde(default)]
    pub id: Option<u64>,

    /// Collaborator email.
    #[serde(default)]
    pub email: Option<String>,

    /// Site the collaborator was added to.
    #[serde(default)]
    pub site_id: Option<SiteId>,

    /// Granted roles. The API sends either a single role or a list.
    #[serde(default, deserialize_with = "one_or_many")]
    pub roles: Vec<String>,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Roles {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<Roles>::deserialize(deserializer)? {
        Some(Roles::One(role)) => vec![role],
        Some(Roles::Many(roles)) => roles,
        None => Vec::new(),
    })
}

// ============================================================================
// Resolved Collaborator
// ============================================================================

/// The automation collaborator of a site, with a known SFTP username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotCollaborator {
    /// SFTP user ID, when the API exposes it.
    pub id: Option<u64>,

    /// SFTP username. Stable identity of the collaborator.
    pub username: String,

    /// Reserved automation email address.
    pub email: String,

    /// SFTP hostname of the site, when known.
    pub sftp_hostname: Option<String>,

    /// Site the collaborator is attached to.
    pub site_id: SiteId,
}

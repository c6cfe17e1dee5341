//! Automation collaborator provisioning.
//!
//! Ensures the reserved bot account exists as an SFTP collaborator on a site
//! and hands out fresh login data for it:
//!
//! 1. Look the bot up among the site's SFTP users (case-insensitive email)
//! 2. Create it when absent (a match still missing its username is not
//!    created again)
//! 3. Poll until the new user shows up with a username, sleeping 1s, 2s and
//!    4s between the four lookups
//! 4. Rotate its SFTP password
//!
//! Every call rotates the password; reuse within a run goes through
//! [`BotCollaboratorProvisioner::cached_login_data`].

use async_trait::async_trait;
use teamops_core::{BotCollaborator, LoginData, SftpUser, SiteId};
use teamops_fetch::RetryStrategy;
use teamops_store::LoginDataCache;
use tracing::{debug, info, instrument, warn};

use super::error::PressableError;

/// Number of lookups performed before giving up, the initial one included.
pub const BOT_LOOKUP_ATTEMPTS: u32 = 4;

/// Outcome of a single lookup by email.
#[derive(Debug)]
enum Lookup {
    /// No SFTP user carries the email.
    Absent,
    /// A match exists but has no username yet.
    Pending,
    Visible(BotCollaborator),
}

impl Lookup {
    fn label(&self) -> &'static str {
        match self {
            Lookup::Absent => "absent",
            Lookup::Pending => "pending",
            Lookup::Visible(_) => "visible",
        }
    }

    fn into_visible(self) -> Option<BotCollaborator> {
        match self {
            Lookup::Visible(found) => Some(found),
            Lookup::Absent | Lookup::Pending => None,
        }
    }
}

/// Control-plane operations the provisioner needs.
#[async_trait]
pub trait CollaboratorApi: Send + Sync {
    /// Lists the SFTP users of a site.
    async fn list_sftp_users(&self, site_id: SiteId) -> Result<Vec<SftpUser>, PressableError>;

    /// Adds a collaborator with SFTP access to a site.
    async fn create_collaborator(&self, site_id: SiteId, email: &str) -> Result<(), PressableError>;

    /// Sets a new SFTP password and returns it.
    async fn reset_sftp_password(
        &self,
        site_id: SiteId,
        username: &str,
    ) -> Result<String, PressableError>;

    /// SFTP hostname of the site, when known.
    async fn sftp_hostname(&self, _site_id: SiteId) -> Result<Option<String>, PressableError> {
        Ok(None)
    }
}

/// Provisions the automation collaborator of a site.
#[derive(Debug)]
pub struct BotCollaboratorProvisioner<A> {
    api: A,
    bot_email: String,
    retry: RetryStrategy,
}

impl<A: CollaboratorApi> BotCollaboratorProvisioner<A> {
    /// Creates a provisioner for the given bot email.
    pub fn new(api: A, bot_email: impl Into<String>) -> Self {
        Self {
            api,
            bot_email: bot_email.into(),
            retry: RetryStrategy::new(BOT_LOOKUP_ATTEMPTS),
        }
    }

    /// Overrides the polling schedule.
    pub fn with_retry(mut self, retry: RetryStrategy) -> Self {
        self.retry = retry;
        self
    }

    /// The underlying API.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// The reserved bot email.
    pub fn bot_email(&self) -> &str {
        &self.bot_email
    }

    /// Looks the bot up once; `None` when absent or without a username yet.
    pub async fn find_collaborator(
        &self,
        site_id: SiteId,
    ) -> Result<Option<BotCollaborator>, PressableError> {
        Ok(self.lookup(site_id, &self.bot_email).await?.into_visible())
    }

    async fn lookup(&self, site_id: SiteId, email: &str) -> Result<Lookup, PressableError> {
        let users = self.api.list_sftp_users(site_id).await?;
        let lookup = match users.into_iter().find(|user| user.email_matches(email)) {
            None => Lookup::Absent,
            Some(user) => user
                .into_collaborator(site_id, None)
                .map_or(Lookup::Pending, Lookup::Visible),
        };

        debug!(site_id, email, state = lookup.label(), "Collaborator lookup");
        Ok(lookup)
    }

    /// Returns the bot collaborator, creating it and waiting for it if needed.
    ///
    /// Creation is only requested when no SFTP user carries the bot email. A
    /// match still waiting for its username is polled, not created again.
    #[instrument(skip(self), fields(email = %self.bot_email))]
    pub async fn ensure_collaborator(
        &self,
        site_id: SiteId,
    ) -> Result<BotCollaborator, PressableError> {
        match self.lookup(site_id, &self.bot_email).await? {
            Lookup::Visible(found) => return self.with_hostname(found).await,
            Lookup::Pending => info!(site_id, "Bot collaborator pending, waiting for username"),
            Lookup::Absent => {
                info!(site_id, "Creating bot collaborator");
                self.api.create_collaborator(site_id, &self.bot_email).await?;
            }
        }

        let attempts = self.retry.max_attempts.max(1);
        for attempt in 2..=attempts {
            let delay = self.retry.delay_for_attempt(attempt - 1);
            debug!(site_id, attempt, delay_secs = delay.as_secs(), "Waiting for collaborator");
            tokio::time::sleep(delay).await;

            match self.find_collaborator(site_id).await {
                Ok(Some(found)) => {
                    info!(site_id, attempt, username = %found.username, "Bot collaborator visible");
                    return self.with_hostname(found).await;
                }
                Ok(None) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!(site_id, attempt, error = %e, "Collaborator lookup failed"),
            }
        }

        Err(PressableError::CollaboratorNotFound {
            site_id,
            email: self.bot_email.clone(),
            attempts,
        })
    }

    async fn with_hostname(
        &self,
        mut collaborator: BotCollaborator,
    ) -> Result<BotCollaborator, PressableError> {
        collaborator.sftp_hostname = self.api.sftp_hostname(collaborator.site_id).await?;
        Ok(collaborator)
    }

    /// Ensures the bot and rotates its password.
    #[instrument(skip(self))]
    pub async fn login_data(&self, site_id: SiteId) -> Result<LoginData, PressableError> {
        let collaborator = self.ensure_collaborator(site_id).await?;
        self.rotate(collaborator).await
    }

    /// Rotates the password of an existing SFTP user; never creates one.
    #[instrument(skip(self))]
    pub async fn login_data_for_email(
        &self,
        site_id: SiteId,
        email: &str,
    ) -> Result<LoginData, PressableError> {
        let collaborator = match self.lookup(site_id, email).await?.into_visible() {
            Some(found) => self.with_hostname(found).await?,
            None => {
                return Err(PressableError::CollaboratorNotFound {
                    site_id,
                    email: email.to_string(),
                    attempts: 1,
                });
            }
        };
        self.rotate(collaborator).await
    }

    /// Login data from the cache, provisioning and storing it on a miss.
    pub async fn cached_login_data(
        &self,
        site_id: SiteId,
        cache: &mut LoginDataCache,
    ) -> Result<LoginData, PressableError> {
        if let Some(data) = cache.get(site_id) {
            debug!(site_id, "Login data from cache");
            return Ok(data.clone());
        }

        let data = self.login_data(site_id).await?;
        cache.put(site_id, data.clone());
        Ok(data)
    }

    async fn rotate(&self, collaborator: BotCollaborator) -> Result<LoginData, PressableError> {
        let password = self
            .api
            .reset_sftp_password(collaborator.site_id, &collaborator.username)
            .await?;
        info!(
            site_id = collaborator.site_id,
            username = %collaborator.username,
            "Rotated SFTP password"
        );

        Ok(LoginData::new(collaborator.username, password).with_host(collaborator.sftp_hostname))
    }
}

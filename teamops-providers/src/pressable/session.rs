//! Caller-level login resolution.
//!
//! When the bot collaborator cannot be made visible on a site, the caller
//! may fall back to an existing concierge account instead. That decision
//! belongs here, not in the provisioner.

use serde::Serialize;
use teamops_core::{LoginData, SiteId};
use tracing::warn;

use super::error::PressableError;
use super::provisioner::{BotCollaboratorProvisioner, CollaboratorApi};

/// Login data plus which account it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLogin {
    /// Username, password and host.
    #[serde(flatten)]
    pub login: LoginData,
    /// Email of the account the login data belongs to.
    pub email: String,
    /// True when the fallback account was used.
    pub used_fallback: bool,
}

/// Provisions the bot on a site, falling back to `fallback_email` when the
/// bot never becomes visible.
///
/// Only [`PressableError::CollaboratorNotFound`] triggers the fallback;
/// every other error is returned as is.
pub async fn resolve_login_data<A: CollaboratorApi>(
    provisioner: &BotCollaboratorProvisioner<A>,
    site_id: SiteId,
    fallback_email: Option<&str>,
) -> Result<ResolvedLogin, PressableError> {
    match provisioner.login_data(site_id).await {
        Ok(login) => Ok(ResolvedLogin {
            login,
            email: provisioner.bot_email().to_string(),
            used_fallback: false,
        }),
        Err(err @ PressableError::CollaboratorNotFound { .. }) => {
            let Some(email) = fallback_email.filter(|e| !e.is_empty()) else {
                return Err(err);
            };

            warn!(site_id, fallback = email, error = %err, "Falling back to concierge login");
            let login = provisioner.login_data_for_email(site_id, email).await?;
            Ok(ResolvedLogin {
                login,
                email: email.to_string(),
                used_fallback: true,
            })
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use teamops_core::SftpUser;
    use teamops_fetch::RetryStrategy;

    struct StaticApi {
        users: Vec<SftpUser>,
        creates: Mutex<u32>,
    }

    impl StaticApi {
        fn new(users: Vec<SftpUser>) -> Self {
            Self {
                users,
                creates: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl CollaboratorApi for StaticApi {
        async fn list_sftp_users(&self, _site_id: SiteId) -> Result<Vec<SftpUser>, PressableError> {
            Ok(self.users.clone())
        }

        async fn create_collaborator(&self, _site_id: SiteId, _email: &str) -> Result<(), PressableError> {
            *self.creates.lock().unwrap() += 1;
            Ok(())
        }

        async fn reset_sftp_password(
            &self,
            _site_id: SiteId,
            username: &str,
        ) -> Result<String, PressableError> {
            Ok(format!("{username}-pw"))
        }
    }

    fn user(email: &str, username: &str) -> SftpUser {
        SftpUser {
            id: None,
            username: Some(username.into()),
            email: Some(email.into()),
            owner: None,
        }
    }

    fn provisioner(users: Vec<SftpUser>) -> BotCollaboratorProvisioner<StaticApi> {
        BotCollaboratorProvisioner::new(StaticApi::new(users), "bots@example.com")
            .with_retry(RetryStrategy::no_retry())
    }

    #[tokio::test]
    async fn test_bot_login_without_fallback() {
        let provisioner = provisioner(vec![user("bots@example.com", "site-bot")]);

        let resolved = resolve_login_data(&provisioner, 1, Some("concierge@example.com"))
            .await
            .unwrap();

        assert!(!resolved.used_fallback);
        assert_eq!(resolved.email, "bots@example.com");
        assert_eq!(resolved.login.password, "site-bot-pw");
    }

    #[tokio::test]
    async fn test_falls_back_to_concierge() {
        let provisioner = provisioner(vec![user("concierge@example.com", "concierge")]);

        let resolved = resolve_login_data(&provisioner, 1, Some("concierge@example.com"))
            .await
            .unwrap();

        assert!(resolved.used_fallback);
        assert_eq!(resolved.login.username, "concierge");
        assert_eq!(*provisioner.api().creates.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_no_fallback_returns_not_found() {
        let provisioner = provisioner(vec![]);

        let err = resolve_login_data(&provisioner, 1, None).await.unwrap_err();
        assert!(matches!(err, PressableError::CollaboratorNotFound { .. }));

        let err = resolve_login_data(&provisioner, 1, Some("")).await.unwrap_err();
        assert!(matches!(err, PressableError::CollaboratorNotFound { .. }));
    }

    #[tokio::test]
    async fn test_missing_concierge_is_not_found() {
        let provisioner = provisioner(vec![]);

        let err = resolve_login_data(&provisioner, 1, Some("concierge@example.com"))
            .await
            .unwrap_err();
        match err {
            PressableError::CollaboratorNotFound { email, .. } => {
                assert_eq!(email, "concierge@example.com");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

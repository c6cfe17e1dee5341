//! Pressable hosting control-plane provider.
//!
//! ## Authentication
//!
//! Bearer tokens come from `POST /auth/token`:
//!
//! 1. **Password grant** when an account email and password are configured
//! 2. **Refresh-token grant** with the last cached refresh token, or the
//!    configured one before anything has been cached
//!
//! Tokens are cached on disk and trusted for 59 minutes. A 401 from any
//! call is fatal: the token is not refreshed and the call is not retried.
//!
//! ## API Endpoints
//!
//! - `GET sites/{id}` - Site details (SFTP hostname)
//! - `GET sites/{id}/ftp` - SFTP users of a site
//! - `POST collaborators/batch_create` - Add a collaborator to sites
//! - `POST sites/{id}/ftp/password/{username}` - Rotate an SFTP password

// Modules
mod api;
mod auth;
mod error;
pub(crate) mod parser;
mod provisioner;
mod session;

// Re-exports
pub use api::PressableApiClient;
pub use auth::{Grant, PressableAuth};
pub use error::PressableError;
pub use provisioner::{BotCollaboratorProvisioner, CollaboratorApi, BOT_LOOKUP_ATTEMPTS};
pub use session::{resolve_login_data, ResolvedLogin};

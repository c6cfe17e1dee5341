//! Domain models for teamops.
//!
//! ## Submodules
//!
//! - [`token`] - Bearer token with issuance time and validity checks
//! - [`collaborator`] - Sites, SFTP users and collaborators
//! - [`login`] - Transient login data

mod collaborator;
mod login;
mod token;

pub use collaborator::{BotCollaborator, Collaborator, SftpUser, Site, SiteId};
pub use login::LoginData;
pub use token::{CredentialToken, DEFAULT_VALIDITY_WINDOW_SECS};

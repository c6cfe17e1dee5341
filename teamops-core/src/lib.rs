// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # teamops Core
//!
//! Core types and models shared by the teamops crates.
//!
//! ## Key Types
//!
//! ### Credentials
//! - [`CredentialToken`] - Bearer token plus its issuance time
//! - [`LoginData`] - Transient SFTP/SSH username and password pair
//!
//! ### Hosting Platform
//! - [`SiteId`] - Numeric identifier of a hosted site
//! - [`Site`] - Site record as returned by the control plane
//! - [`SftpUser`] - SFTP user attached to a site
//! - [`Collaborator`] - Collaborator record returned at creation time
//! - [`BotCollaborator`] - Resolved automation collaborator for a site

pub mod models;

pub use models::{
    // Credentials
    CredentialToken,
    DEFAULT_VALIDITY_WINDOW_SECS,
    LoginData,
    // Hosting platform
    BotCollaborator,
    Collaborator,
    SftpUser,
    Site,
    SiteId,
};

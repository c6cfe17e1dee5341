// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # teamops Providers
//!
//! Provider implementations for teamops.
//!
//! ## Pressable
//!
//! The [`pressable`] module wraps the managed WordPress hosting control
//! plane:
//!
//! - **Auth**: password and refresh-token grants, cached bearer token
//! - **API**: bearer-authenticated calls, 401 treated as fatal
//! - **Provisioner**: ensures the automation SFTP collaborator exists on a
//!   site and rotates its password for fresh login data
//! - **Session**: caller-level fallback to a concierge account
//!
//! ## Usage
//!
//! ```ignore
//! use teamops_providers::pressable::{BotCollaboratorProvisioner, PressableApiClient};
//! use teamops_store::Config;
//!
//! let config = Config::load()?.with_env_overrides();
//! let api = PressableApiClient::from_config(&config)?;
//! let provisioner = BotCollaboratorProvisioner::new(api, "bots@example.com");
//!
//! let login = provisioner.login_data(site_id).await?;
//! println!("sftp user: {}", login.username);
//! ```

pub mod pressable;

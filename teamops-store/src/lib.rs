// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # teamops Store
//!
//! Local state for teamops.
//!
//! This crate provides:
//!
//! - **TokenCache**: the persisted control-plane bearer token with its
//!   validity window
//! - **LoginDataCache**: per-site login data held for one run
//! - **Config**: user configuration with environment and keychain overrides
//! - **Persistence**: file I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use teamops_store::{Config, TokenCache};
//!
//! let config = Config::load()?.with_env_overrides();
//! let cache = TokenCache::new();
//!
//! match cache.read().await {
//!     Some(token) => println!("cached token issued at {}", token.issued_at),
//!     None => println!("no valid token cached"),
//! }
//! ```

pub mod config;
pub mod error;
pub mod login_cache;
pub mod persistence;
pub mod token_cache;

pub use config::{Config, GeneralConfig, PressableConfig};
pub use error::StoreError;
pub use login_cache::LoginDataCache;
pub use persistence::{
    default_cache_dir, default_config_dir, default_config_path, default_token_cache_path,
    load_json, save_json,
};
pub use token_cache::TokenCache;

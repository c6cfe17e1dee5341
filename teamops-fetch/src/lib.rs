// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # teamops Fetch
//!
//! Low-level plumbing shared by the teamops provider crates.
//!
//! ## Host APIs
//!
//! The [`host`] module provides abstractions for system interactions:
//!
//! - [`host::http`] - Single-shot HTTP transport with JSON decoding
//! - [`host::keychain`] - Secure credential storage (system keychain)
//!
//! ## Support
//!
//! - [`codec`] - JSON decode/encode with typed failures
//! - [`retry`] - Backoff schedules for bounded polling loops
//!
//! ## Example
//!
//! ```ignore
//! use teamops_fetch::{HttpRequest, HttpTransport};
//!
//! let transport = HttpTransport::new()?;
//! let response = transport
//!     .send(HttpRequest::get("https://my.pressable.com/v1/sites").bearer(token))
//!     .await?;
//!
//! if response.is_success() {
//!     println!("{:?}", response.body);
//! }
//! ```

pub mod codec;
pub mod error;
pub mod host;
pub mod retry;

// Errors
pub use error::{CodecError, HttpError, KeychainError};

// Host APIs
pub use host::{
    http::{HttpRequest, HttpResponse, HttpTransport, RequestBody},
    keychain::{KeychainApi, SystemKeychain},
};

pub use retry::RetryStrategy;

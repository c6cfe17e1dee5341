//! Host APIs for teamops.
//!
//! - [`http`] - HTTP transport with tracing and JSON decoding
//! - [`keychain`] - Secure credential storage (system keychain)

pub mod http;
pub mod keychain;

pub use http::HttpTransport;
pub use keychain::{KeychainApi, SystemKeychain};

//! CLI command implementations.

pub mod collaborators;
pub mod config;
pub mod login;
pub mod token;

//! Output formatting for CLI.

mod json;
mod text;

pub use json::{CollaboratorsOutput, JsonFormatter, LoginOutput, TokenStatusOutput};
pub use text::TextFormatter;
#[cfg(test)]
mod tests;

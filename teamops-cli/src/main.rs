// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! teamops CLI - hosting control-plane helpers from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Show the cached token status
//! teamops token
//!
//! # Force a fresh token
//! teamops token --refresh
//!
//! # List the SFTP users of a site
//! teamops collaborators --site 1234
//!
//! # Provision the bot collaborator and print fresh login data
//! teamops login --site 1234 --format json --pretty
//!
//! # Write a config template
//! teamops config init
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use teamops_fetch::SystemKeychain;
use teamops_providers::pressable::PressableError;
use teamops_store::{Config, StoreError};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{collaborators, config, login, token};
use output::TextFormatter;

// ============================================================================
// CLI Definition
// ============================================================================

/// teamops CLI - hosting control-plane helpers.
#[derive(Parser)]
#[command(name = "teamops")]
#[command(about = "Pressable token cache and SFTP bot provisioning")]
#[command(long_about = r#"
teamops talks to the Pressable control plane on behalf of the team.

It caches the API bearer token for 59 minutes, keeps an automation
collaborator on each site, and hands out freshly rotated SFTP login data.

Examples:
  teamops token                      # Cached token status
  teamops token --refresh            # Acquire a new token
  teamops collaborators --site 1234  # SFTP users of a site
  teamops login --site 1234          # Fresh bot login data
  teamops config init                # Write a config template
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Config file to use instead of the default location.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (no logging, no error text).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Show the cached token status, or acquire a new token.
    #[command(visible_alias = "t")]
    Token(token::TokenArgs),

    /// List the SFTP users of a site.
    #[command(visible_alias = "c")]
    Collaborators(collaborators::CollaboratorsArgs),

    /// Provision the bot collaborator and print fresh login data.
    #[command(visible_alias = "l")]
    Login(login::LoginArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Missing or invalid configuration.
    Config = 2,
    /// Credentials rejected.
    Auth = 3,
}

impl ExitCode {
    /// Maps an error to the exit code reported to the shell.
    pub fn for_error(err: &anyhow::Error) -> Self {
        if let Some(err) = err.downcast_ref::<PressableError>() {
            return match err {
                PressableError::AuthConfiguration(_) | PressableError::InvalidConfig(_) => {
                    ExitCode::Config
                }
                PressableError::AuthExchange(_) | PressableError::Authentication { .. } => {
                    ExitCode::Auth
                }
                _ => ExitCode::Error,
            };
        }

        if let Some(StoreError::Config(_)) = err.downcast_ref::<StoreError>() {
            return ExitCode::Config;
        }

        ExitCode::Error
    }
}

// ============================================================================
// Config Loading
// ============================================================================

impl Cli {
    /// Path of the config file in effect.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Loads the config file with environment overrides applied.
    pub fn load_config(&self) -> Result<Config> {
        Ok(Config::load_from(&self.config_path())?.with_env_overrides())
    }

    /// Loads the config and fills secrets from the system keychain.
    pub async fn load_config_with_secrets(&self) -> Result<Config> {
        let config = self.load_config()?;
        Ok(config.resolve_secrets(&SystemKeychain::new()).await)
    }

    /// Whether text output should carry ANSI colors.
    pub fn use_colors(&self) -> bool {
        !self.no_color && std::env::var_os("NO_COLOR").is_none()
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

const LOG_TARGETS: [&str; 5] = [
    "teamops",
    "teamops_core",
    "teamops_fetch",
    "teamops_store",
    "teamops_providers",
];

fn filter_for(level: &str) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn setup_logging(verbose: bool, quiet: bool, level: &str) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new(format!("{},info", filter_for("debug")))
        } else {
            EnvFilter::new(filter_for(level))
        }
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The config may be broken; that is reported by the command itself.
    let level = cli
        .load_config()
        .map_or_else(|_| "warn".to_string(), |c| c.general.log_level);
    setup_logging(cli.verbose, cli.quiet, &level);

    let result = match &cli.command {
        Commands::Token(args) => token::run(args, &cli).await,
        Commands::Collaborators(args) => collaborators::run(args, &cli).await,
        Commands::Login(args) => login::run(args, &cli).await,
        Commands::Config(args) => config::run(args, &cli).await,
    };

    if let Err(e) = result {
        let code = ExitCode::for_error(&e);
        if !cli.quiet {
            let hint = e
                .downcast_ref::<PressableError>()
                .map(PressableError::operator_hint);
            eprintln!("{}", TextFormatter::new(cli.use_colors()).format_error(&format!("{e:#}"), hint));
        }
        std::process::exit(code as i32);
    }

    Ok(())
}

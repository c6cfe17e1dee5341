//! Config command - manage configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use teamops_store::{default_cache_dir, default_config_dir, default_token_cache_path, Config};
use tracing::info;

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration (secrets redacted).
    Show,

    /// Show configuration and cache paths.
    Path,

    /// Write a configuration template.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await,
        ConfigAction::Path => show_paths(cli),
        ConfigAction::Init { force } => init_config(*force, cli),
    }
}

async fn show_config(cli: &Cli) -> Result<()> {
    let config = cli.load_config_with_secrets().await?;
    let pressable = config.pressable.redacted();

    match cli.format {
        OutputFormat::Text => {
            let set = |value: &Option<String>| value.as_deref().unwrap_or("(not set)").to_string();

            println!("teamops Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Request timeout: {}s", config.general.request_timeout_secs);
            println!("Log level:       {}", config.general.log_level);
            println!();
            println!("Pressable:");
            println!("  API base:         {}", pressable.api_base);
            println!("  Token URL:        {}", pressable.token_url);
            println!("  Client ID:        {}", set(&pressable.client_id));
            println!("  Client secret:    {}", set(&pressable.client_secret));
            println!("  Account email:    {}", set(&pressable.account_email));
            println!("  Account password: {}", set(&pressable.account_password));
            println!("  Refresh token:    {}", set(&pressable.refresh_token));
            println!("  Bot email:        {}", set(&pressable.bot_collaborator_email));
            println!("  Concierge email:  {}", set(&pressable.concierge_email));
        }
        OutputFormat::Json => {
            let shown = Config {
                general: config.general.clone(),
                pressable,
            };
            println!("{}", JsonFormatter::new(cli.pretty).format(&shown)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let config_file = cli.config_path();
    let cache_dir = default_cache_dir();
    let token_cache = default_token_cache_path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:  {}", config_dir.display());
            println!("Config file: {}", config_file.display());
            println!("Cache dir:   {}", cache_dir.display());
            println!("Token cache: {}", token_cache.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "config_file": config_file.display().to_string(),
                "cache_dir": cache_dir.display().to_string(),
                "token_cache": token_cache.display().to_string(),
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&paths)?);
        }
    }

    Ok(())
}

fn init_config(force: bool, cli: &Cli) -> Result<()> {
    let path = cli.config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    Config::default().save_to(&path)?;

    info!(path = %path.display(), "Config template written");
    println!("Wrote {}", path.display());
    println!("Secrets can stay out of the file: use TEAMOPS_PRESSABLE_* variables or the keychain.");

    Ok(())
}

//! Token command - cached bearer token status.

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use teamops_providers::pressable::PressableApiClient;
use teamops_store::TokenCache;
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter, TokenStatusOutput};
use crate::{Cli, OutputFormat};

/// Arguments for the token command.
#[derive(Args, Default)]
pub struct TokenArgs {
    /// Acquire a new token even if the cached one is still valid.
    #[arg(long)]
    pub refresh: bool,
}

/// Runs the token command.
pub async fn run(args: &TokenArgs, cli: &Cli) -> Result<()> {
    let cache = TokenCache::new();

    let token = if args.refresh {
        let config = cli.load_config_with_secrets().await?;
        let client = PressableApiClient::from_config(&config)?;
        let token = client.refresh_now().await?;
        info!("Token refreshed");
        Some(token)
    } else {
        cache.load().await
    };

    let status = TokenStatusOutput::new(token.as_ref(), cache.validity(), Utc::now(), cache.path());

    match cli.format {
        OutputFormat::Text => {
            println!("{}", TextFormatter::new(cli.use_colors()).format_token_status(&status));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&status)?);
        }
    }

    Ok(())
}

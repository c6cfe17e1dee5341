//! Login command - provision the bot collaborator and print login data.

use anyhow::Result;
use clap::Args;
use teamops_core::SiteId;
use teamops_providers::pressable::{
    resolve_login_data, BotCollaboratorProvisioner, PressableApiClient, PressableError,
};

use crate::output::{JsonFormatter, LoginOutput, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// Site ID.
    #[arg(long, short)]
    pub site: SiteId,

    /// Do not fall back to the concierge account.
    #[arg(long)]
    pub no_fallback: bool,
}

/// Runs the login command.
pub async fn run(args: &LoginArgs, cli: &Cli) -> Result<()> {
    let config = cli.load_config_with_secrets().await?;

    let bot_email = config
        .pressable
        .bot_collaborator_email
        .clone()
        .filter(|e| !e.is_empty())
        .ok_or_else(|| {
            PressableError::InvalidConfig("pressable.bot_collaborator_email is not set".into())
        })?;

    let client = PressableApiClient::from_config(&config)?;
    let provisioner = BotCollaboratorProvisioner::new(client, bot_email);

    let fallback = if args.no_fallback {
        None
    } else {
        config.pressable.concierge_email.as_deref()
    };
    let resolved = resolve_login_data(&provisioner, args.site, fallback).await?;

    let output = LoginOutput {
        site_id: args.site,
        login: &resolved,
    };

    match cli.format {
        OutputFormat::Text => {
            println!("{}", TextFormatter::new(cli.use_colors()).format_login(&output));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }

    Ok(())
}

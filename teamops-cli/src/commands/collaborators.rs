//! Collaborators command - SFTP users of a site.

use anyhow::Result;
use clap::Args;
use teamops_core::SiteId;
use teamops_providers::pressable::PressableApiClient;

use crate::output::{CollaboratorsOutput, JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the collaborators command.
#[derive(Args)]
pub struct CollaboratorsArgs {
    /// Site ID.
    #[arg(long, short)]
    pub site: SiteId,
}

/// Runs the collaborators command.
pub async fn run(args: &CollaboratorsArgs, cli: &Cli) -> Result<()> {
    let config = cli.load_config_with_secrets().await?;
    let client = PressableApiClient::from_config(&config)?;

    let users = client.sftp_users(args.site).await?;
    let output = CollaboratorsOutput::new(
        args.site,
        &users,
        config.pressable.bot_collaborator_email.as_deref(),
    );

    match cli.format {
        OutputFormat::Text => {
            println!("{}", TextFormatter::new(cli.use_colors()).format_collaborators(&output));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }

    Ok(())
}

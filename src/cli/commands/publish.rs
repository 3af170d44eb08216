use anyhow::Result;
use clap::Args;
use colored::*;

use super::{connect, ConnectionArgs};
use crate::cli::ui::ConsoleReporter;
use crate::config::Config;
use crate::import::publish_customizations;

#[derive(Args, Debug)]
pub struct PublishCommands {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Also publish unpublished duplicate detection rules
    #[arg(long)]
    pub publish_duplicate_rules: bool,
}

pub async fn handle_publish_command(args: PublishCommands, config: &Config) -> Result<()> {
    let client = connect(&args.connection, config).await?;
    publish_customizations(&client, &ConsoleReporter, args.publish_duplicate_rules).await?;

    println!("{} Customizations published", "✓".bright_green());
    Ok(())
}

use anyhow::Result;
use clap::Parser;
use log::{error, info};

use dynamics_import_customizations::cli::{self, Cli, Commands};
use dynamics_import_customizations::config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger to file (truncate on each run)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&cli.log_file)?;
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    info!("Starting dynamics-import-customizations");

    let result = run(cli).await;
    if let Err(ref err) = result {
        error!("{:#}", err);
    }
    result
}

async fn run(cli: Cli) -> Result<()> {
    let config = config::Config::load()?;

    match cli.command {
        Commands::Import(args) => cli::commands::handle_import_command(args, &config).await,
        Commands::Report(args) => cli::commands::handle_report_command(args).await,
        Commands::Publish(args) => cli::commands::handle_publish_command(args, &config).await,
    }
}

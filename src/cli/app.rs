use super::commands::{ImportCommands, PublishCommands, ReportCommands};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_LOG_FILE: &str = "dynamics-import-customizations.log";

#[derive(Parser)]
#[command(name = "dynamics-import-customizations")]
#[command(about = "Import a solution into Dynamics 365, publish it and report failed components")]
#[command(version)]
pub struct Cli {
    /// Log file (truncated on each run)
    #[arg(long, global = true, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import a solution package and publish all customizations
    Import(ImportCommands),
    /// Print the failed components of a saved import job file
    Report(ReportCommands),
    /// Publish all customizations without importing
    Publish(PublishCommands),
}

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use std::path::PathBuf;

use crate::cli::ui::ConsoleReporter;
use crate::import::{ComponentScope, ImportJobLog, Reporter};

#[derive(Args, Debug)]
pub struct ReportCommands {
    /// Import job XML file (import_log_file*.xml)
    pub path: PathBuf,

    /// Report failures for every component kind, not only entities
    #[arg(long)]
    pub all_components: bool,
}

pub async fn handle_report_command(args: ReportCommands) -> Result<()> {
    let xml = tokio::fs::read_to_string(&args.path)
        .await
        .with_context(|| format!("Failed to read import job file: {}", args.path.display()))?;

    let scope = if args.all_components {
        ComponentScope::All
    } else {
        ComponentScope::Entities
    };

    let log = ImportJobLog::parse(&xml)?;
    let failures = log.failures(scope);
    for line in log.report_failures(&failures) {
        ConsoleReporter.report(&line);
    }

    if failures.is_empty() {
        println!("{} No failed components", "✓".bright_green());
    } else {
        println!("{} failed components", failures.len().to_string().red().bold());
    }
    Ok(())
}

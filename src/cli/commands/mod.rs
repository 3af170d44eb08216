pub mod import;
pub mod publish;
pub mod report;

pub use import::{handle_import_command, ImportCommands};
pub use publish::{handle_publish_command, PublishCommands};
pub use report::{handle_report_command, ReportCommands};

use crate::api::DynamicsClient;
use crate::auth::{AuthManager, Credentials};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::*;
use std::path::PathBuf;
use std::time::Duration;

/// Where to connect and with which credentials
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Environment name from the config file (overrides current environment)
    #[arg(long)]
    pub env: Option<String>,

    /// Read DYNAMICS_* credentials from this .env file
    #[arg(long, conflicts_with = "env")]
    pub env_file: Option<PathBuf>,
}

/// Resolve credentials: --env-file, then --env, then DYNAMICS_* variables, then the
/// current config environment
pub fn resolve_credentials(args: &ConnectionArgs, config: &Config) -> Result<Credentials> {
    if let Some(path) = &args.env_file {
        return Credentials::from_env_file(path);
    }

    if let Some(name) = &args.env {
        return config.get_auth(Some(name))?.clone().into_credentials();
    }

    dotenvy::dotenv().ok();
    if Credentials::env_available() {
        return Credentials::from_env();
    }

    config.get_auth(None)?.clone().into_credentials()
}

/// Authenticate and build a Web API client
pub async fn connect(args: &ConnectionArgs, config: &Config) -> Result<DynamicsClient> {
    let credentials = resolve_credentials(args, config)?;
    println!("Connecting to {}", credentials.host.bright_green().bold());

    let token = AuthManager::new().authenticate(&credentials).await?;
    DynamicsClient::with_timeout(
        credentials.host,
        token.access_token,
        Duration::from_secs(config.settings.request_timeout_secs),
    )
}

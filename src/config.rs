use crate::auth::AuthConfig;
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "dynamics-import-customizations";

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    pub current_environment: Option<String>,
    #[serde(default)]
    pub environments: HashMap<String, AuthConfig>,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Directory for import job dumps when `--import-job-file-save-path` is not given
    #[serde(default)]
    pub import_job_file_save_path: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub overwrite_unmanaged_customizations: bool,
    #[serde(default = "default_true")]
    pub publish_workflows: bool,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    300
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            import_job_file_save_path: None,
            overwrite_unmanaged_customizations: true,
            publish_workflows: true,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join(APP_DIR)
        } else {
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(format!(".{}", APP_DIR))
        };

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load a config file; a missing file yields the defaults
    pub fn load_from(config_path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", config_path);

        if !config_path.exists() {
            info!("Config file doesn't exist, using defaults");
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        debug!(
            "Loaded config with {} environments",
            config.environments.len()
        );
        Ok(config)
    }

    /// Auth block for `name`, or for the current environment when `name` is `None`
    pub fn get_auth(&self, name: Option<&str>) -> Result<&AuthConfig> {
        let env_name = match name {
            Some(name) => name,
            None => self.current_environment.as_deref().ok_or_else(|| {
                anyhow::anyhow!(
                    "No environment selected. Set current_environment in {} or pass --env.",
                    Self::get_config_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|_| "the config file".to_string())
                )
            })?,
        };

        self.environments
            .get(env_name)
            .ok_or_else(|| anyhow::anyhow!("Environment '{}' not found", env_name))
    }
}

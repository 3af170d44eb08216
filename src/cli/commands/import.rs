use anyhow::Result;
use clap::Args;
use colored::*;
use std::path::PathBuf;

use super::{connect, ConnectionArgs};
use crate::cli::ui::ConsoleReporter;
use crate::config::Config;
use crate::import::{ComponentScope, ImportCustomizations, ImportOptions};

#[derive(Args, Debug)]
pub struct ImportCommands {
    /// Solution package (.zip) to import
    #[arg(short, long = "file-name", alias = "filename")]
    pub file_name: PathBuf,

    /// Directory for the import job XML written when the import fails (default: .)
    #[arg(long = "import-job-file-save-path", alias = "importjobfilesavepath")]
    pub import_job_file_save_path: Option<PathBuf>,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Assign activated workflows to the importing user before the import
    #[arg(long)]
    pub assign_workflows: bool,

    /// Publish unpublished duplicate detection rules after publishing customizations
    #[arg(long)]
    pub publish_duplicate_rules: bool,

    /// Report failures for every component kind, not only entities
    #[arg(long)]
    pub all_components: bool,

    /// Keep unmanaged customizations in the target organization
    #[arg(long)]
    pub no_overwrite_unmanaged: bool,

    /// Do not activate workflows contained in the solution
    #[arg(long)]
    pub no_publish_workflows: bool,
}

impl ImportCommands {
    /// Merge command line flags over the config file settings
    pub fn to_options(&self, config: &Config) -> ImportOptions {
        let settings = &config.settings;

        ImportOptions {
            file_name: self.file_name.clone(),
            import_job_file_save_path: self
                .import_job_file_save_path
                .clone()
                .or_else(|| settings.import_job_file_save_path.clone()),
            overwrite_unmanaged_customizations: settings.overwrite_unmanaged_customizations
                && !self.no_overwrite_unmanaged,
            publish_workflows: settings.publish_workflows && !self.no_publish_workflows,
            assign_workflows: self.assign_workflows,
            publish_duplicate_rules: self.publish_duplicate_rules,
            scope: if self.all_components {
                ComponentScope::All
            } else {
                ComponentScope::Entities
            },
        }
    }
}

pub async fn handle_import_command(args: ImportCommands, config: &Config) -> Result<()> {
    let options = args.to_options(config);
    let client = connect(&args.connection, config).await?;

    println!("Importing {}", options.file_name.display().to_string().cyan());
    ImportCustomizations::new(&client, &ConsoleReporter, options)
        .run()
        .await?;

    println!("{} Solution imported and customizations published", "✓".bright_green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(file: &str) -> ImportCommands {
        ImportCommands {
            file_name: PathBuf::from(file),
            import_job_file_save_path: None,
            connection: ConnectionArgs::default(),
            assign_workflows: false,
            publish_duplicate_rules: false,
            all_components: false,
            no_overwrite_unmanaged: false,
            no_publish_workflows: false,
        }
    }

    #[test]
    fn test_config_save_path_is_fallback() {
        let mut config = Config::default();
        config.settings.import_job_file_save_path = Some(PathBuf::from("from-config"));

        let options = args("solution.zip").to_options(&config);
        assert_eq!(options.import_job_file_save_path, Some(PathBuf::from("from-config")));

        let mut explicit = args("solution.zip");
        explicit.import_job_file_save_path = Some(PathBuf::from("from-cli"));
        let options = explicit.to_options(&config);
        assert_eq!(options.import_job_file_save_path, Some(PathBuf::from("from-cli")));
    }

    #[test]
    fn test_flags_override_settings() {
        let config = Config::default();
        let mut command = args("solution.zip");
        command.no_publish_workflows = true;
        command.all_components = true;

        let options = command.to_options(&config);
        assert!(options.overwrite_unmanaged_customizations);
        assert!(!options.publish_workflows);
        assert_eq!(options.scope, ComponentScope::All);
    }
}

//! The import pipeline: read package, assign workflows, import, publish.

use anyhow::Context;
use chrono::Utc;
use log::{debug, info};
use serde_json::Value;
use std::path::PathBuf;
use uuid::Uuid;

use super::diagnostics::write_import_job_dump;
use super::job_log::{output_import_job_data, ComponentScope};
use super::report::{ReportLine, Reporter};
use crate::api::{EntityReference, ImportJob, ImportSolutionRequest, OrganizationService};

/// Activated workflow definitions
const PUBLISHED_WORKFLOW_FILTER: &str = "statecode eq 1 and type eq 1";
/// Duplicate rules left unpublished by an import
const UNPUBLISHED_DUPLICATE_RULE_FILTER: &str = "statuscode eq 0";

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub file_name: PathBuf,
    pub import_job_file_save_path: Option<PathBuf>,
    pub overwrite_unmanaged_customizations: bool,
    pub publish_workflows: bool,
    /// Re-own activated workflows before importing
    pub assign_workflows: bool,
    pub publish_duplicate_rules: bool,
    pub scope: ComponentScope,
}

impl ImportOptions {
    pub fn new(file_name: impl Into<PathBuf>) -> Self {
        Self {
            file_name: file_name.into(),
            import_job_file_save_path: None,
            overwrite_unmanaged_customizations: true,
            publish_workflows: true,
            assign_workflows: false,
            publish_duplicate_rules: false,
            scope: ComponentScope::Entities,
        }
    }
}

pub struct ImportCustomizations<'a> {
    service: &'a dyn OrganizationService,
    reporter: &'a dyn Reporter,
    options: ImportOptions,
}

impl<'a> ImportCustomizations<'a> {
    pub fn new(
        service: &'a dyn OrganizationService,
        reporter: &'a dyn Reporter,
        options: ImportOptions,
    ) -> Self {
        Self {
            service,
            reporter,
            options,
        }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let package = self.read_customizations_file().await?;
        self.import_customizations_file(package).await?;
        publish_customizations(self.service, self.reporter, self.options.publish_duplicate_rules).await
    }

    async fn read_customizations_file(&self) -> anyhow::Result<Vec<u8>> {
        self.reporter.report(&ReportLine::info("Reading customization file..."));
        let path = &self.options.file_name;
        tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read customization file: {}", path.display()))
    }

    async fn import_customizations_file(&self, package: Vec<u8>) -> anyhow::Result<()> {
        let import_job_id = Uuid::new_v4();
        self.assign_workflows_to_current_user().await?;
        self.import_solution(package, import_job_id).await
    }

    async fn assign_workflows_to_current_user(&self) -> anyhow::Result<()> {
        let workflow_ids = self.published_workflow_ids().await?;
        if workflow_ids.is_empty() {
            return Ok(());
        }

        let user_id = self.service.who_am_i().await?.user_id;
        let assignee = EntityReference::new("systemuser", user_id);
        info!("Assigning {} workflows to user {}", workflow_ids.len(), user_id);

        for workflow_id in workflow_ids {
            self.service
                .assign(&EntityReference::new("workflow", workflow_id), &assignee)
                .await?;
        }
        Ok(())
    }

    async fn published_workflow_ids(&self) -> anyhow::Result<Vec<Uuid>> {
        if !self.options.assign_workflows {
            return Ok(Vec::new());
        }

        let records = self
            .service
            .retrieve_multiple("workflow", &["workflowid"], Some(PUBLISHED_WORKFLOW_FILTER))
            .await?;
        record_ids(&records, "workflowid")
    }

    async fn import_solution(&self, package: Vec<u8>, import_job_id: Uuid) -> anyhow::Result<()> {
        let request = ImportSolutionRequest {
            customization_file: package,
            overwrite_unmanaged_customizations: self.options.overwrite_unmanaged_customizations,
            publish_workflows: self.options.publish_workflows,
            import_job_id,
        };

        if let Err(error) = self.service.import_solution(&request).await {
            self.monitor_customizations(import_job_id).await;
            return Err(error);
        }

        info!("Solution import {} completed", import_job_id);
        Ok(())
    }

    /// Best effort: any failure here is reported and swallowed
    async fn monitor_customizations(&self, import_job_id: Uuid) {
        if let Err(error) = self.save_and_report_import_job(import_job_id).await {
            debug!("Import job diagnostics failed: {:#}", error);
            self.reporter
                .report(&ReportLine::warn("Unable to Save Import File to disk"));
        }
    }

    async fn save_and_report_import_job(&self, import_job_id: Uuid) -> anyhow::Result<()> {
        let record = self
            .service
            .retrieve("importjob", import_job_id, &["data", "solutionname"])
            .await?;
        let import_job: ImportJob =
            serde_json::from_value(record).context("Unexpected import job record")?;
        debug!(
            "Import job {} for solution {:?}",
            import_job_id, import_job.solution_name
        );

        // A null data column still leaves an (empty) dump behind
        let data = import_job.data.unwrap_or_default();
        let path = write_import_job_dump(
            self.options.import_job_file_save_path.as_deref(),
            &data,
            Utc::now(),
        )
        .await?;
        info!("Import job data saved to {}", path.display());

        if data.is_empty() {
            anyhow::bail!("Import job {} has no data", import_job_id);
        }

        for line in output_import_job_data(&data, self.options.scope)? {
            self.reporter.report(&line);
        }
        Ok(())
    }
}

/// Publish all customizations, then optionally the unpublished duplicate detection rules
pub async fn publish_customizations(
    service: &dyn OrganizationService,
    reporter: &dyn Reporter,
    publish_duplicate_rules: bool,
) -> anyhow::Result<()> {
    reporter.report(&ReportLine::info("Publishing customizations..."));
    service.publish_all_xml().await?;

    if publish_duplicate_rules {
        publish_all_duplicate_detection_rules(service, reporter).await?;
    }
    Ok(())
}

async fn publish_all_duplicate_detection_rules(
    service: &dyn OrganizationService,
    reporter: &dyn Reporter,
) -> anyhow::Result<()> {
    let records = service
        .retrieve_multiple(
            "duplicaterule",
            &["duplicateruleid"],
            Some(UNPUBLISHED_DUPLICATE_RULE_FILTER),
        )
        .await?;
    let rule_ids = record_ids(&records, "duplicateruleid")?;

    reporter.report(&ReportLine::info(format!(
        "Publishing {} duplicate detection rules...",
        rule_ids.len()
    )));
    for rule_id in rule_ids {
        service.publish_duplicate_rule(rule_id).await?;
    }
    Ok(())
}

fn record_ids(records: &[Value], id_column: &str) -> anyhow::Result<Vec<Uuid>> {
    records
        .iter()
        .map(|record| {
            let raw = record
                .get(id_column)
                .and_then(|v| v.as_str())
                .ok_or_else(|| anyhow::anyhow!("Record is missing {}", id_column))?;
            Uuid::parse_str(raw).with_context(|| format!("Invalid {}: {}", id_column, raw))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_ids() {
        let records = vec![
            serde_json::json!({"workflowid": "6f9619ff-8b86-d011-b42d-00c04fc964ff"}),
            serde_json::json!({"workflowid": "7f9619ff-8b86-d011-b42d-00c04fc964ff"}),
        ];

        let ids = record_ids(&records, "workflowid").unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0].to_string(), "6f9619ff-8b86-d011-b42d-00c04fc964ff");
    }

    #[test]
    fn test_record_ids_rejects_missing_column() {
        let records = vec![serde_json::json!({"name": "On create"})];
        assert!(record_ids(&records, "workflowid").is_err());
    }

    #[test]
    fn test_default_options_match_import_defaults() {
        let options = ImportOptions::new("solution.zip");

        assert!(options.overwrite_unmanaged_customizations);
        assert!(options.publish_workflows);
        assert!(!options.assign_workflows);
        assert!(!options.publish_duplicate_rules);
        assert_eq!(options.scope, ComponentScope::Entities);
    }
}

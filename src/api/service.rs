//! The organization service seam.
//!
//! Everything the import pipeline asks of the CRM goes through [`OrganizationService`],
//! so the pipeline can run against the Web API client or a test double.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::models::{EntityReference, ImportSolutionRequest, WhoAmIResponse};

#[async_trait]
pub trait OrganizationService: Send + Sync {
    /// Identify the calling user
    async fn who_am_i(&self) -> Result<WhoAmIResponse>;

    /// Give ownership of `target` to `assignee`
    async fn assign(&self, target: &EntityReference, assignee: &EntityReference) -> Result<()>;

    /// Import a solution package; blocks until the server finishes the import
    async fn import_solution(&self, request: &ImportSolutionRequest) -> Result<()>;

    /// Retrieve a single record with the given columns
    async fn retrieve(&self, logical_name: &str, id: Uuid, columns: &[&str]) -> Result<Value>;

    /// Retrieve every record matching an OData `$filter`
    async fn retrieve_multiple(
        &self,
        logical_name: &str,
        columns: &[&str],
        filter: Option<&str>,
    ) -> Result<Vec<Value>>;

    /// Publish all unpublished customizations
    async fn publish_all_xml(&self) -> Result<()>;

    /// Publish a single duplicate detection rule
    async fn publish_duplicate_rule(&self, rule_id: Uuid) -> Result<()>;
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference to a record by logical entity name and id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityReference {
    pub logical_name: String,
    pub id: Uuid,
}

impl EntityReference {
    pub fn new(logical_name: impl Into<String>, id: Uuid) -> Self {
        Self {
            logical_name: logical_name.into(),
            id,
        }
    }
}

/// Request to import a compressed solution package
#[derive(Debug, Clone)]
pub struct ImportSolutionRequest {
    pub customization_file: Vec<u8>,
    pub overwrite_unmanaged_customizations: bool,
    pub publish_workflows: bool,
    pub import_job_id: Uuid,
}

/// Body of the `ImportSolution` action as the Web API expects it
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ImportSolutionBody {
    pub overwrite_unmanaged_customizations: bool,
    pub publish_workflows: bool,
    /// Base64 encoded package
    pub customization_file: String,
    pub import_job_id: Uuid,
}

impl From<&ImportSolutionRequest> for ImportSolutionBody {
    fn from(request: &ImportSolutionRequest) -> Self {
        use base64::Engine;

        Self {
            overwrite_unmanaged_customizations: request.overwrite_unmanaged_customizations,
            publish_workflows: request.publish_workflows,
            customization_file: base64::engine::general_purpose::STANDARD
                .encode(&request.customization_file),
            import_job_id: request.import_job_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WhoAmIResponse {
    pub user_id: Uuid,
    pub business_unit_id: Uuid,
    pub organization_id: Uuid,
}

/// Server-side record of a solution import
#[derive(Debug, Clone, Deserialize)]
pub struct ImportJob {
    #[serde(rename = "importjobid", default)]
    pub id: Uuid,
    #[serde(rename = "solutionname", default)]
    pub solution_name: Option<String>,
    /// Raw import job XML
    #[serde(default)]
    pub data: Option<String>,
}

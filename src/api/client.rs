use super::constants::{self, headers, messages};
use super::models::{EntityReference, ImportSolutionBody, ImportSolutionRequest, WhoAmIResponse};
use super::service::OrganizationService;
use anyhow::Context;
use async_trait::async_trait;
use log::{debug, info};
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

/// Default request timeout. Solution imports run synchronously on the server and can
/// take several minutes.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Dynamics 365 Web API client
#[derive(Clone)]
pub struct DynamicsClient {
    base_url: String,
    http_client: reqwest::Client,
    access_token: String,
}

impl DynamicsClient {
    pub fn new(base_url: String, access_token: String) -> anyhow::Result<Self> {
        Self::with_timeout(base_url, access_token, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: String, access_token: String, timeout: Duration) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("dynamics-import-customizations/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::with_custom_client(base_url, access_token, http_client))
    }

    /// Create a new client with custom HTTP client configuration
    pub fn with_custom_client(base_url: String, access_token: String, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
            access_token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.http_client
            .get(url)
            .bearer_auth(&self.access_token)
            .header("Accept", headers::CONTENT_TYPE_JSON)
            .header("OData-Version", headers::ODATA_VERSION)
            .header("OData-MaxVersion", headers::ODATA_VERSION)
            .header(headers::X_CORRELATION_ID, Uuid::new_v4().to_string())
    }

    fn send_json(&self, method: reqwest::Method, url: &str, body: &impl serde::Serialize) -> reqwest::RequestBuilder {
        self.http_client
            .request(method, url)
            .bearer_auth(&self.access_token)
            .header("Accept", headers::CONTENT_TYPE_JSON)
            .header("Content-Type", headers::CONTENT_TYPE_JSON)
            .header("OData-Version", headers::ODATA_VERSION)
            .header("OData-MaxVersion", headers::ODATA_VERSION)
            .header(headers::X_CORRELATION_ID, Uuid::new_v4().to_string())
            .json(body)
    }

    /// Turn a non-success response into an error, extracting the OData error message
    async fn check_response(response: reqwest::Response, what: &str) -> anyhow::Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        anyhow::bail!("{} failed with status {}: {}", what, status, odata_error_message(&error_text))
    }

    async fn json_response(response: reqwest::Response, what: &str) -> anyhow::Result<Value> {
        let response = Self::check_response(response, what).await?;
        response
            .json()
            .await
            .with_context(|| format!("{} returned an invalid JSON body", what))
    }
}

/// Pull `error.message` out of an OData error body, falling back to the raw text
pub fn odata_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(|m| m.to_string())
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl OrganizationService for DynamicsClient {
    async fn who_am_i(&self) -> anyhow::Result<WhoAmIResponse> {
        let url = constants::message_endpoint(&self.base_url, messages::WHO_AM_I);
        debug!("GET {}", url);

        let response = self.get(&url).send().await.context("WhoAmI request failed")?;
        let json = Self::json_response(response, "WhoAmI").await?;
        serde_json::from_value(json).context("Unexpected WhoAmI response")
    }

    async fn assign(&self, target: &EntityReference, assignee: &EntityReference) -> anyhow::Result<()> {
        let url = constants::entity_record_endpoint(
            &self.base_url,
            &constants::entity_set_name(&target.logical_name),
            &target.id.to_string(),
        );
        let body = serde_json::json!({
            "ownerid@odata.bind": format!(
                "/{}({})",
                constants::entity_set_name(&assignee.logical_name),
                assignee.id
            )
        });
        debug!("PATCH {} -> owner {}", url, assignee.id);

        let response = self
            .send_json(reqwest::Method::PATCH, &url, &body)
            .header("If-Match", headers::IF_MATCH_ANY)
            .send()
            .await
            .with_context(|| format!("Assign request for {} {} failed", target.logical_name, target.id))?;
        Self::check_response(response, "Assign").await?;
        Ok(())
    }

    async fn import_solution(&self, request: &ImportSolutionRequest) -> anyhow::Result<()> {
        let url = constants::message_endpoint(&self.base_url, messages::IMPORT_SOLUTION);
        let body = ImportSolutionBody::from(request);
        info!(
            "Submitting solution import ({} bytes, import job {})",
            request.customization_file.len(),
            request.import_job_id
        );

        let response = self
            .send_json(reqwest::Method::POST, &url, &body)
            .send()
            .await
            .context("ImportSolution request failed")?;
        Self::check_response(response, "ImportSolution").await?;
        Ok(())
    }

    async fn retrieve(&self, logical_name: &str, id: Uuid, columns: &[&str]) -> anyhow::Result<Value> {
        let url = constants::entity_record_endpoint(
            &self.base_url,
            &constants::entity_set_name(logical_name),
            &id.to_string(),
        );
        debug!("GET {} ($select={})", url, columns.join(","));

        let mut request = self.get(&url);
        if !columns.is_empty() {
            request = request.query(&[("$select", columns.join(","))]);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Retrieve of {} {} failed", logical_name, id))?;
        Self::json_response(response, "Retrieve").await
    }

    async fn retrieve_multiple(
        &self,
        logical_name: &str,
        columns: &[&str],
        filter: Option<&str>,
    ) -> anyhow::Result<Vec<Value>> {
        let url = constants::entity_endpoint(&self.base_url, &constants::entity_set_name(logical_name));

        let mut params = Vec::new();
        if !columns.is_empty() {
            params.push(("$select", columns.join(",")));
        }
        if let Some(filter) = filter {
            params.push(("$filter", filter.to_string()));
        }

        let response = self
            .get(&url)
            .query(&params)
            .send()
            .await
            .with_context(|| format!("Query of {} failed", logical_name))?;
        let mut page = Self::json_response(response, "RetrieveMultiple").await?;

        let mut records = Vec::new();
        loop {
            if let Some(values) = page.get_mut("value").and_then(|v| v.as_array_mut()) {
                records.append(values);
            }

            let next_link = match page.get("@odata.nextLink").and_then(|l| l.as_str()) {
                Some(link) => link.to_string(),
                None => break,
            };

            debug!("Following @odata.nextLink for {}", logical_name);
            let response = self
                .get(&next_link)
                .send()
                .await
                .with_context(|| format!("Query of {} failed", logical_name))?;
            page = Self::json_response(response, "RetrieveMultiple").await?;
        }

        debug!("Retrieved {} {} records", records.len(), logical_name);
        Ok(records)
    }

    async fn publish_all_xml(&self) -> anyhow::Result<()> {
        let url = constants::message_endpoint(&self.base_url, messages::PUBLISH_ALL_XML);
        debug!("POST {}", url);

        let response = self
            .send_json(reqwest::Method::POST, &url, &serde_json::json!({}))
            .send()
            .await
            .context("PublishAllXml request failed")?;
        Self::check_response(response, "PublishAllXml").await?;
        Ok(())
    }

    async fn publish_duplicate_rule(&self, rule_id: Uuid) -> anyhow::Result<()> {
        let url = constants::bound_action_endpoint(
            &self.base_url,
            &constants::entity_set_name("duplicaterule"),
            &rule_id.to_string(),
            messages::PUBLISH_DUPLICATE_RULE,
        );
        debug!("POST {}", url);

        let response = self
            .send_json(reqwest::Method::POST, &url, &serde_json::json!({}))
            .send()
            .await
            .with_context(|| format!("PublishDuplicateRule request for {} failed", rule_id))?;
        Self::check_response(response, "PublishDuplicateRule").await?;
        Ok(())
    }
}

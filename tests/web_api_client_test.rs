//! Web API requests issued by DynamicsClient

use anyhow::Result;
use dynamics_import_customizations::api::{
    DynamicsClient, EntityReference, ImportSolutionRequest, OrganizationService,
};
use httpmock::prelude::*;
use httpmock::Method::PATCH;
use serde_json::json;
use uuid::Uuid;

const TOKEN: &str = "test-token";

fn client(server: &MockServer) -> DynamicsClient {
    DynamicsClient::new(server.base_url(), TOKEN.to_string()).unwrap()
}

#[tokio::test]
async fn test_who_am_i() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/data/v9.2/WhoAmI")
                .header("authorization", "Bearer test-token")
                .header("OData-Version", "4.0");
            then.status(200).json_body(json!({
                "@odata.context": "https://org.crm.dynamics.com/api/data/v9.2/$metadata#Microsoft.Dynamics.CRM.WhoAmIResponse",
                "BusinessUnitId": "6f9619ff-8b86-d011-b42d-00c04fc964ff",
                "UserId": "0f1e2d3c-4b5a-4968-8776-5a4b3c2d1e0f",
                "OrganizationId": "7f9619ff-8b86-d011-b42d-00c04fc964ff"
            }));
        })
        .await;

    let response = client(&server).who_am_i().await?;

    mock.assert_async().await;
    assert_eq!(response.user_id.to_string(), "0f1e2d3c-4b5a-4968-8776-5a4b3c2d1e0f");
    Ok(())
}

#[tokio::test]
async fn test_import_solution_body() -> Result<()> {
    let server = MockServer::start_async().await;
    let job_id = Uuid::parse_str("4e5f6071-8293-4dae-bfc0-3b4c5d6e7f80")?;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/data/v9.2/ImportSolution")
                .header("content-type", "application/json")
                .json_body(json!({
                    "OverwriteUnmanagedCustomizations": true,
                    "PublishWorkflows": true,
                    "CustomizationFile": "UEsDBA==",
                    "ImportJobId": "4e5f6071-8293-4dae-bfc0-3b4c5d6e7f80"
                }));
            then.status(204);
        })
        .await;

    let request = ImportSolutionRequest {
        customization_file: b"PK\x03\x04".to_vec(),
        overwrite_unmanaged_customizations: true,
        publish_workflows: true,
        import_job_id: job_id,
    };
    client(&server).import_solution(&request).await?;

    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_import_solution_error_carries_odata_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/data/v9.2/ImportSolution");
            then.status(400).json_body(json!({
                "error": {
                    "code": "0x80048068",
                    "message": "The import file is invalid. XSD validation failed."
                }
            }));
        })
        .await;

    let request = ImportSolutionRequest {
        customization_file: Vec::new(),
        overwrite_unmanaged_customizations: true,
        publish_workflows: true,
        import_job_id: Uuid::new_v4(),
    };
    let err = client(&server).import_solution(&request).await.unwrap_err();

    let message = err.to_string();
    assert!(message.contains("400"));
    assert!(message.contains("The import file is invalid. XSD validation failed."));
}

#[tokio::test]
async fn test_retrieve_import_job_columns() -> Result<()> {
    let server = MockServer::start_async().await;
    let job_id = Uuid::parse_str("4e5f6071-8293-4dae-bfc0-3b4c5d6e7f80")?;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/data/v9.2/importjobs(4e5f6071-8293-4dae-bfc0-3b4c5d6e7f80)")
                .query_param("$select", "data,solutionname");
            then.status(200).json_body(json!({
                "importjobid": "4e5f6071-8293-4dae-bfc0-3b4c5d6e7f80",
                "solutionname": "ContosoSales",
                "data": "<importexportxml />"
            }));
        })
        .await;

    let record = client(&server)
        .retrieve("importjob", job_id, &["data", "solutionname"])
        .await?;

    mock.assert_async().await;
    assert_eq!(record["solutionname"], "ContosoSales");
    Ok(())
}

#[tokio::test]
async fn test_retrieve_multiple_follows_next_link() -> Result<()> {
    let server = MockServer::start_async().await;
    let next_link = server.url("/api/data/v9.2/workflows?$skiptoken=page2");
    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/data/v9.2/workflows")
                .query_param("$select", "workflowid")
                .query_param("$filter", "statecode eq 1 and type eq 1");
            then.status(200).json_body(json!({
                "value": [{ "workflowid": "11111111-1111-4111-8111-111111111111" }],
                "@odata.nextLink": next_link
            }));
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/data/v9.2/workflows")
                .query_param("$skiptoken", "page2");
            then.status(200).json_body(json!({
                "value": [{ "workflowid": "22222222-2222-4222-8222-222222222222" }]
            }));
        })
        .await;

    let records = client(&server)
        .retrieve_multiple("workflow", &["workflowid"], Some("statecode eq 1 and type eq 1"))
        .await?;

    first.assert_async().await;
    second.assert_async().await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["workflowid"], "22222222-2222-4222-8222-222222222222");
    Ok(())
}

#[tokio::test]
async fn test_assign_binds_owner() -> Result<()> {
    let server = MockServer::start_async().await;
    let workflow_id = Uuid::parse_str("11111111-1111-4111-8111-111111111111")?;
    let user_id = Uuid::parse_str("0f1e2d3c-4b5a-4968-8776-5a4b3c2d1e0f")?;
    let mock = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/api/data/v9.2/workflows(11111111-1111-4111-8111-111111111111)")
                .json_body(json!({
                    "ownerid@odata.bind": "/systemusers(0f1e2d3c-4b5a-4968-8776-5a4b3c2d1e0f)"
                }));
            then.status(204);
        })
        .await;

    client(&server)
        .assign(
            &EntityReference::new("workflow", workflow_id),
            &EntityReference::new("systemuser", user_id),
        )
        .await?;

    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_publish_messages() -> Result<()> {
    let server = MockServer::start_async().await;
    let rule_id = Uuid::parse_str("33333333-3333-4333-8333-333333333333")?;
    let publish_all = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/data/v9.2/PublishAllXml");
            then.status(204);
        })
        .await;
    let publish_rule = server
        .mock_async(|when, then| {
            when.method(POST).path(
                "/api/data/v9.2/duplicaterules(33333333-3333-4333-8333-333333333333)/Microsoft.Dynamics.CRM.PublishDuplicateRule",
            );
            then.status(200).json_body(json!({ "JobId": "44444444-4444-4444-8444-444444444444" }));
        })
        .await;

    let client = client(&server);
    client.publish_all_xml().await?;
    client.publish_duplicate_rule(rule_id).await?;

    publish_all.assert_async().await;
    publish_rule.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_server_error_without_odata_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/data/v9.2/PublishAllXml");
            then.status(502).body("Bad Gateway");
        })
        .await;

    let err = client(&server).publish_all_xml().await.unwrap_err();
    assert!(err.to_string().contains("Bad Gateway"));
}

//! API Constants and Configuration for the Dynamics 365 Web API

/// Dynamics 365 Web API version
pub const API_VERSION: &str = "v9.2";

/// Base API path for Dynamics 365
pub const API_BASE_PATH: &str = "/api/data";

/// Full API path with version
pub fn api_path() -> String {
    format!("{}/{}", API_BASE_PATH, API_VERSION)
}

/// Standard headers for Dynamics 365 requests
pub mod headers {
    /// Content type for JSON requests
    pub const CONTENT_TYPE_JSON: &str = "application/json";

    /// OData version header
    pub const ODATA_VERSION: &str = "4.0";

    /// If-Match header for updates (any version)
    pub const IF_MATCH_ANY: &str = "*";

    /// Correlation header sent with every request
    pub const X_CORRELATION_ID: &str = "x-ms-client-request-id";
}

/// Unbound actions and functions used by the import tool
pub mod messages {
    pub const WHO_AM_I: &str = "WhoAmI";
    pub const IMPORT_SOLUTION: &str = "ImportSolution";
    pub const PUBLISH_ALL_XML: &str = "PublishAllXml";
    /// Bound to a `duplicaterule` record
    pub const PUBLISH_DUPLICATE_RULE: &str = "Microsoft.Dynamics.CRM.PublishDuplicateRule";
}

/// Build full entity set endpoint URL
pub fn entity_endpoint(base_url: &str, entity_set: &str) -> String {
    format!("{}{}/{}", base_url.trim_end_matches('/'), api_path(), entity_set)
}

/// Build entity record endpoint URL
pub fn entity_record_endpoint(base_url: &str, entity_set: &str, id: &str) -> String {
    format!("{}{}/{}({})", base_url.trim_end_matches('/'), api_path(), entity_set, id)
}

/// Build an unbound action/function endpoint URL
pub fn message_endpoint(base_url: &str, message: &str) -> String {
    format!("{}{}/{}", base_url.trim_end_matches('/'), api_path(), message)
}

/// Build a bound action endpoint URL (`<set>(<id>)/<action>`)
pub fn bound_action_endpoint(base_url: &str, entity_set: &str, id: &str, action: &str) -> String {
    format!("{}/{}", entity_record_endpoint(base_url, entity_set, id), action)
}

/// Map a logical entity name to its Web API entity set name.
///
/// Only covers the entities this tool touches; anything else gets the plain `s` suffix.
pub fn entity_set_name(logical_name: &str) -> String {
    match logical_name {
        "importjob" => "importjobs".to_string(),
        "workflow" => "workflows".to_string(),
        "systemuser" => "systemusers".to_string(),
        "duplicaterule" => "duplicaterules".to_string(),
        "solution" => "solutions".to_string(),
        other => format!("{}s", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let base = "https://org.crm.dynamics.com/";
        assert_eq!(
            entity_endpoint(base, "workflows"),
            "https://org.crm.dynamics.com/api/data/v9.2/workflows"
        );
        assert_eq!(
            entity_record_endpoint(base, "importjobs", "abc"),
            "https://org.crm.dynamics.com/api/data/v9.2/importjobs(abc)"
        );
        assert_eq!(
            bound_action_endpoint(base, "duplicaterules", "1", messages::PUBLISH_DUPLICATE_RULE),
            "https://org.crm.dynamics.com/api/data/v9.2/duplicaterules(1)/Microsoft.Dynamics.CRM.PublishDuplicateRule"
        );
    }

    #[test]
    fn test_entity_set_names() {
        assert_eq!(entity_set_name("importjob"), "importjobs");
        assert_eq!(entity_set_name("systemuser"), "systemusers");
        assert_eq!(entity_set_name("account"), "accounts");
    }
}

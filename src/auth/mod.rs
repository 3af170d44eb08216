//! Token acquisition against Azure AD

pub mod credentials;

pub use credentials::{AuthConfig, CredentialSet, Credentials};

use anyhow::Context;
use serde_json::Value;
use std::time::{Duration, SystemTime};

/// Default Azure AD authority
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Token obtained for an environment
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub access_token: String,
    pub expires_at: SystemTime,
    pub refresh_token: Option<String>,
}

/// Obtains access tokens for a Dynamics host
pub struct AuthManager {
    authority: String,
    http_client: reqwest::Client,
}

impl AuthManager {
    pub fn new() -> Self {
        Self::with_authority(DEFAULT_AUTHORITY)
    }

    /// Use a different token authority (sovereign clouds, tests)
    pub fn with_authority(authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into().trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    fn token_url(&self, tenant: &str) -> String {
        format!("{}/{}/oauth2/token", self.authority, tenant)
    }

    pub async fn authenticate(&self, credentials: &Credentials) -> anyhow::Result<TokenInfo> {
        let host = credentials.host.as_str();
        log::info!("Authenticating to {}", host);

        let request = match &credentials.credentials {
            CredentialSet::UsernamePassword {
                username,
                password,
                client_id,
                client_secret,
            } => self.http_client.post(self.token_url("common")).form(&[
                ("grant_type", "password"),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("username", username.as_str()),
                ("password", password.as_str()),
                ("resource", host),
            ]),
            CredentialSet::ClientCredentials {
                client_id,
                client_secret,
                tenant_id,
            } => self.http_client.post(self.token_url(tenant_id)).form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("resource", host),
            ]),
        };

        let response = request.send().await.context("Token request failed")?;
        log::debug!("Token request status: {}", response.status());

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            anyhow::bail!("Authentication failed: {}", error_text)
        }

        let token_data: Value = response.json().await.context("Invalid token response")?;
        let access_token = token_data
            .get("access_token")
            .and_then(|t| t.as_str())
            .ok_or_else(|| anyhow::anyhow!("No access token in response"))?;

        // Azure AD v1 returns expires_in as a string
        let expires_in = token_data
            .get("expires_in")
            .and_then(|e| e.as_u64().or_else(|| e.as_str().and_then(|s| s.parse().ok())))
            .unwrap_or(3600);

        log::info!("Successfully authenticated to {}", host);
        Ok(TokenInfo {
            access_token: access_token.to_string(),
            expires_at: SystemTime::now() + Duration::from_secs(expires_in),
            refresh_token: token_data
                .get("refresh_token")
                .and_then(|t| t.as_str())
                .map(|s| s.to_string()),
        })
    }
}

impl Default for AuthManager {
    fn default() -> Self {
        Self::new()
    }
}

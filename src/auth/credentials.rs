use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const HOST_VAR: &str = "DYNAMICS_HOST";
pub const USERNAME_VAR: &str = "DYNAMICS_USERNAME";
pub const PASSWORD_VAR: &str = "DYNAMICS_PASSWORD";
pub const CLIENT_ID_VAR: &str = "DYNAMICS_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "DYNAMICS_CLIENT_SECRET";
pub const TENANT_ID_VAR: &str = "DYNAMICS_TENANT_ID";

/// How to obtain a token for an environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSet {
    UsernamePassword {
        username: String,
        password: String,
        client_id: String,
        client_secret: String,
    },
    ClientCredentials {
        client_id: String,
        client_secret: String,
        tenant_id: String,
    },
}

/// Auth block as stored in the config file or read from the environment
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthConfig {
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub host: String,
    pub credentials: CredentialSet,
}

impl AuthConfig {
    /// Username/password wins when both are present; otherwise a tenant id selects the
    /// client credentials flow.
    pub fn into_credentials(self) -> Result<Credentials> {
        if self.host.trim().is_empty() {
            anyhow::bail!("No host configured");
        }

        let credentials = match (self.username, self.password, self.tenant_id) {
            (Some(username), Some(password), _) => CredentialSet::UsernamePassword {
                username,
                password,
                client_id: self.client_id,
                client_secret: self.client_secret,
            },
            (None, _, Some(tenant_id)) => CredentialSet::ClientCredentials {
                client_id: self.client_id,
                client_secret: self.client_secret,
                tenant_id,
            },
            (Some(_), None, _) => anyhow::bail!("{} is set but {} is missing", USERNAME_VAR, PASSWORD_VAR),
            (None, _, None) => anyhow::bail!(
                "Either {} and {} or {} must be provided",
                USERNAME_VAR,
                PASSWORD_VAR,
                TENANT_ID_VAR
            ),
        };

        Ok(Credentials {
            host: self.host,
            credentials,
        })
    }
}

impl Credentials {
    /// Read credentials through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Credentials>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| anyhow::anyhow!("{} environment variable not set", key))
        };

        let auth = AuthConfig {
            host: required(HOST_VAR)?,
            username: lookup(USERNAME_VAR),
            password: lookup(PASSWORD_VAR),
            client_id: required(CLIENT_ID_VAR)?,
            client_secret: required(CLIENT_SECRET_VAR)?,
            tenant_id: lookup(TENANT_ID_VAR),
        };

        auth.into_credentials()
    }

    /// True when the process environment carries at least a host
    pub fn env_available() -> bool {
        std::env::var(HOST_VAR).is_ok()
    }

    pub fn from_env() -> Result<Credentials> {
        info!("Importing credentials from environment variables");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_env_file(path: &Path) -> Result<Credentials> {
        info!("Importing credentials from .env file: {}", path.display());

        if !path.exists() {
            anyhow::bail!("Environment file not found: {}", path.display());
        }

        dotenvy::from_path(path)
            .map_err(|e| anyhow::anyhow!("Failed to load .env file '{}': {}", path.display(), e))?;

        Self::from_env()
            .map_err(|e| anyhow::anyhow!("{} (while reading {})", e, path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_username_password_from_lookup() {
        let creds = Credentials::from_lookup(lookup_from(&[
            (HOST_VAR, "https://org.crm.dynamics.com"),
            (USERNAME_VAR, "admin@contoso.com"),
            (PASSWORD_VAR, "secret"),
            (CLIENT_ID_VAR, "client"),
            (CLIENT_SECRET_VAR, "client-secret"),
        ]))
        .unwrap();

        assert_eq!(creds.host, "https://org.crm.dynamics.com");
        assert!(matches!(creds.credentials, CredentialSet::UsernamePassword { ref username, .. } if username == "admin@contoso.com"));
    }

    #[test]
    fn test_client_credentials_from_lookup() {
        let creds = Credentials::from_lookup(lookup_from(&[
            (HOST_VAR, "https://org.crm.dynamics.com"),
            (CLIENT_ID_VAR, "client"),
            (CLIENT_SECRET_VAR, "client-secret"),
            (TENANT_ID_VAR, "tenant"),
        ]))
        .unwrap();

        assert_eq!(
            creds.credentials,
            CredentialSet::ClientCredentials {
                client_id: "client".to_string(),
                client_secret: "client-secret".to_string(),
                tenant_id: "tenant".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_host_is_reported() {
        let err = Credentials::from_lookup(lookup_from(&[(CLIENT_ID_VAR, "client")])).unwrap_err();
        assert!(err.to_string().contains(HOST_VAR));
    }

    #[test]
    fn test_username_without_password_is_rejected() {
        let auth = AuthConfig {
            host: "https://org.crm.dynamics.com".to_string(),
            username: Some("admin".to_string()),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            ..Default::default()
        };
        assert!(auth.into_credentials().is_err());
    }
}

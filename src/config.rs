use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::azure_client::AzureDevOpsClient;
use crate::webhook::WebhookCredentials;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // Basic credentials configured on the service-hook subscription
    pub webhook_username: String,
    pub webhook_password: SecretString,
    // Azure DevOps organization, project and PAT for REST calls
    pub azdo_org: String,
    pub azdo_project: String,
    pub azdo_pat: SecretString,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    // Optional build to queue when a git.push arrives
    pub queue_build_definition_id: Option<u64>,
    pub queue_build_source_branch: Option<String>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:9000".to_string()
}

impl Config {
    pub fn load() -> Result<Self> {
        #[cfg(debug_assertions)]
        if let Err(e) = dotenvy::from_filename(".env.local") {
            tracing::debug!(error = %e, "no .env.local loaded");
        }

        Self::from_env(Environment::default().separator("__"))
    }

    fn from_env(env: Environment) -> Result<Self> {
        let config = ConfigBuilder::builder()
            .add_source(env)
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    pub fn webhook_credentials(&self) -> WebhookCredentials {
        WebhookCredentials::new(
            self.webhook_username.clone(),
            self.webhook_password.expose_secret().to_string(),
        )
    }

    pub fn azure_client(&self) -> AzureDevOpsClient {
        AzureDevOpsClient::new(&self.azdo_org, &self.azdo_project, self.azdo_pat.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::default().separator("__").source(Some(map))
    }

    #[test]
    fn loads_required_and_optional_settings() {
        let config = Config::from_env(env(&[
            ("WEBHOOK_USERNAME", "hook"),
            ("WEBHOOK_PASSWORD", "s3cret"),
            ("AZDO_ORG", "fabrikam"),
            ("AZDO_PROJECT", "Fabrikam-Fiber-Git"),
            ("AZDO_PAT", "pat"),
            ("QUEUE_BUILD_DEFINITION_ID", "12"),
        ]))
        .unwrap();

        assert_eq!(config.webhook_username, "hook");
        assert_eq!(config.webhook_password.expose_secret(), "s3cret");
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.queue_build_definition_id, Some(12));
        assert_eq!(config.queue_build_source_branch, None);
        assert_eq!(config.azure_client().project, "Fabrikam-Fiber-Git");
    }

    #[test]
    fn missing_credentials_fail() {
        assert!(Config::from_env(env(&[("AZDO_ORG", "fabrikam")])).is_err());
    }
}

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::api::{ApiClient, WebhooksApi, WorkflowsApi};
use crate::config::schema::DEFAULT_API_URL;
use crate::config::{self, validate_config, ProviderConfig};
use crate::error::Result;
use crate::resources::{create_resource_registry, Resource, ResourceRegistry};
use crate::schema::{Attribute, Block, ResourceSchema};

pub const PROVIDER_NAME: &str = "cased";

/// Declared provider settings. Values missing from configuration fall back
/// to `CASED_API_URL`, `CASED_WORKFLOWS_API_KEY` and `CASED_API_KEY`.
pub fn provider_schema() -> ResourceSchema {
    ResourceSchema::new(
        PROVIDER_NAME,
        "Cased provider settings.",
        Block::new()
            .attribute(
                "api_url",
                Attribute::string()
                    .optional()
                    .default_value(json!(DEFAULT_API_URL))
                    .describe("Base URL of the Cased API (env: CASED_API_URL)."),
            )
            .attribute(
                "workflows_api_key",
                Attribute::string()
                    .optional()
                    .sensitive()
                    .describe("Key for the workflows API (env: CASED_WORKFLOWS_API_KEY)."),
            )
            .attribute(
                "api_key",
                Attribute::string()
                    .optional()
                    .sensitive()
                    .describe("Key for webhooks endpoints (env: CASED_API_KEY)."),
            )
            .attribute(
                "timeout_ms",
                Attribute::int()
                    .optional()
                    .describe("Per-request timeout in milliseconds."),
            ),
    )
}

/// One authenticated client per credential.
#[derive(Debug, Clone)]
pub struct ProviderClients {
    pub workflows: WorkflowsApi,
    pub webhooks: Option<WebhooksApi>,
}

impl ProviderClients {
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let workflows = WorkflowsApi::new(ApiClient::new(
            config.api_url(),
            config.workflows_api_key.as_deref(),
            config.timeout_ms(),
            "workflows",
        )?);

        let webhooks = match config.api_key.as_deref() {
            Some(api_key) => Some(WebhooksApi::new(ApiClient::new(
                config.api_url(),
                Some(api_key),
                config.timeout_ms(),
                "webhooks",
            )?)),
            None => None,
        };

        Ok(Self {
            workflows,
            webhooks,
        })
    }
}

pub struct Provider {
    config: ProviderConfig,
    clients: ProviderClients,
    registry: ResourceRegistry,
}

impl Provider {
    pub fn configure(config: ProviderConfig) -> Result<Self> {
        validate_config(&config)?;
        let clients = ProviderClients::from_config(&config)?;
        let registry = create_resource_registry(&clients);

        if clients.webhooks.is_none() {
            tracing::debug!("no api_key configured; webhooks endpoints are unavailable");
        }
        tracing::debug!(
            api_url = config.api_url(),
            resources = ?registry.type_names(),
            "configured cased provider"
        );

        Ok(Self {
            config,
            clients,
            registry,
        })
    }

    /// Load `path` (if any) layered over the environment, then configure.
    pub fn from_config_path(path: Option<&Path>) -> Result<Self> {
        Self::configure(config::load(path)?)
    }

    pub fn schema() -> ResourceSchema {
        provider_schema()
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn clients(&self) -> &ProviderClients {
        &self.clients
    }

    pub fn resource(&self, type_name: &str) -> Result<Arc<dyn Resource>> {
        self.registry.get(type_name)
    }

    pub fn resource_types(&self) -> Vec<&str> {
        self.registry.type_names()
    }

    pub fn schemas(&self) -> Vec<&ResourceSchema> {
        self.registry.schemas()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{WEBHOOKS_ENDPOINT_TYPE, WORKFLOW_TYPE};

    fn config() -> ProviderConfig {
        ProviderConfig {
            api_url: Some("http://localhost:9999".to_owned()),
            workflows_api_key: Some("wk_test".to_owned()),
            api_key: None,
            timeout_ms: Some(1_000),
        }
    }

    #[test]
    fn registers_both_resource_types() {
        let provider = Provider::configure(config()).unwrap();
        assert_eq!(
            provider.resource_types(),
            vec![WEBHOOKS_ENDPOINT_TYPE, WORKFLOW_TYPE]
        );
        assert_eq!(provider.schemas().len(), 2);
        assert!(provider.clients().webhooks.is_none());
    }

    #[test]
    fn unknown_resource_type_is_not_found() {
        let provider = Provider::configure(config()).unwrap();
        let error = provider.resource("cased_policy").err().expect("should fail");
        assert!(error.is_not_found());
    }

    #[test]
    fn configure_rejects_missing_workflows_key() {
        let mut config = config();
        config.workflows_api_key = None;
        assert!(Provider::configure(config).is_err());
    }

    #[test]
    fn configure_builds_webhooks_client_when_api_key_is_set() {
        let mut config = config();
        config.api_key = Some("sk_test".to_owned());
        let provider = Provider::configure(config).unwrap();
        assert!(provider.clients().webhooks.is_some());
    }

    #[test]
    fn from_config_path_reads_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        std::io::Write::write_all(
            &mut file,
            b"api_url = \"http://localhost:9999/\"\nworkflows_api_key = \"wk_file\"\n",
        )
        .unwrap();

        let provider = Provider::from_config_path(Some(file.path())).unwrap();
        assert_eq!(provider.config().api_url(), "http://localhost:9999");
        assert_eq!(provider.config().workflows_api_key.as_deref(), Some("wk_file"));
    }

    #[test]
    fn provider_schema_marks_keys_sensitive() {
        let schema = Provider::schema().to_json_schema();
        assert_eq!(schema["properties"]["api_key"]["writeOnly"], json!(true));
        assert_eq!(
            schema["properties"]["api_url"]["default"],
            json!("https://api.cased.com")
        );
    }
}

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{EventType, WebhooksApi, WebhooksEndpoint, WebhooksEndpointParams};
use crate::config::schema::API_KEY_ENV;
use crate::error::{Error, Result};
use crate::resources::types::{Resource, ResourceData};
use crate::schema::{Attribute, Block, ResourceSchema, ScalarKind};

pub const WEBHOOKS_ENDPOINT_TYPE: &str = "cased_webhooks_endpoint";

pub fn webhooks_endpoint_schema() -> ResourceSchema {
    let event_types = EventType::ALL.map(|event_type| event_type.as_str());

    ResourceSchema::new(
        WEBHOOKS_ENDPOINT_TYPE,
        "An HTTPS endpoint that receives Cased webhook deliveries.",
        Block::new()
            .attribute("url", Attribute::string().required())
            .attribute("secret", Attribute::string().computed().sensitive())
            .attribute(
                "event_types",
                Attribute::set(ScalarKind::String)
                    .optional()
                    .one_of(&event_types),
            )
            .attribute("updated_at", Attribute::string().optional().computed())
            .attribute("created_at", Attribute::string().optional().computed()),
    )
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhooksEndpointState {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default)]
    pub event_types: Vec<EventType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Params carry only the attributes that differ from the prior state.
pub fn build_webhooks_endpoint_params(data: &ResourceData) -> Result<WebhooksEndpointParams> {
    let desired: WebhooksEndpointState = data.config_as()?;
    let mut params = WebhooksEndpointParams::default();

    if data.has_change("url") {
        params.url = Some(desired.url);
    }

    if data.has_set_change("event_types") {
        let unique: BTreeSet<EventType> = desired.event_types.into_iter().collect();
        params.event_types = Some(unique.into_iter().collect());
    }

    Ok(params)
}

pub fn flatten_webhooks_endpoint(endpoint: &WebhooksEndpoint) -> WebhooksEndpointState {
    let mut event_types = endpoint.event_types.clone();
    event_types.sort();
    event_types.dedup();

    WebhooksEndpointState {
        url: endpoint.url.clone(),
        secret: Some(endpoint.secret.clone()).filter(|secret| !secret.is_empty()),
        event_types,
        updated_at: endpoint.updated_at.as_ref().map(format_timestamp),
        created_at: endpoint.created_at.as_ref().map(format_timestamp),
    }
}

/// RFC 3339 with the fractional second trimmed of trailing zeros.
fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    let formatted = timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true);
    let Some((seconds, fraction)) = formatted
        .strip_suffix('Z')
        .and_then(|value| value.split_once('.'))
    else {
        return formatted;
    };

    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{seconds}Z")
    } else {
        format!("{seconds}.{fraction}Z")
    }
}

pub struct WebhooksEndpointResource {
    api: Option<WebhooksApi>,
    schema: ResourceSchema,
}

impl WebhooksEndpointResource {
    /// `api` is `None` when no general API key was configured; every
    /// operation then fails with a configuration error.
    pub fn new(api: Option<WebhooksApi>) -> Self {
        Self {
            api,
            schema: webhooks_endpoint_schema(),
        }
    }

    fn api(&self) -> Result<&WebhooksApi> {
        self.api.as_ref().ok_or_else(|| {
            Error::Config(format!(
                "{WEBHOOKS_ENDPOINT_TYPE} requires api_key (or {API_KEY_ENV}) to be set"
            ))
        })
    }
}

#[async_trait]
impl Resource for WebhooksEndpointResource {
    fn type_name(&self) -> &str {
        WEBHOOKS_ENDPOINT_TYPE
    }

    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    async fn create(&self, data: &mut ResourceData) -> Result<()> {
        let params = build_webhooks_endpoint_params(data)?;
        let endpoint = self.api()?.create_webhooks_endpoint(&params).await?;

        if endpoint.id.is_empty() {
            return Err(Error::Provider(
                "create webhooks endpoint response did not include an id".to_owned(),
            ));
        }

        tracing::info!(endpoint_id = %endpoint.id, "created webhooks endpoint");
        data.set_id(endpoint.id);
        self.read(data).await
    }

    async fn read(&self, data: &mut ResourceData) -> Result<()> {
        let endpoint_id = data.require_id()?.to_owned();

        match self.api()?.get_webhooks_endpoint(&endpoint_id).await {
            Ok(endpoint) => data.set_state(&flatten_webhooks_endpoint(&endpoint)),
            Err(err) if err.is_not_found() => {
                tracing::info!(
                    %endpoint_id,
                    "webhooks endpoint no longer exists; removing from state"
                );
                data.mark_absent();
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn update(&self, data: &mut ResourceData) -> Result<()> {
        let endpoint_id = data.require_id()?.to_owned();
        let params = build_webhooks_endpoint_params(data)?;

        self.api()?
            .update_webhooks_endpoint(&endpoint_id, &params)
            .await?;

        tracing::info!(%endpoint_id, "updated webhooks endpoint");
        self.read(data).await
    }

    async fn delete(&self, data: &mut ResourceData) -> Result<()> {
        let endpoint_id = data.require_id()?.to_owned();

        match self.api()?.delete_webhooks_endpoint(&endpoint_id).await {
            Ok(()) => tracing::info!(%endpoint_id, "deleted webhooks endpoint"),
            Err(err) if err.is_not_found() => {
                tracing::warn!(%endpoint_id, "webhooks endpoint already deleted");
            }
            Err(err) => return Err(err),
        }

        data.mark_absent();
        Ok(())
    }
}

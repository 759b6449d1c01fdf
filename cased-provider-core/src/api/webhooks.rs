use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::client::{encode_segment, ApiClient};
use crate::api::null_as_default;
use crate::error::{Error, Result};

const ENDPOINTS_PATH: &str = "/webhooks/endpoints";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventType {
    #[serde(rename = "event.created")]
    EventCreated,
    #[serde(rename = "workflow.result.created")]
    WorkflowResultCreated,
    #[serde(rename = "workflow.result.updated")]
    WorkflowResultUpdated,
}

impl EventType {
    pub const ALL: [EventType; 3] = [
        EventType::EventCreated,
        EventType::WorkflowResultCreated,
        EventType::WorkflowResultUpdated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::EventCreated => "event.created",
            EventType::WorkflowResultCreated => "workflow.result.created",
            EventType::WorkflowResultUpdated => "workflow.result.updated",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        EventType::ALL
            .into_iter()
            .find(|event_type| event_type.as_str() == value)
            .ok_or_else(|| Error::Validation(format!("unknown webhook event type '{value}'")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhooksEndpoint {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub secret: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub event_types: Vec<EventType>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create/update body. Unset fields are left untouched by the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhooksEndpointParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_types: Option<Vec<EventType>>,
}

/// Webhooks endpoint operations, authenticated with the general API key.
#[derive(Debug, Clone)]
pub struct WebhooksApi {
    client: ApiClient,
}

impl WebhooksApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn create_webhooks_endpoint(
        &self,
        params: &WebhooksEndpointParams,
    ) -> Result<WebhooksEndpoint> {
        self.client.post(ENDPOINTS_PATH, params).await
    }

    pub async fn get_webhooks_endpoint(&self, endpoint_id: &str) -> Result<WebhooksEndpoint> {
        self.client.get(&endpoint_path(endpoint_id)).await
    }

    pub async fn update_webhooks_endpoint(
        &self,
        endpoint_id: &str,
        params: &WebhooksEndpointParams,
    ) -> Result<WebhooksEndpoint> {
        self.client.patch(&endpoint_path(endpoint_id), params).await
    }

    pub async fn delete_webhooks_endpoint(&self, endpoint_id: &str) -> Result<()> {
        self.client.delete(&endpoint_path(endpoint_id)).await
    }
}

fn endpoint_path(endpoint_id: &str) -> String {
    format!("{ENDPOINTS_PATH}/{}", encode_segment(endpoint_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_for(server: &MockServer) -> WebhooksApi {
        WebhooksApi::new(ApiClient::new(&server.uri(), Some("sk_test"), 1_000, "webhooks").unwrap())
    }

    #[test]
    fn event_types_use_dotted_wire_names() {
        assert_eq!(
            serde_json::to_value(EventType::WorkflowResultUpdated).unwrap(),
            json!("workflow.result.updated")
        );
        assert_eq!(
            "event.created".parse::<EventType>().unwrap(),
            EventType::EventCreated
        );
        assert!("event.deleted".parse::<EventType>().is_err());
    }

    #[test]
    fn params_omit_unchanged_fields() {
        let params = WebhooksEndpointParams {
            url: None,
            event_types: Some(vec![EventType::EventCreated]),
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({ "event_types": ["event.created"] })
        );
    }

    #[test]
    fn null_fields_decode_as_empty() {
        let endpoint: WebhooksEndpoint = serde_json::from_value(json!({
            "id": "webhook_endpoint_1",
            "url": "https://example.com/hooks",
            "secret": null,
            "event_types": null,
            "created_at": null
        }))
        .unwrap();

        assert!(endpoint.event_types.is_empty());
        assert!(endpoint.secret.is_empty());
        assert!(endpoint.created_at.is_none());
    }

    #[tokio::test]
    async fn create_posts_params_with_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhooks/endpoints"))
            .and(header("authorization", "Bearer sk_test"))
            .and(body_json(json!({ "url": "https://example.com/hook" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "webhook_endpoint_1",
                "url": "https://example.com/hook",
                "secret": "whsec_1",
                "event_types": [],
                "created_at": "2021-06-01T12:00:00.123456Z",
                "updated_at": "2021-06-01T12:00:00.123456Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let params = WebhooksEndpointParams {
            url: Some("https://example.com/hook".to_owned()),
            event_types: None,
        };
        let endpoint = api_for(&server)
            .create_webhooks_endpoint(&params)
            .await
            .unwrap();
        assert_eq!(endpoint.id, "webhook_endpoint_1");
        assert_eq!(endpoint.secret, "whsec_1");
        assert!(endpoint.created_at.is_some());
    }

    #[tokio::test]
    async fn get_of_deleted_endpoint_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/webhooks/endpoints/gone"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": "not_found",
                "message": "Webhooks endpoint not found"
            })))
            .mount(&server)
            .await;

        let error = api_for(&server)
            .get_webhooks_endpoint("gone")
            .await
            .unwrap_err();
        assert!(error.is_not_found());
    }
}

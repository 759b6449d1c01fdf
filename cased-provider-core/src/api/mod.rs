pub mod client;
pub mod http_client;
pub mod webhooks;
pub mod workflows;

use serde::{Deserialize, Deserializer};

pub use client::{classify_error, ApiClient, ApiErrorDetail, ApiErrorResponse};
pub use webhooks::{EventType, WebhooksApi, WebhooksEndpoint, WebhooksEndpointParams};
pub use workflows::{
    ApprovalControl, ApprovalSources, Condition, Controls, Operator, ResponderRequirement,
    Responders, SlackSource, Workflow, WorkflowsApi,
};

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

pub(crate) fn is_zero(value: &i64) -> bool {
    *value == 0
}

/// Decode an explicit JSON `null` the same way as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

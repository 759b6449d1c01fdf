use std::sync::Arc;

use crate::provider::ProviderClients;
use crate::resources::registry::ResourceRegistry;
use crate::resources::webhooks_endpoint::{webhooks_endpoint_schema, WebhooksEndpointResource};
use crate::resources::workflow::{workflow_schema, WorkflowResource};
use crate::schema::ResourceSchema;

pub fn create_resource_registry(clients: &ProviderClients) -> ResourceRegistry {
    let mut registry = ResourceRegistry::default();

    registry.register(Arc::new(WorkflowResource::new(clients.workflows.clone())));
    registry.register(Arc::new(WebhooksEndpointResource::new(
        clients.webhooks.clone(),
    )));

    registry
}

/// Schemas for every resource type, sorted by type name. Needs no credentials.
pub fn resource_schemas() -> Vec<ResourceSchema> {
    vec![webhooks_endpoint_schema(), workflow_schema()]
}

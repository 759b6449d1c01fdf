pub mod factory;
pub mod registry;
pub mod types;
pub mod webhooks_endpoint;
pub mod workflow;

pub use factory::{create_resource_registry, resource_schemas};
pub use registry::ResourceRegistry;
pub use types::{Resource, ResourceData};
pub use webhooks_endpoint::{WebhooksEndpointResource, WEBHOOKS_ENDPOINT_TYPE};
pub use workflow::{WorkflowResource, WORKFLOW_TYPE};

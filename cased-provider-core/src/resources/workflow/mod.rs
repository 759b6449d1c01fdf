pub mod mapping;
pub mod state;

use async_trait::async_trait;

use crate::api::WorkflowsApi;
use crate::error::{Error, Result};
use crate::resources::types::{Resource, ResourceData};
use crate::schema::ResourceSchema;

pub use mapping::{build_workflow, flatten_workflow};
pub use state::{workflow_schema, WorkflowState, WORKFLOW_TYPE};

pub struct WorkflowResource {
    api: WorkflowsApi,
    schema: ResourceSchema,
}

impl WorkflowResource {
    pub fn new(api: WorkflowsApi) -> Self {
        Self {
            api,
            schema: workflow_schema(),
        }
    }
}

#[async_trait]
impl Resource for WorkflowResource {
    fn type_name(&self) -> &str {
        WORKFLOW_TYPE
    }

    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    async fn create(&self, data: &mut ResourceData) -> Result<()> {
        let desired: WorkflowState = data.config_as()?;
        let created = self
            .api
            .create_workflow(&build_workflow(&desired, None))
            .await?;

        if created.id.is_empty() {
            return Err(Error::Provider(
                "create workflow response did not include an id".to_owned(),
            ));
        }

        tracing::info!(workflow_id = %created.id, "created workflow");
        data.set_id(created.id);
        self.read(data).await
    }

    async fn read(&self, data: &mut ResourceData) -> Result<()> {
        let workflow_id = data.require_id()?.to_owned();

        match self.api.get_workflow(&workflow_id).await {
            Ok(workflow) => data.set_state(&flatten_workflow(&workflow)),
            Err(err) if err.is_not_found() => {
                tracing::info!(%workflow_id, "workflow no longer exists; removing from state");
                data.mark_absent();
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn update(&self, data: &mut ResourceData) -> Result<()> {
        let workflow_id = data.require_id()?.to_owned();
        let desired: WorkflowState = data.config_as()?;

        self.api
            .update_workflow(&build_workflow(&desired, Some(&workflow_id)))
            .await?;

        tracing::info!(%workflow_id, "updated workflow");
        self.read(data).await
    }

    async fn delete(&self, data: &mut ResourceData) -> Result<()> {
        let workflow_id = data.require_id()?.to_owned();

        match self.api.delete_workflow(&workflow_id).await {
            Ok(()) => tracing::info!(%workflow_id, "deleted workflow"),
            Err(err) if err.is_not_found() => {
                tracing::warn!(%workflow_id, "workflow already deleted");
            }
            Err(err) => return Err(err),
        }

        data.mark_absent();
        Ok(())
    }
}

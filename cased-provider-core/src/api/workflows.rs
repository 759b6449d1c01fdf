use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::client::{encode_segment, ApiClient};
use crate::api::{is_false, is_zero, null_as_default};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Workflow {
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub id: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub name: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub api_url: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub conditions: Vec<Condition>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub controls: Controls,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub updated_at: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Condition {
    #[serde(default, deserialize_with = "null_as_default")]
    pub field: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
    pub operator: Operator,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Eq,
    In,
    Not,
    EndsWith,
    StartsWith,
}

impl Operator {
    pub const ALL: [Operator; 5] = [
        Operator::Eq,
        Operator::In,
        Operator::Not,
        Operator::EndsWith,
        Operator::StartsWith,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::In => "in",
            Operator::Not => "not",
            Operator::EndsWith => "endsWith",
            Operator::StartsWith => "startsWith",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        Operator::ALL
            .into_iter()
            .find(|operator| operator.as_str() == value)
            .ok_or_else(|| Error::Validation(format!("unknown condition operator '{value}'")))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Controls {
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "is_false"
    )]
    pub reason: bool,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "is_false"
    )]
    pub authentication: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval: Option<ApprovalControl>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApprovalControl {
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "is_zero"
    )]
    pub count: i64,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "is_false"
    )]
    pub self_approval: bool,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "is_zero"
    )]
    pub duration: i64,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "is_zero"
    )]
    pub timeout: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responders: Option<Responders>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<ApprovalSources>,
}

/// Responder name to whether their approval is mandatory.
pub type Responders = BTreeMap<String, ResponderRequirement>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponderRequirement {
    Required,
    Optional,
}

impl ResponderRequirement {
    pub fn from_required(required: bool) -> Self {
        if required {
            ResponderRequirement::Required
        } else {
            ResponderRequirement::Optional
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, ResponderRequirement::Required)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApprovalSources {
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "is_false"
    )]
    pub email: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack: Option<SlackSource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlackSource {
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub channel: String,
}

/// Workflow endpoints, authenticated with the workflows API key.
#[derive(Debug, Clone)]
pub struct WorkflowsApi {
    client: ApiClient,
}

impl WorkflowsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list_workflows(&self) -> Result<Vec<Workflow>> {
        self.client.get("/workflows").await
    }

    pub async fn create_workflow(&self, workflow: &Workflow) -> Result<Workflow> {
        self.client.post("/workflows", workflow).await
    }

    pub async fn get_workflow(&self, workflow_id: &str) -> Result<Workflow> {
        self.client.get(&workflow_path(workflow_id)).await
    }

    pub async fn update_workflow(&self, workflow: &Workflow) -> Result<Workflow> {
        if workflow.id.is_empty() {
            return Err(Error::Validation(
                "cannot update a workflow without an id".to_owned(),
            ));
        }
        self.client
            .patch(&workflow_path(&workflow.id), workflow)
            .await
    }

    pub async fn delete_workflow(&self, workflow_id: &str) -> Result<()> {
        self.client.delete(&workflow_path(workflow_id)).await
    }
}

fn workflow_path(workflow_id: &str) -> String {
    format!("/workflows/{}", encode_segment(workflow_id))
}

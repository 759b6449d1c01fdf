//! JSON request/response protocol a host uses to drive resource handlers.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};
use crate::provider::Provider;
use crate::resources::ResourceData;
use crate::schema::ResourceSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Import,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Import => "import",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceRequest {
    pub operation: Operation,
    pub resource_type: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub config: Option<Value>,
    #[serde(default)]
    pub prior_state: Option<Value>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail,
        }
    }

    pub fn warning(summary: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            detail,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResourceResponse {
    pub id: Option<String>,
    pub state: Option<Value>,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl ResourceResponse {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity == Severity::Error)
    }

    fn from_data(data: ResourceData) -> Self {
        let (id, state) = data.into_parts();
        Self {
            id,
            state: (!state.is_null()).then_some(state),
            diagnostics: Vec::new(),
        }
    }

    fn unchanged(request: &ResourceRequest, diagnostic: Diagnostic) -> Self {
        Self {
            id: request.id.clone(),
            state: request.prior_state.clone(),
            diagnostics: vec![diagnostic],
        }
    }
}

/// Fill defaults, then check the configuration against the resource schema.
pub fn prepare_config(schema: &ResourceSchema, mut config: Value) -> Result<Value> {
    if config.is_null() {
        config = Value::Object(serde_json::Map::new());
    }
    schema.normalize(&mut config);
    schema.validate(&config)?;
    Ok(config)
}

pub async fn handle_request(provider: &Provider, request: ResourceRequest) -> ResourceResponse {
    let operation = request.operation;
    let resource_type = request.resource_type.clone();

    let resource = match provider.resource(&resource_type) {
        Ok(resource) => resource,
        Err(err) => {
            return ResourceResponse::unchanged(
                &request,
                Diagnostic::error("unsupported resource type", Some(err.to_string())),
            );
        }
    };

    if operation != Operation::Create
        && request.id.as_deref().map(str::is_empty).unwrap_or(true)
    {
        return ResourceResponse::unchanged(
            &request,
            Diagnostic::error(
                format!("{operation} {resource_type} requires an id"),
                None,
            ),
        );
    }

    let config = match operation {
        Operation::Create | Operation::Update => {
            let raw = request.config.clone().unwrap_or(Value::Null);
            match prepare_config(resource.schema(), raw) {
                Ok(config) => config,
                Err(err) => {
                    return ResourceResponse::unchanged(
                        &request,
                        Diagnostic::error("invalid configuration", Some(err.to_string())),
                    );
                }
            }
        }
        _ => Value::Null,
    };

    let mut data = ResourceData::new(
        request.id.clone(),
        config,
        request.prior_state.clone().unwrap_or(Value::Null),
    );

    tracing::debug!(%operation, %resource_type, id = ?data.id(), "handling resource request");

    let result = match operation {
        Operation::Create => resource.create(&mut data).await,
        Operation::Read => resource.read(&mut data).await,
        Operation::Update => resource.update(&mut data).await,
        Operation::Delete => resource.delete(&mut data).await,
        Operation::Import => resource.import(&mut data).await,
    };

    let requested_id = request.id.unwrap_or_default();
    let mut response = ResourceResponse::from_data(data);

    match result {
        Ok(()) => match operation {
            Operation::Read if response.id.is_none() => {
                response.diagnostics.push(Diagnostic::warning(
                    format!("{resource_type} '{requested_id}' no longer exists"),
                    Some("the resource was removed from state".to_owned()),
                ));
            }
            Operation::Import if response.id.is_none() => {
                response.diagnostics.push(Diagnostic::error(
                    format!("cannot import non-existent {resource_type}"),
                    Some(format!("no remote object with id '{requested_id}'")),
                ));
            }
            _ => {}
        },
        Err(err) => {
            tracing::warn!(%operation, %resource_type, error = %err, "resource request failed");
            response
                .diagnostics
                .push(error_diagnostic(operation, &resource_type, &err));
        }
    }

    response
}

fn error_diagnostic(operation: Operation, resource_type: &str, error: &Error) -> Diagnostic {
    Diagnostic::error(
        format!("{operation} {resource_type} failed"),
        Some(error.to_string()),
    )
}

/// Answer line-delimited JSON requests until the reader is exhausted.
pub async fn serve<R, W>(provider: &Provider, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<ResourceRequest>(line) {
            Ok(request) => handle_request(provider, request).await,
            Err(err) => ResourceResponse {
                diagnostics: vec![Diagnostic::error(
                    "malformed request",
                    Some(err.to_string()),
                )],
                ..ResourceResponse::default()
            },
        };

        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        writer.write_all(&encoded).await?;
        writer.flush().await?;
    }

    Ok(())
}

mod cli;
mod renderer;

use std::path::Path;

use cased_provider_core::config::{self, ProviderConfig};
use cased_provider_core::logging::init_tracing;
use cased_provider_core::protocol::{self, Operation, ResourceRequest};
use cased_provider_core::provider::provider_schema;
use cased_provider_core::resources::resource_schemas;
use cased_provider_core::schema::ResourceSchema;
use cased_provider_core::{Error, Provider, Result};
use serde_json::{Map, Value};

use crate::cli::{Cli, Command, OutputFormat, WorkflowsCommand};
use crate::renderer::Renderer;

fn main() {
    if let Err(error) = run() {
        eprintln!("cased-provider failed: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Cli::parse_args();
    init_tracing(&args.log_level);

    let renderer = Renderer::new(args.output);
    let command = command_name(&args.command);

    match execute(&args, &renderer) {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(error) => match args.output {
            OutputFormat::Text => Err(error),
            OutputFormat::Json => {
                renderer.render_error(command, &error)?;
                std::process::exit(1);
            }
        },
    }
}

/// Returns `false` when the command ran but reported error diagnostics.
fn execute(args: &Cli, renderer: &Renderer) -> Result<bool> {
    match &args.command {
        Command::Schema { resource_type } => {
            match resource_type {
                Some(resource_type) => {
                    let schema = find_schema(resource_type)?;
                    renderer.render_value("schema", &schema.to_json_schema())?;
                }
                None => {
                    let resources: Map<String, Value> = resource_schemas()
                        .iter()
                        .map(|schema| (schema.type_name.to_owned(), schema.to_json_schema()))
                        .collect();
                    let document = serde_json::json!({
                        "provider": provider_schema().to_json_schema(),
                        "resources": resources,
                    });
                    renderer.render_value("schema", &document)?;
                }
            }
            Ok(true)
        }
        Command::Validate {
            resource_type,
            file,
        } => {
            let schema = find_schema(resource_type)?;
            protocol::prepare_config(&schema, read_json(file)?)?;
            renderer.render_message(
                "validate",
                &format!("{} is a valid {resource_type} configuration", file.display()),
            )?;
            Ok(true)
        }
        Command::Workflows {
            command: WorkflowsCommand::List,
        } => {
            let provider = configure(args)?;
            let runtime = new_runtime()?;
            let workflows = runtime.block_on(provider.clients().workflows.list_workflows())?;
            renderer.render_value("workflows.list", &workflows)?;
            Ok(true)
        }
        Command::Serve => {
            let provider = configure(args)?;
            let runtime = new_runtime()?;
            runtime.block_on(async {
                let stdin = tokio::io::BufReader::new(tokio::io::stdin());
                protocol::serve(&provider, stdin, tokio::io::stdout()).await
            })?;
            Ok(true)
        }
        resource_command => {
            let request = build_request(resource_command)?;
            let provider = configure(args)?;
            let runtime = new_runtime()?;
            let response = runtime.block_on(protocol::handle_request(&provider, request));
            renderer.render_response(command_name(resource_command), &response)?;
            Ok(!response.has_errors())
        }
    }
}

fn configure(args: &Cli) -> Result<Provider> {
    let flags = ProviderConfig {
        api_url: non_blank(&args.api_url),
        workflows_api_key: non_blank(&args.workflows_api_key),
        api_key: non_blank(&args.api_key),
        timeout_ms: args.timeout_ms,
    };
    let resolved = config::merge(flags, config::load(args.config.as_deref())?);
    tracing::debug!(config = ?resolved, "resolved provider configuration");
    Provider::configure(resolved)
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn new_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|err| Error::Config(format!("failed to create tokio runtime: {err}")))
}

fn find_schema(resource_type: &str) -> Result<ResourceSchema> {
    resource_schemas()
        .into_iter()
        .find(|schema| schema.type_name == resource_type)
        .ok_or_else(|| Error::NotFound(format!("unknown resource type '{resource_type}'")))
}

fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|err| {
        Error::Config(format!("failed to read '{}': {err}", path.display()))
    })?;
    serde_json::from_str(&content).map_err(|err| {
        Error::Validation(format!("'{}' is not valid JSON: {err}", path.display()))
    })
}

fn build_request(command: &Command) -> Result<ResourceRequest> {
    let by_id = |operation: Operation, resource_type: &str, id: &str| ResourceRequest {
        operation,
        resource_type: resource_type.to_owned(),
        id: Some(id.to_owned()),
        config: None,
        prior_state: None,
    };

    let request = match command {
        Command::Create {
            resource_type,
            file,
        } => ResourceRequest {
            operation: Operation::Create,
            resource_type: resource_type.clone(),
            id: None,
            config: Some(read_json(file)?),
            prior_state: None,
        },
        Command::Read { resource_type, id } => by_id(Operation::Read, resource_type, id),
        Command::Update {
            resource_type,
            id,
            file,
            prior_state,
        } => ResourceRequest {
            config: Some(read_json(file)?),
            prior_state: prior_state.as_deref().map(read_json).transpose()?,
            ..by_id(Operation::Update, resource_type, id)
        },
        Command::Delete { resource_type, id } => by_id(Operation::Delete, resource_type, id),
        Command::Import { resource_type, id } => by_id(Operation::Import, resource_type, id),
        other => {
            return Err(Error::Validation(format!(
                "'{}' is not a resource command",
                command_name(other)
            )));
        }
    };

    Ok(request)
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Schema { .. } => "schema",
        Command::Validate { .. } => "validate",
        Command::Create { .. } => "create",
        Command::Read { .. } => "read",
        Command::Update { .. } => "update",
        Command::Delete { .. } => "delete",
        Command::Import { .. } => "import",
        Command::Workflows { .. } => "workflows.list",
        Command::Serve => "serve",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn read_command_becomes_read_request() {
        let args = Cli::try_parse_from([
            "cased-provider",
            "read",
            "cased_workflow",
            "workflow_1",
        ])
        .unwrap();

        let request = build_request(&args.command).unwrap();
        assert_eq!(request.operation, Operation::Read);
        assert_eq!(request.resource_type, "cased_workflow");
        assert_eq!(request.id.as_deref(), Some("workflow_1"));
        assert!(request.config.is_none());
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let args = Cli::try_parse_from([
            "cased-provider",
            "delete",
            "cased_webhooks_endpoint",
            "we_1",
            "--output",
            "json",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(args.output, OutputFormat::Json);
        assert_eq!(args.log_level, "debug");
        assert_eq!(command_name(&args.command), "delete");
    }

    #[test]
    fn serve_is_not_a_resource_command() {
        assert!(build_request(&Command::Serve).is_err());
    }

    #[test]
    fn unknown_schema_type_is_not_found() {
        let error = find_schema("cased_policy").unwrap_err();
        assert_eq!(renderer::error_code(&error), "not_found");
        assert!(find_schema("cased_workflow").is_ok());
    }

    #[test]
    fn blank_flags_are_treated_as_unset() {
        assert_eq!(non_blank(&Some("  ".to_owned())), None);
        assert_eq!(
            non_blank(&Some(" https://api.cased.com ".to_owned())).as_deref(),
            Some("https://api.cased.com")
        );
    }
}

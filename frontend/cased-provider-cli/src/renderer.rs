use cased_provider_core::protocol::{Diagnostic, ResourceResponse, Severity};
use cased_provider_core::{Error, Result};
use serde::Serialize;

use crate::cli::OutputFormat;

const OUTPUT_SCHEMA: &str = "cased-provider/resource-output/v1";

pub struct Renderer {
    output_format: OutputFormat,
}

impl Renderer {
    pub fn new(output_format: OutputFormat) -> Self {
        Self { output_format }
    }

    pub fn render_response(&self, command: &str, response: &ResourceResponse) -> Result<()> {
        match self.output_format {
            OutputFormat::Text => {
                for diagnostic in &response.diagnostics {
                    eprintln!("{}", format_diagnostic(diagnostic));
                }
                match (&response.id, &response.state) {
                    (Some(id), Some(state)) => {
                        println!("id: {id}");
                        println!("{}", serde_json::to_string_pretty(state)?);
                    }
                    (Some(id), None) => println!("id: {id}"),
                    (None, _) if !response.has_errors() => println!("(absent)"),
                    (None, _) => {}
                }
            }
            OutputFormat::Json => {
                let status = if response.has_errors() { "error" } else { "ok" };
                print_envelope(status, command, response)?;
            }
        }
        Ok(())
    }

    pub fn render_value<T: Serialize>(&self, command: &str, value: &T) -> Result<()> {
        match self.output_format {
            OutputFormat::Text => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Json => print_envelope("ok", command, value)?,
        }
        Ok(())
    }

    pub fn render_message(&self, command: &str, message: &str) -> Result<()> {
        match self.output_format {
            OutputFormat::Text => println!("{message}"),
            OutputFormat::Json => {
                print_envelope("ok", command, &serde_json::json!({ "message": message }))?
            }
        }
        Ok(())
    }

    pub fn render_error(&self, command: &str, error: &Error) -> Result<()> {
        let envelope = CliJsonErrorEnvelope {
            schema: OUTPUT_SCHEMA,
            status: "error",
            command,
            error: CliJsonErrorPayload {
                code: error_code(error),
                message: error.to_string(),
            },
        };
        println!("{}", serde_json::to_string(&envelope)?);
        Ok(())
    }
}

fn print_envelope<T: Serialize>(status: &str, command: &str, data: &T) -> Result<()> {
    let envelope = CliJsonEnvelope {
        schema: OUTPUT_SCHEMA,
        status,
        command,
        data,
    };
    println!("{}", serde_json::to_string(&envelope)?);
    Ok(())
}

fn format_diagnostic(diagnostic: &Diagnostic) -> String {
    let level = match diagnostic.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    };
    match &diagnostic.detail {
        Some(detail) => format!("{level}: {}: {detail}", diagnostic.summary),
        None => format!("{level}: {}", diagnostic.summary),
    }
}

pub fn error_code(error: &Error) -> &'static str {
    match error {
        Error::Config(_) => "config_error",
        Error::Validation(_) => "validation_error",
        Error::NotFound(_) => "not_found",
        Error::Api { .. } => "api_error",
        Error::Http(_) => "http_error",
        Error::Provider(_) => "provider_error",
        Error::Io(_) => "io_error",
        Error::Json(_) => "json_error",
        Error::TomlParse(_) => "toml_parse_error",
    }
}

#[derive(Debug, Serialize)]
struct CliJsonEnvelope<'a, T: Serialize> {
    schema: &'a str,
    status: &'a str,
    command: &'a str,
    data: &'a T,
}

#[derive(Debug, Serialize)]
struct CliJsonErrorEnvelope<'a> {
    schema: &'a str,
    status: &'a str,
    command: &'a str,
    error: CliJsonErrorPayload,
}

#[derive(Debug, Serialize)]
struct CliJsonErrorPayload {
    code: &'static str,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_include_detail_when_present() {
        let diagnostic = Diagnostic::error("create cased_workflow failed", Some("boom".to_owned()));
        assert_eq!(
            format_diagnostic(&diagnostic),
            "error: create cased_workflow failed: boom"
        );
        assert_eq!(
            format_diagnostic(&Diagnostic::warning("gone", None)),
            "warning: gone"
        );
    }

    #[test]
    fn api_errors_have_their_own_code() {
        let error = Error::Api {
            status: 422,
            message: "bad".to_owned(),
        };
        assert_eq!(error_code(&error), "api_error");
        assert_eq!(error_code(&Error::NotFound("x".to_owned())), "not_found");
    }
}

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "cased-provider", about = "Manage Cased workflows and webhooks endpoints")]
pub struct Cli {
    /// TOML or JSON file with provider settings.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, env = "CASED_API_URL")]
    pub api_url: Option<String>,

    #[arg(long, global = true, env = "CASED_WORKFLOWS_API_KEY", hide_env_values = true)]
    pub workflows_api_key: Option<String>,

    #[arg(long, global = true, env = "CASED_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the provider and resource schemas.
    Schema {
        /// Limit output to one resource type.
        resource_type: Option<String>,
    },
    /// Check a resource configuration file without calling the API.
    Validate {
        resource_type: String,
        file: PathBuf,
    },
    Create {
        resource_type: String,
        file: PathBuf,
    },
    Read {
        resource_type: String,
        id: String,
    },
    Update {
        resource_type: String,
        id: String,
        file: PathBuf,
        /// State file from a previous create/read, used to detect changes.
        #[arg(long)]
        prior_state: Option<PathBuf>,
    },
    Delete {
        resource_type: String,
        id: String,
    },
    Import {
        resource_type: String,
        id: String,
    },
    Workflows {
        #[command(subcommand)]
        command: WorkflowsCommand,
    },
    /// Answer line-delimited JSON requests on stdin.
    Serve,
}

#[derive(Debug, Clone, Subcommand)]
pub enum WorkflowsCommand {
    List,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod provider;
pub mod resources;
pub mod schema;

pub use config::ProviderConfig;
pub use error::{Error, Result};
pub use protocol::{
    handle_request, serve, Diagnostic, Operation, ResourceRequest, ResourceResponse,
};
pub use provider::Provider;


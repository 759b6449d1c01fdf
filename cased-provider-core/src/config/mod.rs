pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, load_from_env, load_from_file, load_from_lookup, merge};
pub use schema::ProviderConfig;
pub use validation::validate_config;

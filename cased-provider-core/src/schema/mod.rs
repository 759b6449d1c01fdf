pub mod json_schema;
pub mod types;

pub use types::{Attribute, AttributeKind, Block, ResourceSchema, ScalarKind};

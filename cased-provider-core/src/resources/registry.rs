use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::resources::types::Resource;
use crate::schema::ResourceSchema;

#[derive(Default)]
pub struct ResourceRegistry {
    resources: HashMap<String, Arc<dyn Resource>>,
}

impl ResourceRegistry {
    pub fn register(&mut self, resource: Arc<dyn Resource>) {
        self.resources
            .insert(resource.type_name().to_owned(), resource);
    }

    pub fn get(&self, type_name: &str) -> Result<Arc<dyn Resource>> {
        self.resources
            .get(type_name)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("unknown resource type '{type_name}'")))
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.resources.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn schemas(&self) -> Vec<&ResourceSchema> {
        self.type_names()
            .into_iter()
            .filter_map(|name| self.resources.get(name))
            .map(|resource| resource.schema())
            .collect()
    }
}

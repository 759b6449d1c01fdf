use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::schema::ResourceSchema;

/// Request-scoped view of one resource instance: its id, the desired
/// configuration and the last known state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData {
    id: Option<String>,
    config: Value,
    state: Value,
}

impl ResourceData {
    pub fn new(id: Option<String>, config: Value, state: Value) -> Self {
        Self {
            id: id.filter(|id| !id.is_empty()),
            config,
            state,
        }
    }

    pub fn from_config(config: Value) -> Self {
        Self::new(None, config, Value::Null)
    }

    pub fn from_id(id: impl Into<String>) -> Self {
        Self::new(Some(id.into()), Value::Null, Value::Null)
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn require_id(&self) -> Result<&str> {
        self.id()
            .ok_or_else(|| Error::Validation("resource id is not set".to_owned()))
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.id = if id.is_empty() { None } else { Some(id) };
    }

    /// The remote object no longer exists; forget it.
    pub fn mark_absent(&mut self) {
        self.id = None;
        self.state = Value::Null;
    }

    pub fn is_absent(&self) -> bool {
        self.id.is_none()
    }

    pub fn config(&self) -> &Value {
        &self.config
    }

    pub fn state(&self) -> &Value {
        &self.state
    }

    /// Whether the desired value of `attribute` differs from the prior state.
    pub fn has_change(&self, attribute: &str) -> bool {
        normalized(self.config.get(attribute)) != normalized(self.state.get(attribute))
    }

    /// Like [`has_change`](Self::has_change) but compares arrays as sets.
    pub fn has_set_change(&self, attribute: &str) -> bool {
        as_set(self.config.get(attribute)) != as_set(self.state.get(attribute))
    }

    pub fn config_as<T: DeserializeOwned>(&self) -> Result<T> {
        let config = if self.config.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            self.config.clone()
        };
        serde_json::from_value(config)
            .map_err(|err| Error::Validation(format!("invalid resource configuration: {err}")))
    }

    pub fn set_state<T: Serialize>(&mut self, state: &T) -> Result<()> {
        self.state = serde_json::to_value(state)?;
        Ok(())
    }

    pub fn into_parts(self) -> (Option<String>, Value) {
        (self.id, self.state)
    }
}

fn normalized(value: Option<&Value>) -> Option<&Value> {
    value.filter(|value| !value.is_null())
}

fn as_set(value: Option<&Value>) -> BTreeSet<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(Value::to_string).collect(),
        _ => BTreeSet::new(),
    }
}

/// CRUD handler for one resource type.
#[async_trait]
pub trait Resource: Send + Sync {
    fn type_name(&self) -> &str;

    fn schema(&self) -> &ResourceSchema;

    async fn create(&self, data: &mut ResourceData) -> Result<()>;

    async fn read(&self, data: &mut ResourceData) -> Result<()>;

    async fn update(&self, data: &mut ResourceData) -> Result<()>;

    async fn delete(&self, data: &mut ResourceData) -> Result<()>;

    /// Adopt an existing remote object by id.
    async fn import(&self, data: &mut ResourceData) -> Result<()> {
        data.require_id()?;
        self.read(data).await
    }
}

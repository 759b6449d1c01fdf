use jsonschema::JSONSchema;
use serde_json::{json, Map, Value};

use crate::error::{Error, Result};
use crate::schema::types::{Attribute, AttributeKind, Block, ResourceSchema};

impl ResourceSchema {
    /// Render the attribute tree as a draft-07 JSON Schema.
    pub fn to_json_schema(&self) -> Value {
        let mut schema = render_block(&self.block);
        if let Value::Object(object) = &mut schema {
            object.insert(
                "$schema".to_owned(),
                json!("http://json-schema.org/draft-07/schema#"),
            );
            object.insert("title".to_owned(), json!(self.type_name));
            object.insert("description".to_owned(), json!(self.description));
        }
        schema
    }

    /// Check a configuration object and report every violation at once.
    pub fn validate(&self, value: &Value) -> Result<()> {
        let schema_value = self.to_json_schema();
        let compiled = JSONSchema::compile(&schema_value).map_err(|err| {
            Error::Provider(format!(
                "failed compiling schema for '{}': {err}",
                self.type_name
            ))
        })?;

        let mut problems = Vec::new();
        if let Err(errors) = compiled.validate(value) {
            problems.extend(errors.map(|err| {
                let location = err.instance_path.to_string();
                if location.is_empty() {
                    err.to_string()
                } else {
                    format!("{location}: {err}")
                }
            }));
        }
        collect_read_only(&self.block, value, "", &mut problems);

        if !problems.is_empty() {
            return Err(Error::Validation(format!(
                "{}: {}",
                self.type_name,
                problems.join("; ")
            )));
        }

        Ok(())
    }

    /// Drop explicit nulls and fill declared defaults, recursing into
    /// nested blocks.
    pub fn normalize(&self, value: &mut Value) {
        strip_nulls(value);
        apply_defaults(&self.block, value);
    }
}

fn render_block(block: &Block) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for (name, attribute) in block.iter() {
        properties.insert(name.to_owned(), render_attribute(attribute));
        if attribute.is_required() {
            required.push(json!(name));
        }
    }

    let mut schema = Map::new();
    schema.insert("type".to_owned(), json!("object"));
    schema.insert("properties".to_owned(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_owned(), Value::Array(required));
    }
    schema.insert("additionalProperties".to_owned(), json!(false));
    Value::Object(schema)
}

fn render_attribute(attribute: &Attribute) -> Value {
    let mut schema = Map::new();

    match attribute.kind() {
        AttributeKind::Scalar(kind) => {
            schema.insert("type".to_owned(), json!(kind.json_type()));
            if !attribute.allowed_values().is_empty() {
                schema.insert("enum".to_owned(), json!(attribute.allowed_values()));
            }
        }
        AttributeKind::List(block) => {
            schema.insert("type".to_owned(), json!("array"));
            schema.insert("items".to_owned(), render_block(block));
            if attribute.is_required() {
                schema.insert("minItems".to_owned(), json!(1));
            }
        }
        AttributeKind::Set(element) => {
            let mut items = Map::new();
            items.insert("type".to_owned(), json!(element.json_type()));
            if !attribute.allowed_values().is_empty() {
                items.insert("enum".to_owned(), json!(attribute.allowed_values()));
            }
            schema.insert("type".to_owned(), json!("array"));
            schema.insert("items".to_owned(), Value::Object(items));
            schema.insert("uniqueItems".to_owned(), json!(true));
        }
    }

    if let Some(max_items) = attribute.max_item_count() {
        schema.insert("maxItems".to_owned(), json!(max_items));
    }
    if let Some(default) = attribute.default() {
        schema.insert("default".to_owned(), default.clone());
    }
    if let Some(description) = attribute.description() {
        schema.insert("description".to_owned(), json!(description));
    }
    if attribute.is_read_only() {
        schema.insert("readOnly".to_owned(), json!(true));
    }
    if attribute.is_sensitive() {
        schema.insert("writeOnly".to_owned(), json!(true));
    }

    Value::Object(schema)
}

/// `readOnly` is only an annotation in JSON Schema, so computed-only
/// attributes are rejected here.
fn collect_read_only(block: &Block, value: &Value, location: &str, problems: &mut Vec<String>) {
    let Value::Object(object) = value else {
        return;
    };

    for (name, attribute) in block.iter() {
        let Some(field) = object.get(name).filter(|field| !field.is_null()) else {
            continue;
        };
        let path = format!("{location}/{name}");

        if attribute.is_read_only() {
            problems.push(format!("{path}: attribute is computed and cannot be set"));
            continue;
        }

        if let (AttributeKind::List(nested), Value::Array(items)) = (attribute.kind(), field) {
            for (index, item) in items.iter().enumerate() {
                collect_read_only(nested, item, &format!("{path}/{index}"), problems);
            }
        }
    }
}

fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(object) => {
            object.retain(|_, field| !field.is_null());
            object.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

fn apply_defaults(block: &Block, value: &mut Value) {
    let Value::Object(object) = value else {
        return;
    };

    for (name, attribute) in block.iter() {
        if let Some(default) = attribute.default() {
            object
                .entry(name.to_owned())
                .or_insert_with(|| default.clone());
        }

        if let AttributeKind::List(nested) = attribute.kind() {
            if let Some(Value::Array(items)) = object.get_mut(name) {
                for item in items.iter_mut() {
                    apply_defaults(nested, item);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::ScalarKind;

    fn sample_schema() -> ResourceSchema {
        let rule = Block::new()
            .attribute("name", Attribute::string().required())
            .attribute(
                "required",
                Attribute::bool().optional().default_value(json!(false)),
            );

        ResourceSchema::new(
            "sample",
            "sample resource",
            Block::new()
                .attribute("label", Attribute::string().optional())
                .attribute("secret", Attribute::string().computed().sensitive())
                .attribute(
                    "mode",
                    Attribute::string().required().one_of(&["fast", "slow"]),
                )
                .attribute(
                    "tags",
                    Attribute::set(ScalarKind::String)
                        .optional()
                        .one_of(&["a", "b"]),
                )
                .attribute("rules", Attribute::list(rule).optional().max_items(2)),
        )
    }

    #[test]
    fn renders_required_enum_and_limits() {
        let rendered = sample_schema().to_json_schema();

        assert_eq!(rendered["title"], json!("sample"));
        assert_eq!(rendered["required"], json!(["mode"]));
        assert_eq!(rendered["additionalProperties"], json!(false));
        assert_eq!(rendered["properties"]["mode"]["enum"], json!(["fast", "slow"]));
        assert_eq!(rendered["properties"]["tags"]["uniqueItems"], json!(true));
        assert_eq!(rendered["properties"]["tags"]["items"]["enum"], json!(["a", "b"]));
        assert_eq!(rendered["properties"]["rules"]["maxItems"], json!(2));
        assert_eq!(rendered["properties"]["secret"]["readOnly"], json!(true));
        assert_eq!(
            rendered["properties"]["rules"]["items"]["properties"]["required"]["default"],
            json!(false)
        );
    }

    #[test]
    fn accepts_valid_config() {
        let config = json!({
            "mode": "fast",
            "tags": ["a"],
            "rules": [{ "name": "first" }]
        });
        assert!(sample_schema().validate(&config).is_ok());
    }

    #[test]
    fn reports_every_violation() {
        let config = json!({
            "mode": "medium",
            "rules": [{ "required": true }, { "name": "b" }, { "name": "c" }],
            "unknown": 1
        });

        let error = sample_schema().validate(&config).expect_err("should fail");
        let message = error.to_string();
        assert!(message.starts_with("validation error: sample: "));
        assert!(message.contains("/mode"));
        assert!(message.contains("/rules"));
        assert!(message.contains("unknown"));
    }

    #[test]
    fn rejects_computed_only_attributes() {
        let config = json!({ "mode": "fast", "secret": "chosen-by-user" });
        let error = sample_schema().validate(&config).expect_err("should fail");
        assert!(error
            .to_string()
            .contains("/secret: attribute is computed and cannot be set"));

        let schema = sample_schema();
        let mut cleared = json!({ "mode": "fast", "secret": null });
        schema.normalize(&mut cleared);
        assert!(schema.validate(&cleared).is_ok());
    }

    #[test]
    fn rejects_duplicate_set_members() {
        let config = json!({ "mode": "slow", "tags": ["a", "a"] });
        assert!(sample_schema().validate(&config).is_err());
    }

    #[test]
    fn normalize_fills_nested_defaults_and_drops_nulls() {
        let mut config = json!({
            "mode": "slow",
            "label": null,
            "rules": [{ "name": "first" }, { "name": "second", "required": true }]
        });

        sample_schema().normalize(&mut config);

        assert!(config.get("label").is_none());
        assert_eq!(config["rules"][0]["required"], json!(false));
        assert_eq!(config["rules"][1]["required"], json!(true));
    }
}

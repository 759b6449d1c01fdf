use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::Operator;
use crate::schema::{Attribute, Block, ResourceSchema};

pub const WORKFLOW_TYPE: &str = "cased_workflow";
pub const MAX_CONDITIONS: usize = 1000;

pub fn workflow_schema() -> ResourceSchema {
    let operators = Operator::ALL.map(|operator| operator.as_str());

    let condition = Block::new()
        .attribute("field", Attribute::string().required())
        .attribute("value", Attribute::string().required())
        .attribute("operator", Attribute::string().required().one_of(&operators));

    let responder = Block::new()
        .attribute("name", Attribute::string().required())
        .attribute(
            "required",
            Attribute::bool().optional().default_value(json!(false)),
        );

    let responders = Block::new().attribute("responder", Attribute::list(responder).optional());

    let slack = Block::new().attribute("channel", Attribute::string().required());

    let sources = Block::new()
        .attribute("slack", Attribute::list(slack).optional().max_items(1))
        .attribute(
            "email",
            Attribute::bool().optional().default_value(json!(false)),
        );

    let approval = Block::new()
        .attribute("count", Attribute::int().optional())
        .attribute(
            "self_approval",
            Attribute::bool().optional().default_value(json!(false)),
        )
        .attribute("duration", Attribute::int().optional())
        .attribute("timeout", Attribute::int().optional())
        .attribute("responders", Attribute::list(responders).optional())
        .attribute("sources", Attribute::list(sources).optional().max_items(1));

    let controls = Block::new()
        .attribute("reason", Attribute::bool().optional())
        .attribute("authentication", Attribute::bool().optional())
        .attribute("approval", Attribute::list(approval).optional().max_items(1));

    ResourceSchema::new(
        WORKFLOW_TYPE,
        "A Cased workflow: the conditions it matches and the controls it enforces.",
        Block::new()
            .attribute("name", Attribute::string().optional())
            .attribute("updated_at", Attribute::string().optional().computed())
            .attribute("created_at", Attribute::string().optional().computed())
            .attribute(
                "conditions",
                Attribute::list(condition)
                    .optional()
                    .max_items(MAX_CONDITIONS),
            )
            .attribute(
                "controls",
                Attribute::list(controls).required().max_items(1),
            ),
    )
}

/// Declarative shape of `cased_workflow`. Nested blocks are lists of at
/// most one element where the schema says so.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkflowState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub conditions: Vec<ConditionBlock>,
    #[serde(default)]
    pub controls: Vec<ControlsBlock>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConditionBlock {
    pub field: String,
    pub value: String,
    pub operator: Operator,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ControlsBlock {
    #[serde(default)]
    pub reason: bool,
    #[serde(default)]
    pub authentication: bool,
    #[serde(default)]
    pub approval: Vec<ApprovalBlock>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApprovalBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(default)]
    pub self_approval: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    #[serde(default)]
    pub responders: Vec<RespondersBlock>,
    #[serde(default)]
    pub sources: Vec<SourcesBlock>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RespondersBlock {
    #[serde(default)]
    pub responder: Vec<ResponderBlock>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponderBlock {
    pub name: String,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourcesBlock {
    #[serde(default)]
    pub slack: Vec<SlackBlock>,
    #[serde(default)]
    pub email: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlackBlock {
    pub channel: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_requires_exactly_one_controls_block() {
        let schema = workflow_schema();

        assert!(schema
            .validate(&json!({ "name": "no controls" }))
            .is_err());
        assert!(schema.validate(&json!({ "controls": [] })).is_err());
        assert!(schema
            .validate(&json!({ "controls": [{}, {}] }))
            .is_err());
        assert!(schema.validate(&json!({ "controls": [{}] })).is_ok());
    }

    #[test]
    fn schema_rejects_unknown_operator() {
        let config = json!({
            "conditions": [{ "field": "app", "value": "web", "operator": "contains" }],
            "controls": [{}]
        });
        let error = workflow_schema().validate(&config).expect_err("should fail");
        assert!(error.to_string().contains("/conditions/0/operator"));
    }

    #[test]
    fn schema_limits_approval_to_one_block() {
        let config = json!({
            "controls": [{ "approval": [{ "count": 1 }, { "count": 2 }] }]
        });
        assert!(workflow_schema().validate(&config).is_err());
    }

    #[test]
    fn schema_caps_condition_count() {
        let conditions = |count: usize| {
            let condition = json!({ "field": "app", "value": "web", "operator": "eq" });
            json!({
                "conditions": vec![condition; count],
                "controls": [{}]
            })
        };

        let schema = workflow_schema();
        assert!(schema.validate(&conditions(MAX_CONDITIONS)).is_ok());
        let error = schema
            .validate(&conditions(MAX_CONDITIONS + 1))
            .expect_err("too many conditions");
        assert!(error.to_string().contains("/conditions"));
    }

    #[test]
    fn schema_limits_sources_and_slack_to_one_block() {
        let schema = workflow_schema();
        let with_sources = |sources: serde_json::Value| {
            json!({ "controls": [{ "approval": [{ "sources": sources }] }] })
        };

        assert!(schema
            .validate(&with_sources(json!([{ "slack": [{ "channel": "#ops" }] }])))
            .is_ok());
        assert!(schema
            .validate(&with_sources(json!([{ "email": true }, { "email": false }])))
            .is_err());
        assert!(schema
            .validate(&with_sources(json!([{
                "slack": [{ "channel": "#ops" }, { "channel": "#dev" }]
            }])))
            .is_err());
    }

    #[test]
    fn normalized_config_decodes_into_state() {
        let schema = workflow_schema();
        let mut config = json!({
            "name": "production",
            "controls": [{
                "reason": true,
                "approval": [{
                    "count": 1,
                    "responders": [{ "responder": [{ "name": "alice" }] }],
                    "sources": [{ "slack": [{ "channel": "#deploys" }] }]
                }]
            }]
        });
        schema.normalize(&mut config);
        schema.validate(&config).expect("config should be valid");

        let state: WorkflowState = serde_json::from_value(config).unwrap();
        let approval = &state.controls[0].approval[0];
        assert!(!approval.self_approval);
        assert!(!approval.responders[0].responder[0].required);
        assert!(!approval.sources[0].email);
        assert_eq!(approval.sources[0].slack[0].channel, "#deploys");
    }
}

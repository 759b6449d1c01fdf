//! Translation between the declarative workflow state and the API body.

use crate::api::{
    ApprovalControl, ApprovalSources, Condition, Controls, ResponderRequirement, Responders,
    SlackSource, Workflow,
};
use crate::resources::workflow::state::{
    ApprovalBlock, ConditionBlock, ControlsBlock, ResponderBlock, RespondersBlock, SlackBlock,
    SourcesBlock, WorkflowState,
};

/// Build the request body from desired state. `id` is carried through for
/// updates.
pub fn build_workflow(state: &WorkflowState, id: Option<&str>) -> Workflow {
    Workflow {
        id: id.unwrap_or_default().to_owned(),
        name: state.name.clone().unwrap_or_default(),
        api_url: String::new(),
        conditions: state.conditions.iter().map(build_condition).collect(),
        controls: state
            .controls
            .first()
            .map(build_controls)
            .unwrap_or_default(),
        updated_at: String::new(),
        created_at: String::new(),
    }
}

fn build_condition(condition: &ConditionBlock) -> Condition {
    Condition {
        field: condition.field.clone(),
        value: condition.value.clone(),
        operator: condition.operator,
    }
}

fn build_controls(controls: &ControlsBlock) -> Controls {
    Controls {
        reason: controls.reason,
        authentication: controls.authentication,
        approval: controls.approval.first().map(build_approval),
    }
}

fn build_approval(approval: &ApprovalBlock) -> ApprovalControl {
    let responders = build_responders(&approval.responders);

    ApprovalControl {
        count: approval.count.unwrap_or_default(),
        self_approval: approval.self_approval,
        duration: approval.duration.unwrap_or_default(),
        timeout: approval.timeout.unwrap_or_default(),
        responders: (!responders.is_empty()).then_some(responders),
        sources: approval.sources.first().map(build_sources),
    }
}

/// Collapse every `responders[].responder[]` entry into one table. A name
/// listed twice keeps its last setting.
fn build_responders(blocks: &[RespondersBlock]) -> Responders {
    blocks
        .iter()
        .flat_map(|block| block.responder.iter())
        .map(|responder| {
            (
                responder.name.clone(),
                ResponderRequirement::from_required(responder.required),
            )
        })
        .collect()
}

fn build_sources(sources: &SourcesBlock) -> ApprovalSources {
    ApprovalSources {
        email: sources.email,
        slack: sources.slack.first().map(|slack| SlackSource {
            channel: slack.channel.clone(),
        }),
    }
}

/// Convert an API workflow into declarative state.
pub fn flatten_workflow(workflow: &Workflow) -> WorkflowState {
    WorkflowState {
        name: non_empty(&workflow.name),
        updated_at: non_empty(&workflow.updated_at),
        created_at: non_empty(&workflow.created_at),
        conditions: flatten_conditions(&workflow.conditions),
        controls: vec![flatten_controls(&workflow.controls)],
    }
}

pub fn flatten_conditions(conditions: &[Condition]) -> Vec<ConditionBlock> {
    conditions
        .iter()
        .map(|condition| ConditionBlock {
            field: condition.field.clone(),
            value: condition.value.clone(),
            operator: condition.operator,
        })
        .collect()
}

pub fn flatten_controls(controls: &Controls) -> ControlsBlock {
    ControlsBlock {
        reason: controls.reason,
        authentication: controls.authentication,
        approval: controls
            .approval
            .iter()
            .map(flatten_approval)
            .collect(),
    }
}

fn flatten_approval(approval: &ApprovalControl) -> ApprovalBlock {
    // Responders come back as a table; each row becomes its own block, in
    // name order.
    let responders = approval
        .responders
        .iter()
        .flatten()
        .map(|(name, requirement)| RespondersBlock {
            responder: vec![ResponderBlock {
                name: name.clone(),
                required: requirement.is_required(),
            }],
        })
        .collect();

    ApprovalBlock {
        count: non_zero(approval.count),
        self_approval: approval.self_approval,
        duration: non_zero(approval.duration),
        timeout: non_zero(approval.timeout),
        responders,
        sources: approval
            .sources
            .iter()
            .map(|sources| SourcesBlock {
                email: sources.email,
                slack: sources
                    .slack
                    .iter()
                    .map(|slack| SlackBlock {
                        channel: slack.channel.clone(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

fn non_zero(value: i64) -> Option<i64> {
    (value != 0).then_some(value)
}

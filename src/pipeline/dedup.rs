// src/pipeline/dedup.rs

//! Deduplication and validation of evaluated steps.

use tracing::warn;

use super::step::Step;

/// Drop steps that are structurally equal to an earlier one.
///
/// First occurrence wins; relative order of the survivors is preserved.
pub fn dedup_steps(steps: Vec<Step>) -> Vec<Step> {
    let mut unique: Vec<Step> = Vec::with_capacity(steps.len());
    for step in steps {
        if !unique.contains(&step) {
            unique.push(step);
        }
    }
    unique
}

/// Split steps into `(valid, invalid)`, preserving order within each list.
pub fn filter_valid_steps(steps: Vec<Step>) -> (Vec<Step>, Vec<Step>) {
    steps.into_iter().partition(Step::is_valid)
}

/// Human-readable reason a step was rejected.
pub fn invalid_step_context(step: &Step) -> String {
    match step {
        Step::Group(group) if group.steps.is_empty() => {
            format!("group '{}' has no valid nested steps", group.label)
        }
        Step::Group(group) => {
            format!("group '{}' has invalid nested steps", group.label)
        }
        Step::Leaf(leaf) => match &leaf.label {
            Some(label) => {
                format!("step with label '{label}' has no command, trigger, or group")
            }
            None => "empty step configuration".to_string(),
        },
    }
}

pub fn log_invalid_step(step: &Step) {
    let context = invalid_step_context(step);
    warn!(
        "Skipping invalid step: {context}. Steps must have at least one of: command, commands, trigger, or group with nested steps."
    );
}

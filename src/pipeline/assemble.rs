// src/pipeline/assemble.rs

//! Pipeline assembly: validated steps + wait/hook/notify directives.

use crate::config::PluginConfig;

use super::step::{Notification, Step};

/// One entry of the top-level `steps` sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEntry {
    Step(Step),
    /// A bare `wait` barrier.
    Wait,
}

/// The document handed to the agent for upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineDocument {
    pub steps: Vec<PipelineEntry>,
    pub notify: Vec<Notification>,
}

impl PipelineDocument {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Combine the validated step list with the plugin-level directives.
///
/// Ordering is fixed: triggered steps in evaluation order, then a single
/// `wait` (when enabled), then one command step per hook. Returns the
/// document together with a flag telling whether it has anything to run.
pub fn generate_pipeline(steps: Vec<Step>, plugin: &PluginConfig) -> (PipelineDocument, bool) {
    let mut entries: Vec<PipelineEntry> = steps.into_iter().map(PipelineEntry::Step).collect();

    if plugin.wait {
        entries.push(PipelineEntry::Wait);
    }

    entries.extend(
        plugin
            .hooks
            .iter()
            .map(|hook| PipelineEntry::Step(Step::command(hook.command.clone()))),
    );

    let document = PipelineDocument {
        steps: entries,
        notify: plugin.notify.clone(),
    };
    let has_steps = !document.is_empty();

    (document, has_steps)
}

// src/pipeline/mod.rs

//! Step model, deduplication/validation and pipeline assembly.
//!
//! - [`step`] holds the canonical step tree.
//! - [`dedup`] removes duplicate steps and separates invalid ones.
//! - [`assemble`] appends wait/hook/notify directives.
//! - [`document`] encodes the result as the YAML the agent uploads.

pub mod assemble;
pub mod dedup;
pub mod document;
pub mod step;

pub use assemble::{generate_pipeline, PipelineDocument, PipelineEntry};
pub use dedup::{dedup_steps, filter_valid_steps, invalid_step_context};
pub use document::to_yaml;
pub use step::{Build, GroupStep, LeafStep, Notification, NotifyTarget, Step};

use crate::config::WatchRule;
use crate::errors::Result;
use crate::watch::evaluate;

/// Resolve changed paths into the final, deduplicated list of valid steps.
///
/// Invalid steps are logged and dropped; only pattern errors are fatal.
pub fn steps_to_trigger(files: &[String], rules: &[WatchRule]) -> Result<Vec<Step>> {
    let steps = evaluate(files, rules)?;
    let deduped = dedup_steps(steps);
    let (valid, invalid) = filter_valid_steps(deduped);

    for step in &invalid {
        dedup::log_invalid_step(step);
    }

    Ok(valid)
}

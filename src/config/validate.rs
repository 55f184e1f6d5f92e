// src/config/validate.rs

use tracing::warn;

use crate::config::model::{RawPluginConfig, RawStep};
use crate::errors::{MonorepoDiffError, Result};

/// Structural checks on the raw configuration, run before normalization.
pub fn validate_raw_config(cfg: &RawPluginConfig) -> Result<()> {
    for (index, watch) in cfg.watch.iter().enumerate() {
        validate_step(&watch.config)?;

        if watch.default.is_none() && watch.path.is_none() {
            warn!(watch = index, "watch entry has no `path` and is not a default; it can never trigger");
        }
    }
    Ok(())
}

/// Checks a single step and all of its nested steps.
pub fn validate_step(step: &RawStep) -> Result<()> {
    ensure_single_artifact_field(step)?;
    for nested in &step.steps {
        validate_step(nested)?;
    }
    Ok(())
}

fn ensure_single_artifact_field(step: &RawStep) -> Result<()> {
    if step.artifacts.is_some() && step.artifact_paths.is_some() {
        return Err(MonorepoDiffError::config(
            "cannot specify both 'artifacts' and 'artifact_paths'; please use 'artifact_paths'",
        ));
    }
    Ok(())
}

// src/exec/upload.rs

//! The whole diff → evaluate → assemble → upload run.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, error, info};

use crate::config::PluginConfig;
use crate::env::EnvSource;
use crate::errors::Result;
use crate::pipeline::{generate_pipeline, steps_to_trigger, to_yaml};

use super::backend::CommandRunner;
use super::diff::diff;

/// Agent binary used for `pipeline upload`.
pub const AGENT_PROGRAM: &str = "buildkite-agent";

/// Prefix of the temporary pipeline file.
const PIPELINE_FILE_PREFIX: &str = "bmrd-";

/// Program and arguments of the agent upload call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadInvocation {
    pub program: String,
    pub args: Vec<String>,
}

/// Build `<program> pipeline upload <path> [--no-interpolation]`.
pub fn upload_invocation(program: &str, pipeline: &Path, interpolation: bool) -> UploadInvocation {
    let mut args = vec![
        "pipeline".to_string(),
        "upload".to_string(),
        pipeline.to_string_lossy().into_owned(),
    ];
    if !interpolation {
        args.push("--no-interpolation".to_string());
    }
    UploadInvocation {
        program: program.to_string(),
        args,
    }
}

/// Options for a run that are not part of the plugin configuration.
#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// Agent program to invoke.
    pub agent: String,
    /// Print the pipeline instead of uploading it.
    pub dry_run: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            agent: AGENT_PROGRAM.to_string(),
            dry_run: false,
        }
    }
}

/// Write the serialized pipeline to a fresh temporary file.
///
/// The file is removed when the returned handle is dropped.
pub fn write_pipeline(contents: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix(PIPELINE_FILE_PREFIX)
        .tempfile()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Run the whole pipeline generation for one CI job.
///
/// Returns the upload invocation that was executed, or `None` when nothing
/// was uploaded (no changes, no steps, or a dry run).
pub async fn upload_pipeline(
    plugin: &PluginConfig,
    runner: &dyn CommandRunner,
    env: &dyn EnvSource,
    options: &UploadOptions,
) -> Result<Option<UploadInvocation>> {
    let changed = diff(runner, &plugin.diff, env).await?;

    if changed.is_empty() {
        info!("No changes detected. Skipping pipeline upload.");
        return Ok(None);
    }

    debug!("Output from diff: \n{}", changed.join("\n"));

    let steps = steps_to_trigger(&changed, &plugin.watch)?;
    let (document, has_steps) = generate_pipeline(steps, plugin);
    let yaml = to_yaml(&document)?;

    if !has_steps {
        info!("No steps generated. Skipping pipeline upload.");
        return Ok(None);
    }

    info!("Generated Pipeline:\n{yaml}");

    if options.dry_run {
        println!("{yaml}");
        return Ok(None);
    }

    let file = write_pipeline(&yaml)?;
    let invocation = upload_invocation(&options.agent, file.path(), plugin.interpolation);
    let result = runner.run(&invocation.program, &invocation.args).await;

    if let Err(err) = file.close() {
        error!("Failed to remove temporary pipeline file: {err}");
    }

    result?;
    Ok(Some(invocation))
}

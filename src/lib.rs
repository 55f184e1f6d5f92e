// src/lib.rs

pub mod cli;
pub mod config;
pub mod env;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod pipeline;
pub mod types;
pub mod watch;

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::loader::PLUGINS_ENV_VAR;
use crate::config::{initialize_plugin, load_from_path, PluginConfig};
use crate::env::EnvSource;
use crate::errors::{MonorepoDiffError, Result};
use crate::exec::{upload_pipeline, CommandRunner, UploadInvocation, UploadOptions};

/// Load the plugin configuration named by the CLI arguments.
///
/// `--config PATH` takes precedence over `--plugins` / `BUILDKITE_PLUGINS`.
pub fn load_plugin(args: &CliArgs, env: &dyn EnvSource) -> Result<PluginConfig> {
    match (&args.config, &args.plugins) {
        (Some(path), _) => load_from_path(path, env),
        (None, Some(json)) => initialize_plugin(json, env),
        (None, None) => Err(MonorepoDiffError::config(format!(
            "no plugin configuration: set {PLUGINS_ENV_VAR} or pass --plugins / --config"
        ))),
    }
}

/// High-level entry point used by `main.rs`.
///
/// Runs once: diff, evaluate the watch rules, assemble the pipeline and
/// upload it through `runner`.
pub async fn run(
    args: &CliArgs,
    plugin: &PluginConfig,
    runner: &dyn CommandRunner,
    env: &dyn EnvSource,
) -> Result<Option<UploadInvocation>> {
    log_plugin_source(args);
    debug!(?plugin, "plugin configuration");

    let options = UploadOptions {
        agent: args.agent.clone(),
        dry_run: args.dry_run,
    };
    upload_pipeline(plugin, runner, env, &options).await
}

/// Report where the plugin configuration came from. Runs after logging is
/// initialised.
fn log_plugin_source(args: &CliArgs) {
    match (&args.config, &args.plugins) {
        (Some(path), _) => debug!(path = %path.display(), "plugin config read from file"),
        (None, Some(json)) => debug!("parsing plugin config: {json}"),
        (None, None) => {}
    }
}

// src/config/loader.rs

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::config::model::{PluginConfig, RawPluginConfig};
use crate::config::normalize::normalize_plugin;
use crate::env::EnvSource;
use crate::errors::{MonorepoDiffError, Result};

/// Repository name prefix identifying this plugin in the plugin list.
pub const PLUGIN_NAME: &str = "monorepo-diff";

/// Environment variable the agent exposes the plugin list in.
pub const PLUGINS_ENV_VAR: &str = "BUILDKITE_PLUGINS";

/// Find this plugin's block in the agent's plugin list JSON and return it
/// without normalization.
///
/// The list looks like:
///
/// ```json
/// [
///   { "github.com/example/other-plugin#v1": { } },
///   { "github.com/buildkite-plugins/monorepo-diff-buildkite-plugin#v1.0.0": { "watch": [] } }
/// ]
/// ```
pub fn load_from_str(data: &str) -> Result<RawPluginConfig> {
    debug!("parsing plugin config: {data}");

    let entries: Vec<Map<String, Value>> = serde_json::from_str(data).map_err(|err| {
        debug!(error = %err, "plugin list is not valid JSON");
        MonorepoDiffError::config("failed to parse plugin configuration")
    })?;

    for entry in entries {
        for (reference, config) in entry {
            if plugin_repo_name(&reference).starts_with(PLUGIN_NAME) {
                return Ok(serde_json::from_value(config)?);
            }
        }
    }

    Err(MonorepoDiffError::config("could not initialize plugin"))
}

/// Parse and normalize the plugin block from the plugin list JSON.
///
/// This is the recommended entry point for the rest of the application.
pub fn initialize_plugin(data: &str, env: &dyn EnvSource) -> Result<PluginConfig> {
    let raw = load_from_str(data)?;
    normalize_plugin(raw, env)
}

/// Same as [`initialize_plugin`], reading the plugin list from a file.
pub fn load_from_path(path: impl AsRef<Path>, env: &dyn EnvSource) -> Result<PluginConfig> {
    let contents = fs::read_to_string(path)?;
    initialize_plugin(&contents, env)
}

/// Repository name of a plugin reference, without org and version.
///
/// - `github.com/org/monorepo-diff-buildkite-plugin#v1` → `monorepo-diff-buildkite-plugin`
/// - `https://github.com/org/repo.git#v1` → `repo.git`
/// - `monorepo-diff#v1.2` → `monorepo-diff`
///
/// A reference that cannot be parsed is returned unchanged.
pub fn plugin_repo_name(reference: &str) -> String {
    let mut candidate = reference.to_string();
    if candidate.starts_with("github.com/") && !candidate.contains("://") {
        candidate = format!("https://{candidate}");
    }

    if candidate.contains("://") {
        return match Url::parse(&candidate) {
            Ok(url) => url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .unwrap_or_default()
                .to_string(),
            Err(_) => reference.to_string(),
        };
    }

    // Relative reference: a leading ':' would be an empty URL scheme.
    if candidate.starts_with(':') {
        return reference.to_string();
    }

    let path = candidate.split('#').next().unwrap_or_default();
    path.rsplit('/').next().unwrap_or_default().to_string()
}

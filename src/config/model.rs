// src/config/model.rs

//! Plugin configuration: the raw JSON shape and the normalized model.
//!
//! The raw structs mirror the plugin's JSON block:
//!
//! ```json
//! {
//!   "diff": "git diff --name-only HEAD~1",
//!   "wait": true,
//!   "env": ["KEY=value"],
//!   "watch": [
//!     { "path": "services/**", "config": { "trigger": "services" } },
//!     { "default": { "command": "echo nothing changed" } }
//!   ]
//! }
//! ```
//!
//! Loosely-typed fields stay as [`Value`] or a [`crate::types`] sum type here;
//! [`super::normalize`] turns them into [`PluginConfig`].

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::pipeline::{Notification, Step};
use crate::types::{CommandSpec, DependsOn, Secrets, SoftFail, StringOrList};

pub const DEFAULT_DIFF_COMMAND: &str = "git diff --name-only HEAD~1";
pub const DEFAULT_LOG_LEVEL: &str = "info";

fn default_diff() -> String {
    DEFAULT_DIFF_COMMAND.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_interpolation() -> bool {
    true
}

/// The plugin's configuration block, as written by the user.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPluginConfig {
    #[serde(default = "default_diff")]
    pub diff: String,

    #[serde(default)]
    pub wait: bool,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_interpolation")]
    pub interpolation: bool,

    #[serde(default)]
    pub hooks: Vec<HookConfig>,

    #[serde(default)]
    pub watch: Vec<RawWatchConfig>,

    /// Array or map form; see [`crate::types::EnvSpec`].
    #[serde(default)]
    pub env: Option<Value>,

    /// Map or `"key:value"` array form; see [`crate::types::MetadataSpec`].
    #[serde(default)]
    pub meta_data: Option<Value>,

    #[serde(default)]
    pub notify: Vec<Map<String, Value>>,
}

impl Default for RawPluginConfig {
    fn default() -> Self {
        Self {
            diff: default_diff(),
            wait: false,
            log_level: default_log_level(),
            interpolation: default_interpolation(),
            hooks: Vec::new(),
            watch: Vec::new(),
            env: None,
            meta_data: None,
            notify: Vec::new(),
        }
    }
}

/// A hook command appended after the triggered steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HookConfig {
    pub command: String,
}

/// One `watch` entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWatchConfig {
    #[serde(default)]
    pub path: Option<StringOrList>,

    #[serde(default)]
    pub skip_path: Option<StringOrList>,

    #[serde(default)]
    pub except_path: Option<StringOrList>,

    #[serde(default)]
    pub config: RawStep,

    /// Any non-null value marks the rule as the fallback. A non-empty object
    /// is the fallback step itself, or carries it under `config`.
    #[serde(default)]
    pub default: Option<Value>,
}

/// A step as written in the config, before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStep {
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub trigger: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub branches: Option<String>,
    #[serde(default, rename = "if")]
    pub condition: Option<String>,
    #[serde(default)]
    pub build: RawBuild,
    #[serde(default)]
    pub command: Option<CommandSpec>,
    #[serde(default)]
    pub commands: Option<CommandSpec>,
    #[serde(default)]
    pub agents: BTreeMap<String, String>,
    #[serde(default)]
    pub artifact_paths: Option<Vec<String>>,
    /// Alias of `artifact_paths`; the two are mutually exclusive.
    #[serde(default)]
    pub artifacts: Option<Vec<String>>,
    #[serde(default)]
    pub plugins: Vec<Map<String, Value>>,
    #[serde(default)]
    pub env: Option<Value>,
    #[serde(default, rename = "async")]
    pub is_async: bool,
    #[serde(default)]
    pub soft_fail: Option<SoftFail>,
    #[serde(default)]
    pub notify: Vec<Map<String, Value>>,
    #[serde(default)]
    pub depends_on: Option<DependsOn>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub secrets: Option<Secrets>,
    #[serde(default)]
    pub steps: Vec<RawStep>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBuild {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub commit: Option<String>,
    #[serde(default)]
    pub env: Option<Value>,
    #[serde(default)]
    pub meta_data: BTreeMap<String, String>,
}

/// Fully normalized plugin configuration.
///
/// Environment and metadata have already been pushed down into each rule's
/// step; `env` and `metadata` are kept for diagnostics only.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginConfig {
    pub diff: String,
    pub wait: bool,
    pub log_level: String,
    pub interpolation: bool,
    pub hooks: Vec<HookConfig>,
    pub watch: Vec<WatchRule>,
    pub env: BTreeMap<String, String>,
    pub metadata: BTreeMap<String, String>,
    pub notify: Vec<Notification>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            diff: default_diff(),
            wait: false,
            log_level: default_log_level(),
            interpolation: default_interpolation(),
            hooks: Vec::new(),
            watch: Vec::new(),
            env: BTreeMap::new(),
            metadata: BTreeMap::new(),
            notify: Vec::new(),
        }
    }
}

/// A watch rule binding path patterns to a step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchRule {
    pub paths: Vec<String>,
    pub skip_paths: Vec<String>,
    pub except_paths: Vec<String>,
    pub is_default: bool,
    pub step: Step,
}

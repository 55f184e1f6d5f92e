// src/config/mod.rs

//! Configuration loading and normalization for the plugin.
//!
//! Responsibilities:
//! - Define the JSON-backed raw model and the normalized model (`model.rs`).
//! - Locate the plugin's block in the agent's plugin list (`loader.rs`).
//! - Reject structurally invalid configuration (`validate.rs`).
//! - Resolve loosely-typed fields and push plugin-level env, metadata and
//!   build defaults down into steps (`normalize.rs`).

pub mod loader;
pub mod model;
pub mod normalize;
pub mod validate;

pub use loader::{initialize_plugin, load_from_path, load_from_str};
pub use model::{
    HookConfig, PluginConfig, RawBuild, RawPluginConfig, RawStep, RawWatchConfig, WatchRule,
};
pub use normalize::normalize_plugin;
pub use validate::validate_raw_config;

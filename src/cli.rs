// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::loader::PLUGINS_ENV_VAR;
use crate::exec::AGENT_PROGRAM;

/// Command-line arguments for `monorepo-diff`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "monorepo-diff",
    version,
    about = "Trigger pipeline steps for the parts of a monorepo that changed.",
    long_about = None
)]
pub struct CliArgs {
    /// Plugin list JSON, as exposed by the agent.
    #[arg(long, env = PLUGINS_ENV_VAR, value_name = "JSON", hide_env_values = true)]
    pub plugins: Option<String>,

    /// Read the plugin list from a JSON file instead of `--plugins`.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Agent program used for `pipeline upload`.
    #[arg(long, value_name = "PROGRAM", default_value = AGENT_PROGRAM)]
    pub agent: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MONOREPO_DIFF_LOG` or the plugin's `log_level` is used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the generated pipeline instead of uploading it.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

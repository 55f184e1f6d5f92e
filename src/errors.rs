// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonorepoDiffError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("path matching failed for pattern '{pattern}': {source}")]
    PatternError {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("command `{command}` failed: {output}")]
    CommandFailed { command: String, output: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("could not serialize the pipeline: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MonorepoDiffError {
    pub fn config(msg: impl Into<String>) -> Self {
        MonorepoDiffError::ConfigError(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, MonorepoDiffError>;

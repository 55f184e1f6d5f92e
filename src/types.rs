// src/types.rs

//! Loosely-typed configuration fields.
//!
//! The plugin configuration accepts several fields in more than one shape
//! (a string *or* a list, a list *or* a map). Each of those is modelled as a
//! small sum type here so the rest of the crate never has to inspect a
//! dynamic JSON value. Every type serializes back to the same shape it was
//! read from, which keeps the emitted pipeline faithful to the user's config.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{MonorepoDiffError, Result};

/// A field that is either a single string or an ordered list of strings.
///
/// Used for `path`, `skip_path` and `except_path` on watch rules.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum StringOrList {
    Single(String),
    List(Vec<String>),
}

impl StringOrList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            StringOrList::Single(s) => vec![s],
            StringOrList::List(list) => list,
        }
    }
}

/// `command` / `commands` on a step.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CommandSpec {
    Single(String),
    List(Vec<String>),
}

impl From<&str> for CommandSpec {
    fn from(value: &str) -> Self {
        CommandSpec::Single(value.to_string())
    }
}

/// One entry of a `depends_on` list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DependencyRef {
    Key(String),
    Detailed {
        step: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        allow_failure: Option<bool>,
    },
}

/// `depends_on`: a single step key or an ordered list of references.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DependsOn {
    Single(String),
    List(Vec<DependencyRef>),
}

/// `secrets`: either `{ENV_NAME: secret_key}` or a list of secret keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Secrets {
    Map(BTreeMap<String, String>),
    List(Vec<String>),
}

/// Exit status selector inside a soft-fail rule (`"*"` or a number).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ExitStatus {
    Code(i64),
    Pattern(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SoftFailRule {
    pub exit_status: ExitStatus,
}

/// `soft_fail`: a plain flag or a list of exit status rules.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SoftFail {
    Flag(bool),
    Rules(Vec<SoftFailRule>),
}

/// Environment block in one of its two accepted shapes.
///
/// The two shapes resolve differently:
///
/// - `List(["KEY=value", "KEY"])`: split on the first `=`, key and value are
///   trimmed, a bare key reads the environment.
/// - `Map({"KEY": "value", "KEY2": null})`: values are kept verbatim and only
///   `null` reads the environment.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvSpec {
    List(Vec<Value>),
    Map(serde_json::Map<String, Value>),
}

impl TryFrom<Value> for EnvSpec {
    type Error = MonorepoDiffError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => Ok(EnvSpec::List(items)),
            Value::Object(map) => Ok(EnvSpec::Map(map)),
            _ => Err(MonorepoDiffError::config(
                "env configuration must be an array of strings (e.g., ['KEY=value']) or a map (e.g., {KEY: 'value'})",
            )),
        }
    }
}

/// `meta_data` block: `{"key": "value"}` or `["key:value"]`.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataSpec {
    List(Vec<Value>),
    Map(serde_json::Map<String, Value>),
}

impl TryFrom<Value> for MetadataSpec {
    type Error = MonorepoDiffError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => Ok(MetadataSpec::List(items)),
            Value::Object(map) => Ok(MetadataSpec::Map(map)),
            _ => Err(MonorepoDiffError::config(
                "failed to parse metadata configuration: unknown type",
            )),
        }
    }
}

/// Render a JSON scalar the way it reads in a config file.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// src/pipeline/document.rs

//! YAML encoding of a [`PipelineDocument`].
//!
//! Only fields that are set are emitted, always in the same order:
//! `group, trigger, label, branches, if, build, command, commands, agents,
//! artifact_paths, plugins, env, async, soft_fail, notify, depends_on, key,
//! secrets, steps`. Group steps are written as `{group, steps}` only.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::errors::Result;
use crate::types::{CommandSpec, DependsOn, Secrets, SoftFail};

use super::assemble::{PipelineDocument, PipelineEntry};
use super::step::{Build, GroupStep, LeafStep, Notification, NotifyTarget, Step};

/// Serialize the document to the YAML text uploaded to the agent.
pub fn to_yaml(document: &PipelineDocument) -> Result<String> {
    Ok(serde_yaml::to_string(document)?)
}

impl Serialize for PipelineDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let len = if self.notify.is_empty() { 1 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        if !self.notify.is_empty() {
            map.serialize_entry("notify", &self.notify)?;
        }
        map.serialize_entry("steps", &self.steps)?;
        map.end()
    }
}

impl Serialize for PipelineEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            PipelineEntry::Step(step) => step.serialize(serializer),
            PipelineEntry::Wait => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("wait", &())?;
                map.end()
            }
        }
    }
}

impl Serialize for Step {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Step::Leaf(leaf) => WireLeaf::from(leaf).serialize(serializer),
            Step::Group(group) => WireGroup::from(group).serialize(serializer),
        }
    }
}

#[derive(Serialize)]
struct WireGroup<'a> {
    group: &'a str,
    steps: &'a [Step],
}

impl<'a> From<&'a GroupStep> for WireGroup<'a> {
    fn from(group: &'a GroupStep) -> Self {
        Self {
            group: &group.label,
            steps: &group.steps,
        }
    }
}

#[derive(Serialize)]
struct WireLeaf<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    trigger: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branches: Option<&'a str>,
    #[serde(rename = "if", skip_serializing_if = "Option::is_none")]
    condition: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    build: Option<WireBuild<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    command: Option<&'a CommandSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    commands: Option<&'a CommandSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    agents: Option<&'a BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    artifact_paths: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plugins: Option<&'a [Map<String, Value>]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    env: Option<&'a BTreeMap<String, String>>,
    #[serde(rename = "async", skip_serializing_if = "Option::is_none")]
    is_async: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    soft_fail: Option<&'a SoftFail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notify: Option<&'a [Notification]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    depends_on: Option<&'a DependsOn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    secrets: Option<&'a Secrets>,
}

fn non_empty<T>(items: &[T]) -> Option<&[T]> {
    (!items.is_empty()).then_some(items)
}

fn non_empty_map<K, V>(map: &BTreeMap<K, V>) -> Option<&BTreeMap<K, V>> {
    (!map.is_empty()).then_some(map)
}

impl<'a> From<&'a LeafStep> for WireLeaf<'a> {
    fn from(leaf: &'a LeafStep) -> Self {
        Self {
            trigger: leaf.trigger.as_deref(),
            label: leaf.label.as_deref(),
            branches: leaf.branches.as_deref(),
            condition: leaf.condition.as_deref(),
            build: (!leaf.build.is_empty()).then(|| WireBuild::from(&leaf.build)),
            command: leaf.command.as_ref(),
            commands: leaf.commands.as_ref(),
            agents: non_empty_map(&leaf.agents),
            artifact_paths: non_empty(&leaf.artifact_paths),
            plugins: non_empty(&leaf.plugins),
            env: non_empty_map(&leaf.env),
            is_async: leaf.is_async.then_some(true),
            soft_fail: leaf.soft_fail.as_ref(),
            notify: non_empty(&leaf.notify),
            depends_on: leaf.depends_on.as_ref(),
            key: leaf.key.as_deref(),
            secrets: leaf.secrets.as_ref(),
        }
    }
}

#[derive(Serialize)]
struct WireBuild<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    commit: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    env: Option<&'a BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta_data: Option<&'a BTreeMap<String, String>>,
}

impl<'a> From<&'a Build> for WireBuild<'a> {
    fn from(build: &'a Build) -> Self {
        Self {
            message: build.message.as_deref(),
            branch: build.branch.as_deref(),
            commit: build.commit.as_deref(),
            env: non_empty_map(&build.env),
            meta_data: non_empty_map(&build.meta_data),
        }
    }
}

#[derive(Serialize)]
struct GithubStatus<'a> {
    context: &'a str,
}

impl Serialize for Notification {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let len = if self.condition.is_some() { 2 } else { 1 };
        let mut map = serializer.serialize_map(Some(len))?;
        match &self.target {
            NotifyTarget::Email(v) => map.serialize_entry("email", v)?,
            NotifyTarget::BasecampCampfire(v) => map.serialize_entry("basecamp_campfire", v)?,
            NotifyTarget::Webhook(v) => map.serialize_entry("webhook", v)?,
            NotifyTarget::PagerDutyChangeEvent(v) => {
                map.serialize_entry("pagerduty_change_event", v)?
            }
            NotifyTarget::Slack(v) => map.serialize_entry("slack", v)?,
            NotifyTarget::GithubCommitStatus { context } => {
                map.serialize_entry("github_commit_status", &GithubStatus { context })?
            }
        }
        if let Some(condition) = &self.condition {
            map.serialize_entry("if", condition)?;
        }
        map.end()
    }
}

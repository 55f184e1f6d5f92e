// src/pipeline/step.rs

//! Canonical, fully-normalized step model.
//!
//! A [`Step`] is a tree: either a leaf that runs a command or triggers a
//! downstream pipeline, or a group node with ordered children. Steps are
//! plain values; equality is structural over every attribute, which is what
//! deduplication relies on.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::types::{CommandSpec, DependsOn, Secrets, SoftFail};

/// Build descriptor passed to a triggered pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Build {
    pub message: Option<String>,
    pub branch: Option<String>,
    pub commit: Option<String>,
    pub env: BTreeMap<String, String>,
    pub meta_data: BTreeMap<String, String>,
}

impl Build {
    pub fn is_empty(&self) -> bool {
        self.message.is_none()
            && self.branch.is_none()
            && self.commit.is_none()
            && self.env.is_empty()
            && self.meta_data.is_empty()
    }
}

/// Where a notification is delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyTarget {
    Email(String),
    BasecampCampfire(String),
    Webhook(String),
    PagerDutyChangeEvent(String),
    Slack(String),
    GithubCommitStatus { context: String },
}

/// A notification, optionally guarded by an `if` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub target: NotifyTarget,
    pub condition: Option<String>,
}

impl Notification {
    pub fn new(target: NotifyTarget) -> Self {
        Self { target, condition: None }
    }

    pub fn when(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }
}

/// A command and/or trigger step with all of its optional attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeafStep {
    pub label: Option<String>,
    pub branches: Option<String>,
    pub condition: Option<String>,
    pub trigger: Option<String>,
    pub build: Build,
    pub command: Option<CommandSpec>,
    pub commands: Option<CommandSpec>,
    pub agents: BTreeMap<String, String>,
    pub artifact_paths: Vec<String>,
    pub plugins: Vec<Map<String, Value>>,
    pub env: BTreeMap<String, String>,
    pub is_async: bool,
    pub soft_fail: Option<SoftFail>,
    pub notify: Vec<Notification>,
    pub depends_on: Option<DependsOn>,
    pub key: Option<String>,
    pub secrets: Option<Secrets>,
}

impl LeafStep {
    /// True if the step runs something (`command` or `commands`).
    pub fn has_command(&self) -> bool {
        self.command.is_some() || self.commands.is_some()
    }

    pub fn has_trigger(&self) -> bool {
        self.trigger.is_some()
    }

    pub fn has_action(&self) -> bool {
        self.has_command() || self.has_trigger()
    }
}

/// A labelled group of nested steps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupStep {
    pub label: String,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Leaf(LeafStep),
    Group(GroupStep),
}

impl Default for Step {
    fn default() -> Self {
        Step::Leaf(LeafStep::default())
    }
}

impl Step {
    pub fn command(command: impl Into<String>) -> Self {
        Step::Leaf(LeafStep {
            command: Some(CommandSpec::Single(command.into())),
            ..LeafStep::default()
        })
    }

    pub fn trigger(pipeline: impl Into<String>) -> Self {
        Step::Leaf(LeafStep {
            trigger: Some(pipeline.into()),
            ..LeafStep::default()
        })
    }

    pub fn group(label: impl Into<String>, steps: Vec<Step>) -> Self {
        Step::Group(GroupStep {
            label: label.into(),
            steps,
        })
    }

    /// A leaf is valid if it has a command or a trigger target; a group is
    /// valid if it is non-empty and every nested step is valid.
    pub fn is_valid(&self) -> bool {
        match self {
            Step::Leaf(leaf) => leaf.has_action(),
            Step::Group(group) => {
                !group.steps.is_empty() && group.steps.iter().all(Step::is_valid)
            }
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafStep> {
        match self {
            Step::Leaf(leaf) => Some(leaf),
            Step::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupStep> {
        match self {
            Step::Group(group) => Some(group),
            Step::Leaf(_) => None,
        }
    }
}

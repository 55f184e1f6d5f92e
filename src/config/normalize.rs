// src/config/normalize.rs

//! Normalization of the raw plugin configuration.
//!
//! This is where every loosely-typed field is resolved exactly once:
//! path lists become ordered `Vec<String>`s, env/metadata blocks become
//! maps, and plugin-level env, metadata and build defaults are pushed down
//! into each rule's step. Nothing downstream ever sees a raw value.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::model::{
    PluginConfig, RawBuild, RawPluginConfig, RawStep, RawWatchConfig, WatchRule,
};
use crate::config::validate::{validate_raw_config, validate_step};
use crate::env::EnvSource;
use crate::errors::{MonorepoDiffError, Result};
use crate::pipeline::{Build, LeafStep, Notification, NotifyTarget, Step};
use crate::types::{scalar_to_string, EnvSpec, MetadataSpec, StringOrList};

/// Normalize a raw plugin block into a [`PluginConfig`].
///
/// `env` supplies the CI environment used for build defaults and for env
/// entries that read their value from the environment.
pub fn normalize_plugin(raw: RawPluginConfig, env: &dyn EnvSource) -> Result<PluginConfig> {
    validate_raw_config(&raw)?;

    let RawPluginConfig {
        diff,
        wait,
        log_level,
        interpolation,
        hooks,
        watch,
        env: raw_env,
        meta_data,
        notify,
    } = raw;

    let plugin_env = match raw_env {
        Some(value) => resolve_env(EnvSpec::try_from(value)?, env)?,
        None => BTreeMap::new(),
    };
    let metadata = match meta_data {
        Some(value) => resolve_metadata(MetadataSpec::try_from(value)?)?,
        None => BTreeMap::new(),
    };

    let normalizer = StepNormalizer {
        env,
        plugin_env: &plugin_env,
        metadata: &metadata,
    };

    let watch = watch
        .into_iter()
        .map(|w| normalizer.normalize_watch(w))
        .collect::<Result<Vec<_>>>()?;

    Ok(PluginConfig {
        diff,
        wait,
        log_level,
        interpolation,
        hooks,
        watch,
        env: plugin_env,
        metadata,
        notify: parse_plugin_notify(&notify),
    })
}

/// Pushes plugin-scope values down into steps.
struct StepNormalizer<'a> {
    env: &'a dyn EnvSource,
    plugin_env: &'a BTreeMap<String, String>,
    metadata: &'a BTreeMap<String, String>,
}

impl StepNormalizer<'_> {
    fn normalize_watch(&self, raw: RawWatchConfig) -> Result<WatchRule> {
        let RawWatchConfig {
            path,
            skip_path,
            except_path,
            config,
            default,
        } = raw;

        let (is_default, raw_step, paths) = match default {
            Some(value) => (true, default_step(value, config)?, Vec::new()),
            None => (false, config, into_patterns(path)),
        };

        Ok(WatchRule {
            paths,
            skip_paths: into_patterns(skip_path),
            except_paths: into_patterns(except_path),
            is_default,
            step: self.convert_step(raw_step, true)?,
        })
    }

    /// Convert a raw step (and its nested steps) into the step tree.
    ///
    /// Build defaults and plugin metadata only apply to the rule's own
    /// trigger step (`top_level`); plugin env applies at every depth.
    fn convert_step(&self, raw: RawStep, top_level: bool) -> Result<Step> {
        let RawStep {
            group,
            trigger,
            label,
            branches,
            condition,
            build,
            command,
            commands,
            agents,
            artifact_paths,
            artifacts,
            plugins,
            env,
            is_async,
            soft_fail,
            notify,
            depends_on,
            key,
            secrets,
            steps,
        } = raw;

        let mut leaf = LeafStep {
            trigger: non_empty(trigger),
            label: non_empty(label),
            branches: non_empty(branches),
            condition: non_empty(condition),
            build: self.convert_build(build)?,
            command,
            commands,
            agents,
            artifact_paths: artifact_paths.or(artifacts).unwrap_or_default(),
            plugins,
            env: self.resolve_optional_env(env)?,
            is_async,
            soft_fail,
            notify: parse_step_notify(&notify),
            depends_on,
            key: non_empty(key),
            secrets,
        };

        if top_level && leaf.has_trigger() {
            set_build_defaults(&mut leaf.build, self.env);
            append_metadata(&mut leaf.build, self.metadata);
        }
        self.merge_plugin_env(&mut leaf);

        let nested = steps
            .into_iter()
            .map(|s| self.convert_step(s, false))
            .collect::<Result<Vec<_>>>()?;

        let step = match non_empty(group) {
            Some(label) if !nested.is_empty() => Step::group(label, nested),
            Some(label) if leaf.has_action() => Step::group(label, vec![Step::Leaf(leaf)]),
            Some(label) => Step::group(label, Vec::new()),
            None => {
                if !nested.is_empty() {
                    warn!(
                        label = leaf.label.as_deref().unwrap_or(""),
                        "nested `steps` ignored on a step without `group`"
                    );
                }
                Step::Leaf(leaf)
            }
        };
        Ok(step)
    }

    fn convert_build(&self, raw: RawBuild) -> Result<Build> {
        Ok(Build {
            message: non_empty(raw.message),
            branch: non_empty(raw.branch),
            commit: non_empty(raw.commit),
            env: self.resolve_optional_env(raw.env)?,
            meta_data: raw.meta_data,
        })
    }

    fn resolve_optional_env(&self, raw: Option<Value>) -> Result<BTreeMap<String, String>> {
        match raw {
            Some(value) => resolve_env(EnvSpec::try_from(value)?, self.env),
            None => Ok(BTreeMap::new()),
        }
    }

    /// Add plugin-level env entries the step does not define itself.
    ///
    /// Command steps receive them in `env`, trigger steps in `build.env`.
    fn merge_plugin_env(&self, leaf: &mut LeafStep) {
        let target = if leaf.has_command() {
            &mut leaf.env
        } else if leaf.has_trigger() {
            &mut leaf.build.env
        } else {
            return;
        };

        for (key, value) in self.plugin_env {
            target.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }
}

fn into_patterns(raw: Option<StringOrList>) -> Vec<String> {
    raw.map(StringOrList::into_vec).unwrap_or_default()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Pick the step of a default rule.
fn default_step(value: Value, config: RawStep) -> Result<RawStep> {
    match value {
        Value::Object(mut map) if !map.is_empty() => {
            let conf = match map.remove("config") {
                Some(inner @ Value::Object(_)) => inner,
                Some(_) => {
                    return Err(MonorepoDiffError::config(
                        "`default.config` must be an object",
                    ));
                }
                None => Value::Object(map),
            };
            let step: RawStep = serde_json::from_value(conf)?;
            validate_step(&step)?;
            Ok(step)
        }
        _ => Ok(config),
    }
}

/// Double every `$` so the agent does not interpolate the value.
pub fn escape_interpolation(s: &str) -> String {
    s.replace('$', "$$")
}

/// Fill unset build message/branch/commit from the CI environment.
///
/// Only the defaulted values are escaped; explicit values are left as-is.
pub fn set_build_defaults(build: &mut Build, env: &dyn EnvSource) {
    let defaults = [
        (&mut build.message, "BUILDKITE_MESSAGE"),
        (&mut build.branch, "BUILDKITE_BRANCH"),
        (&mut build.commit, "BUILDKITE_COMMIT"),
    ];

    for (field, var) in defaults {
        if field.is_none() {
            *field = non_empty(Some(escape_interpolation(&env.var_or(var, ""))));
        }
    }
}

/// Merge plugin-level metadata into a trigger's build; plugin values win.
fn append_metadata(build: &mut Build, metadata: &BTreeMap<String, String>) {
    for (key, value) in metadata {
        build.meta_data.insert(key.clone(), value.clone());
    }
}

/// Resolve an env block into a map.
pub fn resolve_env(spec: EnvSpec, env: &dyn EnvSource) -> Result<BTreeMap<String, String>> {
    let mut result = BTreeMap::new();

    match spec {
        EnvSpec::List(items) => {
            for item in items {
                let Value::String(entry) = item else {
                    continue;
                };
                let (key, value) = match entry.split_once('=') {
                    Some((key, value)) => (key.trim(), Some(value.trim())),
                    None => (entry.trim(), None),
                };
                if key.is_empty() {
                    continue;
                }
                let value = match value {
                    Some(v) => v.to_string(),
                    None => env.var_or(key, ""),
                };
                result.insert(key.to_string(), value);
            }
        }
        EnvSpec::Map(map) => {
            for (raw_key, value) in map {
                let key = raw_key.trim();
                if key.is_empty() {
                    continue;
                }
                let value = match &value {
                    Value::Null => env.var_or(key, ""),
                    other => scalar_to_string(other).ok_or_else(|| {
                        MonorepoDiffError::config(format!(
                            "env value for '{key}' must be a string, number, boolean or null"
                        ))
                    })?,
                };
                result.insert(key.to_string(), value);
            }
        }
    }

    Ok(result)
}

/// Resolve a `meta_data` block into a map.
pub fn resolve_metadata(spec: MetadataSpec) -> Result<BTreeMap<String, String>> {
    let mut result = BTreeMap::new();

    match spec {
        MetadataSpec::Map(map) => {
            for (key, value) in map {
                let value = scalar_to_string(&value).ok_or_else(|| {
                    MonorepoDiffError::config(format!(
                        "failed to parse metadata configuration: value for '{key}' is not a scalar"
                    ))
                })?;
                result.insert(key, value);
            }
        }
        MetadataSpec::List(items) => {
            for item in items {
                let Value::String(entry) = item else {
                    continue;
                };
                let (key, value) = match entry.split_once(':') {
                    Some((key, value)) => (key.trim(), value.trim()),
                    None => (entry.trim(), ""),
                };
                if !key.is_empty() {
                    result.insert(key.to_string(), value.to_string());
                }
            }
        }
    }

    Ok(result)
}

type StringTarget = (&'static str, fn(String) -> NotifyTarget);

/// Checked in order; the first key present with a string value wins.
const PLUGIN_NOTIFY_TARGETS: &[StringTarget] = &[
    ("email", NotifyTarget::Email),
    ("basecamp_campfire", NotifyTarget::BasecampCampfire),
    ("webhook", NotifyTarget::Webhook),
    ("pagerduty_change_event", NotifyTarget::PagerDutyChangeEvent),
    ("slack", NotifyTarget::Slack),
];

const STEP_NOTIFY_TARGETS: &[StringTarget] = &[
    ("basecamp_campfire", NotifyTarget::BasecampCampfire),
    ("slack", NotifyTarget::Slack),
];

pub fn parse_plugin_notify(raw: &[Map<String, Value>]) -> Vec<Notification> {
    parse_notifications(raw, PLUGIN_NOTIFY_TARGETS)
}

pub fn parse_step_notify(raw: &[Map<String, Value>]) -> Vec<Notification> {
    parse_notifications(raw, STEP_NOTIFY_TARGETS)
}

fn parse_notifications(raw: &[Map<String, Value>], targets: &[StringTarget]) -> Vec<Notification> {
    raw.iter()
        .filter_map(|entry| {
            let notification = parse_notification(entry, targets);
            if notification.is_none() {
                debug!(?entry, "ignoring unsupported notify entry");
            }
            notification
        })
        .collect()
}

fn parse_notification(entry: &Map<String, Value>, targets: &[StringTarget]) -> Option<Notification> {
    let target = targets
        .iter()
        .find_map(|(key, make)| entry.get(*key).and_then(Value::as_str).map(|s| make(s.to_string())))
        .or_else(|| {
            entry
                .get("github_commit_status")
                .and_then(|gh| gh.get("context"))
                .and_then(Value::as_str)
                .map(|context| NotifyTarget::GithubCommitStatus {
                    context: context.to_string(),
                })
        })?;

    Some(Notification {
        target,
        condition: entry.get("if").and_then(Value::as_str).map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnv;
    use crate::types::CommandSpec;
    use serde_json::json;

    fn ci_env() -> MapEnv {
        MapEnv::new()
            .with("BUILDKITE_COMMIT", "123")
            .with("BUILDKITE_MESSAGE", "fix: temp file not correctly deleted")
            .with("BUILDKITE_BRANCH", "go-rewrite")
            .with("env3", "env-3")
            .with("env4", "env-4")
    }

    fn plugin(value: Value) -> PluginConfig {
        let raw: RawPluginConfig = serde_json::from_value(value).unwrap();
        normalize_plugin(raw, &ci_env()).unwrap()
    }

    fn leaf(step: &Step) -> &LeafStep {
        step.as_leaf().expect("expected a leaf step")
    }

    #[test]
    fn defaults_are_applied() {
        let cfg = plugin(json!({}));

        assert_eq!(cfg.diff, "git diff --name-only HEAD~1");
        assert!(!cfg.wait);
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.interpolation);
        assert!(cfg.watch.is_empty());
    }

    #[test]
    fn paths_accept_string_or_list() {
        let cfg = plugin(json!({
            "watch": [
                { "path": "app/", "skip_path": "app/docs/", "config": { "command": "echo" } },
                { "path": ["a/", "b/"], "except_path": ["a/x/"], "config": { "command": "echo" } }
            ]
        }));

        assert_eq!(cfg.watch[0].paths, vec!["app/"]);
        assert_eq!(cfg.watch[0].skip_paths, vec!["app/docs/"]);
        assert_eq!(cfg.watch[1].paths, vec!["a/", "b/"]);
        assert_eq!(cfg.watch[1].except_paths, vec!["a/x/"]);
    }

    #[test]
    fn trigger_build_defaults_come_from_environment() {
        let env = MapEnv::new()
            .with("BUILDKITE_MESSAGE", "costs $5")
            .with("BUILDKITE_BRANCH", "main")
            .with("BUILDKITE_COMMIT", "abc");
        let raw: RawPluginConfig = serde_json::from_value(json!({
            "watch": [{
                "path": "x/",
                "config": { "trigger": "t", "build": { "branch": "explicit-$branch" } }
            }]
        }))
        .unwrap();

        let cfg = normalize_plugin(raw, &env).unwrap();
        let build = &leaf(&cfg.watch[0].step).build;

        assert_eq!(build.message.as_deref(), Some("costs $$5"));
        assert_eq!(build.branch.as_deref(), Some("explicit-$branch"));
        assert_eq!(build.commit.as_deref(), Some("abc"));
    }

    #[test]
    fn command_steps_get_no_build_defaults() {
        let cfg = plugin(json!({
            "watch": [{ "path": "x/", "config": { "command": "echo" } }]
        }));

        assert!(leaf(&cfg.watch[0].step).build.is_empty());
    }

    #[test]
    fn plugin_env_goes_to_env_or_build_env() {
        let cfg = plugin(json!({
            "env": ["env1=env-1", "env2=env-2", "env3"],
            "watch": [
                { "path": "a/", "config": { "trigger": "service-2" } },
                { "path": "b/", "config": { "command": "echo", "env": ["env4", "hi= bye"] } }
            ]
        }));

        let trigger = leaf(&cfg.watch[0].step);
        assert_eq!(trigger.build.env["env1"], "env-1");
        assert_eq!(trigger.build.env["env3"], "env-3");
        assert!(trigger.env.is_empty());

        let command = leaf(&cfg.watch[1].step);
        assert_eq!(command.env["env1"], "env-1");
        assert_eq!(command.env["env2"], "env-2");
        assert_eq!(command.env["env4"], "env-4");
        assert_eq!(command.env["hi"], "bye");
    }

    #[test]
    fn rule_env_wins_over_plugin_env() {
        let cfg = plugin(json!({
            "env": { "SHARED": "plugin", "ONLY_PLUGIN": "p" },
            "watch": [{
                "path": "a/",
                "config": { "command": "echo", "env": { "SHARED": "rule" } }
            }]
        }));

        let env = &leaf(&cfg.watch[0].step).env;
        assert_eq!(env["SHARED"], "rule");
        assert_eq!(env["ONLY_PLUGIN"], "p");
    }

    #[test]
    fn plugin_env_reaches_nested_group_steps() {
        let cfg = plugin(json!({
            "env": ["GLOBAL=1"],
            "watch": [{
                "path": "a/",
                "config": {
                    "group": "deploy",
                    "steps": [
                        { "command": "echo uat", "env": { "STAGE": "uat" } },
                        { "trigger": "prod-deploy" }
                    ]
                }
            }]
        }));

        let group = cfg.watch[0].step.as_group().unwrap();
        let uat = leaf(&group.steps[0]);
        assert_eq!(uat.env["GLOBAL"], "1");
        assert_eq!(uat.env["STAGE"], "uat");

        let prod = leaf(&group.steps[1]);
        assert_eq!(prod.build.env["GLOBAL"], "1");
        assert!(prod.build.message.is_none(), "nested triggers get no build defaults");
    }

    #[test]
    fn metadata_only_on_trigger_steps() {
        let cfg = plugin(json!({
            "meta_data": ["release-version:1.1", "team: platform"],
            "watch": [
                { "path": "a/", "config": { "trigger": "t", "build": { "meta_data": { "team": "rule" } } } },
                { "path": "b/", "config": { "command": "echo" } },
                { "path": "c/", "config": { "group": "g", "steps": [{ "trigger": "nested" }] } }
            ]
        }));

        let trigger = leaf(&cfg.watch[0].step);
        assert_eq!(trigger.build.meta_data["release-version"], "1.1");
        assert_eq!(trigger.build.meta_data["team"], "platform");

        assert!(leaf(&cfg.watch[1].step).build.meta_data.is_empty());

        let group = cfg.watch[2].step.as_group().unwrap();
        assert!(leaf(&group.steps[0]).build.meta_data.is_empty());
    }

    #[test]
    fn default_rule_from_object_or_nested_config() {
        let direct = plugin(json!({
            "watch": [{ "default": { "label": "Default label", "command": "echo default" } }]
        }));
        let nested = plugin(json!({
            "watch": [{ "default": { "config": { "label": "Default label", "command": "echo default" } } }]
        }));

        for cfg in [direct, nested] {
            let rule = &cfg.watch[0];
            assert!(rule.is_default);
            assert!(rule.paths.is_empty());
            let step = leaf(&rule.step);
            assert_eq!(step.label.as_deref(), Some("Default label"));
            assert_eq!(step.command, Some(CommandSpec::from("echo default")));
        }
    }

    #[test]
    fn default_flag_keeps_config_step() {
        let cfg = plugin(json!({
            "watch": [{ "default": true, "path": "ignored/", "config": { "command": "echo fallback" } }]
        }));

        assert!(cfg.watch[0].is_default);
        assert!(cfg.watch[0].paths.is_empty());
        assert_eq!(leaf(&cfg.watch[0].step).command, Some(CommandSpec::from("echo fallback")));
    }

    #[test]
    fn group_with_own_action_wraps_itself() {
        let cfg = plugin(json!({
            "watch": [{ "path": "a/", "config": { "group": "my group", "trigger": "foo" } }]
        }));

        let group = cfg.watch[0].step.as_group().unwrap();
        assert_eq!(group.label, "my group");
        assert_eq!(leaf(&group.steps[0]).trigger.as_deref(), Some("foo"));
    }

    #[test]
    fn nested_steps_without_group_are_dropped() {
        let cfg = plugin(json!({
            "watch": [{
                "path": "a/",
                "config": { "command": "make", "steps": [{ "command": "make test" }] }
            }]
        }));

        assert_eq!(cfg.watch[0].step, Step::command("make"));
    }

    #[test]
    fn artifacts_alias_is_accepted() {
        let cfg = plugin(json!({
            "watch": [{ "path": "a/", "config": { "command": "make", "artifacts": ["dist/**"] } }]
        }));

        assert_eq!(leaf(&cfg.watch[0].step).artifact_paths, vec!["dist/**"]);
    }

    #[test]
    fn step_notify_keeps_supported_targets() {
        let cfg = plugin(json!({
            "watch": [{
                "path": "a/",
                "config": {
                    "command": "echo",
                    "notify": [
                        { "email": "ignored-on-steps@example.com" },
                        { "basecamp_campfire": "https://basecamp-url" },
                        { "github_commit_status": { "context": "my-custom-status" } },
                        { "slack": "@someuser", "if": "build.state === 'passed'" }
                    ]
                }
            }]
        }));

        assert_eq!(
            leaf(&cfg.watch[0].step).notify,
            vec![
                Notification::new(NotifyTarget::BasecampCampfire("https://basecamp-url".into())),
                Notification::new(NotifyTarget::GithubCommitStatus {
                    context: "my-custom-status".into()
                }),
                Notification::new(NotifyTarget::Slack("@someuser".into()))
                    .when("build.state === 'passed'"),
            ]
        );
    }

    #[test]
    fn plugin_notify_targets_in_order() {
        let cfg = plugin(json!({
            "notify": [
                { "email": "foo@gmail.com" },
                { "webhook": "https://webhook-url", "if": "build.state === 'failed'" },
                { "pagerduty_change_event": "636d22Yourc0418Key3b49eee3e8" },
                { "unknown": "x" }
            ]
        }));

        assert_eq!(
            cfg.notify,
            vec![
                Notification::new(NotifyTarget::Email("foo@gmail.com".into())),
                Notification::new(NotifyTarget::Webhook("https://webhook-url".into()))
                    .when("build.state === 'failed'"),
                Notification::new(NotifyTarget::PagerDutyChangeEvent(
                    "636d22Yourc0418Key3b49eee3e8".into()
                )),
            ]
        );
    }

    #[test]
    fn env_array_form_trims_and_reads_environment() {
        let env = MapEnv::new().with("FROM_OS", "os-value");
        let resolved = resolve_env(
            EnvSpec::try_from(json!([" KEY = value ", "URL=a=b=c", "FROM_OS", "MISSING", "", 3]))
                .unwrap(),
            &env,
        )
        .unwrap();

        assert_eq!(resolved["KEY"], "value");
        assert_eq!(resolved["URL"], "a=b=c");
        assert_eq!(resolved["FROM_OS"], "os-value");
        assert_eq!(resolved["MISSING"], "");
        assert_eq!(resolved.len(), 4);
    }

    #[test]
    fn env_map_form_preserves_values() {
        let env = MapEnv::new().with("FROM_OS", "os-value");
        let resolved = resolve_env(
            EnvSpec::try_from(json!({
                " KEY ": "  spaced  ",
                "EMPTY": "",
                "FROM_OS": null,
                "NUM": 42,
                "FLAG": true,
                "  ": "dropped"
            }))
            .unwrap(),
            &env,
        )
        .unwrap();

        assert_eq!(resolved["KEY"], "  spaced  ");
        assert_eq!(resolved["EMPTY"], "");
        assert_eq!(resolved["FROM_OS"], "os-value");
        assert_eq!(resolved["NUM"], "42");
        assert_eq!(resolved["FLAG"], "true");
        assert_eq!(resolved.len(), 5);
    }

    #[test]
    fn env_map_rejects_nested_values() {
        let err = resolve_env(
            EnvSpec::try_from(json!({ "TOKEN": { "secret-id": "x" } })).unwrap(),
            &MapEnv::new(),
        )
        .unwrap_err();

        assert!(matches!(err, MonorepoDiffError::ConfigError(_)));
    }

    #[test]
    fn invalid_plugin_env_shape_is_an_error() {
        let raw: RawPluginConfig =
            serde_json::from_value(json!({ "env": "invalid-string-format" })).unwrap();

        assert!(normalize_plugin(raw, &MapEnv::new()).is_err());
    }

    #[test]
    fn escape_doubles_dollars() {
        assert_eq!(escape_interpolation("$HOME and $$"), "$$HOME and $$$$");
        assert_eq!(escape_interpolation("plain"), "plain");
    }
}

#![allow(dead_code)]

use monorepo_diff::config::{HookConfig, PluginConfig, WatchRule};
use monorepo_diff::pipeline::{LeafStep, Step};
use monorepo_diff::types::CommandSpec;

/// Builder for leaf `Step`s.
#[derive(Default)]
pub struct StepBuilder {
    step: LeafStep,
}

impl StepBuilder {
    pub fn command(cmd: &str) -> Self {
        Self {
            step: LeafStep {
                command: Some(CommandSpec::from(cmd)),
                ..LeafStep::default()
            },
        }
    }

    pub fn trigger(pipeline: &str) -> Self {
        Self {
            step: LeafStep {
                trigger: Some(pipeline.to_string()),
                ..LeafStep::default()
            },
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: &str) -> Self {
        self.step.label = Some(label.to_string());
        self
    }

    pub fn key(mut self, key: &str) -> Self {
        self.step.key = Some(key.to_string());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.step.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn message(mut self, message: &str) -> Self {
        self.step.build.message = Some(message.to_string());
        self
    }

    pub fn build(self) -> Step {
        Step::Leaf(self.step)
    }
}

/// Builder for `WatchRule`.
pub struct WatchRuleBuilder {
    rule: WatchRule,
}

impl WatchRuleBuilder {
    pub fn new(step: Step) -> Self {
        Self {
            rule: WatchRule {
                step,
                ..WatchRule::default()
            },
        }
    }

    pub fn path(mut self, pattern: &str) -> Self {
        self.rule.paths.push(pattern.to_string());
        self
    }

    pub fn skip(mut self, pattern: &str) -> Self {
        self.rule.skip_paths.push(pattern.to_string());
        self
    }

    pub fn except(mut self, pattern: &str) -> Self {
        self.rule.except_paths.push(pattern.to_string());
        self
    }

    pub fn default_rule(mut self) -> Self {
        self.rule.is_default = true;
        self
    }

    pub fn build(self) -> WatchRule {
        self.rule
    }
}

/// Builder for `PluginConfig` to simplify test setup.
#[derive(Default)]
pub struct PluginConfigBuilder {
    config: PluginConfig,
}

impl PluginConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diff(mut self, command: &str) -> Self {
        self.config.diff = command.to_string();
        self
    }

    pub fn rule(mut self, rule: WatchRule) -> Self {
        self.config.watch.push(rule);
        self
    }

    pub fn wait(mut self, wait: bool) -> Self {
        self.config.wait = wait;
        self
    }

    pub fn interpolation(mut self, interpolation: bool) -> Self {
        self.config.interpolation = interpolation;
        self
    }

    pub fn hook(mut self, command: &str) -> Self {
        self.config.hooks.push(HookConfig {
            command: command.to_string(),
        });
        self
    }

    pub fn build(self) -> PluginConfig {
        self.config
    }
}

#![allow(dead_code)]

pub use monorepo_diff_test_utils::builders::{PluginConfigBuilder, StepBuilder, WatchRuleBuilder};
pub use monorepo_diff_test_utils::fake_runner::FakeCommandRunner;
pub use monorepo_diff_test_utils::init_tracing;

/// Owned changed-path list from string literals.
pub fn files(paths: &[&str]) -> Vec<String> {
    paths.iter().map(|p| p.to_string()).collect()
}

/// Wrap a plugin block in the agent's plugin list JSON.
pub fn plugin_list(block: &str) -> String {
    format!(
        r#"[{{"github.com/buildkite-plugins/monorepo-diff-buildkite-plugin#v1.0.0": {block}}}]"#
    )
}

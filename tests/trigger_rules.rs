// tests/trigger_rules.rs

mod common;

use common::{files, init_tracing, StepBuilder, WatchRuleBuilder};
use monorepo_diff::errors::MonorepoDiffError;
use monorepo_diff::pipeline::{steps_to_trigger, Step};

#[test]
fn glob_rule_triggers_pipeline_for_nested_file() {
    init_tracing();

    let rules = vec![
        WatchRuleBuilder::new(Step::trigger("foo-pipeline"))
            .path("services/**")
            .build(),
    ];

    let steps = steps_to_trigger(&files(&["services/foo/serverless.yml"]), &rules).unwrap();
    assert_eq!(steps, vec![Step::trigger("foo-pipeline")]);
}

#[test]
fn skipped_file_does_not_trigger() {
    init_tracing();

    let rules = vec![
        WatchRuleBuilder::new(Step::trigger("x"))
            .path("**/*.txt")
            .skip("**/*.secret.txt")
            .build(),
    ];

    let steps = steps_to_trigger(&files(&["docs/text.secret.txt"]), &rules).unwrap();
    assert!(steps.is_empty());

    let steps = steps_to_trigger(
        &files(&["docs/text.secret.txt", "docs/readme.txt"]),
        &rules,
    )
    .unwrap();
    assert_eq!(steps, vec![Step::trigger("x")]);
}

#[test]
fn identical_steps_from_two_rules_are_emitted_once() {
    init_tracing();

    let rules = vec![
        WatchRuleBuilder::new(Step::trigger("x")).path("app/").build(),
        WatchRuleBuilder::new(Step::trigger("x")).path("app/**/*.go").build(),
    ];

    let steps = steps_to_trigger(&files(&["app/cmd/main.go", "app/go.mod"]), &rules).unwrap();
    assert_eq!(steps, vec![Step::trigger("x")]);
}

#[test]
fn no_match_and_no_default_yields_nothing() {
    init_tracing();

    let rules = vec![
        WatchRuleBuilder::new(Step::trigger("api"))
            .path("services/api/")
            .build(),
    ];

    let steps = steps_to_trigger(&files(&["README.md"]), &rules).unwrap();
    assert!(steps.is_empty());
}

#[test]
fn except_pattern_disables_whole_rule() {
    init_tracing();

    let rules = vec![
        WatchRuleBuilder::new(Step::trigger("main"))
            .path("main/**")
            .except("main/other/**/*")
            .build(),
        WatchRuleBuilder::new(Step::trigger("docs")).path("docs/").build(),
    ];

    let steps = steps_to_trigger(
        &files(&["main/app/lib.rs", "main/other/deep/file.txt", "docs/index.md"]),
        &rules,
    )
    .unwrap();
    assert_eq!(steps, vec![Step::trigger("docs")]);
}

#[test]
fn default_rule_fires_only_when_nothing_matched() {
    init_tracing();

    let rules = vec![
        WatchRuleBuilder::new(Step::trigger("api"))
            .path("services/api/")
            .build(),
        WatchRuleBuilder::new(Step::command("echo fallback"))
            .default_rule()
            .build(),
    ];

    let matched = steps_to_trigger(&files(&["services/api/main.go"]), &rules).unwrap();
    assert_eq!(matched, vec![Step::trigger("api")]);

    let fallback = steps_to_trigger(&files(&["README.md"]), &rules).unwrap();
    assert_eq!(fallback, vec![Step::command("echo fallback")]);
}

#[test]
fn steps_keep_rule_order() {
    init_tracing();

    let rules = vec![
        WatchRuleBuilder::new(Step::trigger("second")).path("b/").build(),
        WatchRuleBuilder::new(Step::trigger("first")).path("a/").build(),
    ];

    let steps = steps_to_trigger(&files(&["a/x", "b/y"]), &rules).unwrap();
    assert_eq!(steps, vec![Step::trigger("second"), Step::trigger("first")]);
}

#[test]
fn invalid_steps_are_dropped_not_fatal() {
    init_tracing();

    let rules = vec![
        WatchRuleBuilder::new(StepBuilder::empty().label("nothing to do").build())
            .path("a/")
            .build(),
        WatchRuleBuilder::new(Step::group("empty", Vec::new()))
            .path("a/")
            .build(),
        WatchRuleBuilder::new(Step::command("make test")).path("a/").build(),
    ];

    let steps = steps_to_trigger(&files(&["a/file"]), &rules).unwrap();
    assert_eq!(steps, vec![Step::command("make test")]);
}

#[test]
fn steps_differing_in_env_are_both_kept() {
    init_tracing();

    let rules = vec![
        WatchRuleBuilder::new(StepBuilder::command("make").env("TARGET", "a").build())
            .path("a/")
            .build(),
        WatchRuleBuilder::new(StepBuilder::command("make").env("TARGET", "b").build())
            .path("a/")
            .build(),
    ];

    let steps = steps_to_trigger(&files(&["a/file"]), &rules).unwrap();
    assert_eq!(steps.len(), 2);
}

#[test]
fn malformed_glob_is_a_pattern_error() {
    init_tracing();

    let rules = vec![WatchRuleBuilder::new(Step::trigger("x")).path("src/[*").build()];

    match steps_to_trigger(&files(&["src/main.rs"]), &rules) {
        Err(MonorepoDiffError::PatternError { pattern, .. }) => assert_eq!(pattern, "src/[*"),
        other => panic!("expected PatternError, got {other:?}"),
    }
}

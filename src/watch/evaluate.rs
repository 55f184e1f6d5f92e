// src/watch/evaluate.rs

//! Rule evaluation: which watch rules are triggered by a set of changed files.

use tracing::{debug, info};

use crate::config::WatchRule;
use crate::errors::Result;
use crate::pipeline::Step;

use super::patterns::PathMatcher;

/// Evaluate `rules` in order against the changed `files`.
///
/// - Default rules are never triggered directly; the last one declared is
///   used only when no other rule contributed a step.
/// - A rule whose except-patterns match *any* changed file is disabled.
/// - For each watch pattern, the first file that matches it and is not
///   covered by a skip-pattern adds the rule's step once.
///
/// A malformed glob anywhere aborts the evaluation and no steps are returned.
pub fn evaluate(files: &[String], rules: &[WatchRule]) -> Result<Vec<Step>> {
    let mut matcher = PathMatcher::new();
    let mut steps = Vec::new();
    let mut default_step: Option<&Step> = None;

    for rule in rules {
        if rule.is_default {
            default_step = Some(&rule.step);
            continue;
        }

        if let Some(file) = excepted_by(&mut matcher, rule, files)? {
            info!(file = %file, "excepted");
            continue;
        }

        for pattern in &rule.paths {
            for file in files {
                let matched = matcher.matches(pattern, file)?;
                let skipped = matcher.matches_any(&rule.skip_paths, file)?;

                if matched && !skipped {
                    debug!(pattern = %pattern, file = %file, "watch pattern triggered");
                    steps.push(rule.step.clone());
                    break;
                }
            }
        }
    }

    if steps.is_empty() {
        if let Some(step) = default_step {
            debug!("no watch rule triggered; using default step");
            steps.push(step.clone());
        }
    }

    Ok(steps)
}

/// First changed file matching one of the rule's except-patterns, if any.
fn excepted_by<'f>(
    matcher: &mut PathMatcher,
    rule: &WatchRule,
    files: &'f [String],
) -> Result<Option<&'f str>> {
    for pattern in &rule.except_paths {
        for file in files {
            if matcher.matches(pattern, file)? {
                return Ok(Some(file.as_str()));
            }
        }
    }
    Ok(None)
}

// src/exec/backend.rs

//! Pluggable command runner abstraction.
//!
//! The upload flow talks to a `CommandRunner` instead of spawning processes
//! itself. Production code uses [`RealCommandRunner`]; tests provide a fake
//! that records invocations and returns canned output.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::errors::{MonorepoDiffError, Result};

/// Trait abstracting how external commands are executed.
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` to completion and return its stdout.
    ///
    /// A non-zero exit status or a program that cannot be started is a
    /// [`MonorepoDiffError::CommandFailed`] carrying the command's output.
    fn run<'a>(
        &'a self,
        program: &'a str,
        args: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;
}

/// Runner that spawns real OS processes with `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn run<'a>(
        &'a self,
        program: &'a str,
        args: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let shown = display_command(program, args);
            debug!(command = %shown, "running command");

            let output = Command::new(program)
                .args(args)
                .stdin(Stdio::null())
                .output()
                .await
                .map_err(|err| MonorepoDiffError::CommandFailed {
                    command: shown.clone(),
                    output: err.to_string(),
                })?;

            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            let stderr = String::from_utf8_lossy(&output.stderr);

            if !output.status.success() {
                let code = output.status.code().unwrap_or(-1);
                return Err(MonorepoDiffError::CommandFailed {
                    command: shown,
                    output: format!("exit status {code}: {stdout}{stderr}"),
                });
            }

            Ok(stdout)
        })
    }
}

/// `program arg1 arg2`, for logs and error messages.
pub fn display_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_program_and_args() {
        let args = vec!["pipeline".to_string(), "upload".to_string()];
        assert_eq!(display_command("buildkite-agent", &args), "buildkite-agent pipeline upload");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn real_runner_captures_stdout() {
        let args = vec!["-c".to_string(), "echo hello".to_string()];
        let out = RealCommandRunner.run("sh", &args).await.unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn real_runner_reports_failure_with_output() {
        let args = vec!["-c".to_string(), "echo broken >&2; exit 3".to_string()];
        let err = RealCommandRunner.run("sh", &args).await.unwrap_err();
        match err {
            MonorepoDiffError::CommandFailed { output, .. } => {
                assert!(output.contains("exit status 3"));
                assert!(output.contains("broken"));
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_a_command_failure() {
        let err = RealCommandRunner
            .run("definitely-not-a-real-program-xyz", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, MonorepoDiffError::CommandFailed { .. }));
    }
}

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use monorepo_diff::errors::{MonorepoDiffError, Result};
use monorepo_diff::exec::CommandRunner;

/// One recorded call to the fake runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Contents of the pipeline file for `pipeline upload` calls, read while
    /// the file still exists.
    pub uploaded: Option<String>,
}

/// A fake command runner that:
/// - answers shell (`-c`) invocations with a canned diff output
/// - records every call, capturing uploaded pipeline files
/// - optionally fails calls to one program.
#[derive(Debug, Clone, Default)]
pub struct FakeCommandRunner {
    diff_output: String,
    failing_program: Option<String>,
    calls: Arc<Mutex<Vec<Invocation>>>,
}

impl FakeCommandRunner {
    pub fn with_diff(output: &str) -> Self {
        Self {
            diff_output: output.to_string(),
            ..Self::default()
        }
    }

    pub fn failing(mut self, program: &str) -> Self {
        self.failing_program = Some(program.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    /// The recorded `pipeline upload` call, if one happened.
    pub fn upload(&self) -> Option<Invocation> {
        self.calls()
            .into_iter()
            .find(|c| c.args.first().map(String::as_str) == Some("pipeline"))
    }
}

impl CommandRunner for FakeCommandRunner {
    fn run<'a>(
        &'a self,
        program: &'a str,
        args: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let is_upload = args.first().map(String::as_str) == Some("pipeline");
            let uploaded = if is_upload {
                args.get(2).and_then(|path| std::fs::read_to_string(path).ok())
            } else {
                None
            };

            self.calls.lock().unwrap().push(Invocation {
                program: program.to_string(),
                args: args.to_vec(),
                uploaded,
            });

            if self.failing_program.as_deref() == Some(program) {
                return Err(MonorepoDiffError::CommandFailed {
                    command: program.to_string(),
                    output: "exit status 1: simulated failure".to_string(),
                });
            }

            if args.first().map(String::as_str) == Some("-c") {
                Ok(self.diff_output.clone())
            } else {
                Ok(String::new())
            }
        })
    }
}

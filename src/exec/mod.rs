// src/exec/mod.rs

//! External process layer.
//!
//! - [`backend`] provides the `CommandRunner` trait and the tokio-backed
//!   `RealCommandRunner`; tests replace it with a fake.
//! - [`diff`] runs the diff command and decodes the changed paths.
//! - [`upload`] writes the pipeline to a temp file and hands it to the agent.

pub mod backend;
pub mod diff;
pub mod upload;

pub use backend::{CommandRunner, RealCommandRunner};
pub use diff::{diff, parse_diff_output};
pub use upload::{
    upload_invocation, upload_pipeline, write_pipeline, UploadInvocation, UploadOptions,
    AGENT_PROGRAM,
};

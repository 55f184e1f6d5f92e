// src/env/mod.rs

//! Access to the CI process environment.
//!
//! The normalizer never reads `std::env` directly; it receives an
//! [`EnvSource`] so the same configuration resolves identically in tests.

use std::fmt::Debug;

pub mod mock;

pub use mock::MapEnv;

/// Abstract environment lookup.
pub trait EnvSource: Debug {
    /// Value of `key`, or `None` when unset.
    fn var(&self, key: &str) -> Option<String>;

    /// Value of `key`, falling back to `default` when unset.
    fn var_or(&self, key: &str, default: &str) -> String {
        self.var(key).unwrap_or_else(|| default.to_string())
    }
}

/// Implementation backed by the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

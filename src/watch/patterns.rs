// src/watch/patterns.rs

//! Matching changed paths against watch patterns.
//!
//! A pattern containing `*` is treated as a glob with `**` directory
//! wildcards (`*` never crosses a `/`). Every pattern is also tried as a
//! plain prefix of the path, so `"app/"` matches `"app/main.go"` and a glob
//! that does not match can still match literally.

use std::collections::HashMap;

use globset::{GlobBuilder, GlobMatcher};

use crate::errors::{MonorepoDiffError, Result};

/// Whether `pattern` should be interpreted as a glob.
pub fn is_glob(pattern: &str) -> bool {
    pattern.contains('*')
}

/// Compile a glob pattern into a matcher.
pub fn compile_glob(pattern: &str) -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| MonorepoDiffError::PatternError {
            pattern: pattern.to_string(),
            source,
        })?;
    Ok(glob.compile_matcher())
}

/// Check whether the changed file `path` satisfies `pattern`.
///
/// A malformed glob is an error, never a silent non-match.
pub fn matches(pattern: &str, path: &str) -> Result<bool> {
    PathMatcher::new().matches(pattern, path)
}

/// Path matcher that compiles each glob once and reuses it for every
/// changed path it is tested against.
#[derive(Debug, Default)]
pub struct PathMatcher {
    globs: HashMap<String, GlobMatcher>,
}

impl PathMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matches(&mut self, pattern: &str, path: &str) -> Result<bool> {
        if is_glob(pattern) && self.glob(pattern)?.is_match(path) {
            return Ok(true);
        }
        Ok(path.starts_with(pattern))
    }

    /// True if `path` matches any of `patterns`.
    pub fn matches_any(&mut self, patterns: &[String], path: &str) -> Result<bool> {
        for pattern in patterns {
            if self.matches(pattern, path)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn glob(&mut self, pattern: &str) -> Result<&GlobMatcher> {
        if !self.globs.contains_key(pattern) {
            let matcher = compile_glob(pattern)?;
            self.globs.insert(pattern.to_string(), matcher);
        }
        Ok(&self.globs[pattern])
    }
}

// src/watch/mod.rs

//! Change detection against watch rules.
//!
//! This module is responsible for:
//! - Matching changed paths against glob / prefix patterns ([`patterns`]).
//! - Deciding which watch rules a set of changed files triggers
//!   ([`evaluate`]).
//!
//! It does **not** know how steps are validated or emitted; it only turns
//! changed files into the raw, ordered list of triggered steps.

pub mod evaluate;
pub mod patterns;

pub use evaluate::evaluate;
pub use patterns::{matches, PathMatcher};

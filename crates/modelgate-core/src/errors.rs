//! Validation error shared by every crate that checks loosely-typed input.
//!
//! The schema validator, the feature composer, the retry policy and the
//! settings loader all report violations through [`ValidationError`], so a
//! caller always gets the same shape: the field path, what was expected, and
//! what was found instead.

use std::fmt;

use thiserror::Error;

/// A schema or field violation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid value at {path}: expected {expected}, found {found}")]
pub struct ValidationError {
    /// Dotted/indexed path to the first offending field (e.g. `data[3].id`).
    pub path: String,
    /// Human-readable description of the expected shape.
    pub expected: String,
    /// Short description of what was actually present.
    pub found: String,
}

impl ValidationError {
    /// Build a validation error for `path`.
    pub fn new(
        path: impl Into<String>,
        expected: impl Into<String>,
        found: impl fmt::Display,
    ) -> Self {
        Self {
            path: path.into(),
            expected: expected.into(),
            found: found.to_string(),
        }
    }

    /// Error for a required field that is absent.
    pub fn missing(path: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::new(path, expected, "nothing")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

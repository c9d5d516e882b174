// SPDX-License-Identifier: AGPL-3.0-only

//! Typed errors for model construction and monomial reduction.
//!
//! Public APIs return a proper enum so callers can pattern-match on failure
//! modes (bad hierarchy level, bad reduction parameters, artifact write
//! failure) rather than parsing opaque strings.

use std::fmt;

/// Errors arising from hierarchy construction, reduction, or artifact output.
#[derive(Debug)]
pub enum MonomError {
    /// A caller-supplied argument is out of range: hierarchy level < 1,
    /// variable count < 1, or negative maximum degree. Detected before any
    /// computation runs; no partial result is produced.
    InvalidArgument(String),

    /// Writing an output artifact failed (path, underlying IO error).
    ArtifactWrite(String),
}

impl fmt::Display for MonomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            Self::ArtifactWrite(msg) => write!(f, "Failed to write artifact: {msg}"),
        }
    }
}

impl std::error::Error for MonomError {}

//! Error types for the frame graph engine
//!
//! This module defines the error types used throughout the crate,
//! covering projection math and frame lookup failures. Configuration
//! problems (degenerate constraint directions, bad radii, cycle
//! attempts) are not errors: they are corrected to a safe default and
//! reported through the [`Diagnostics`](crate::log::Diagnostics) sink.

use std::fmt;

/// Result type for frame graph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Frame graph errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A matrix that must be inverted (projection×view) is singular
    SingularMatrix(String),

    /// Perspective divide hit a zero homogeneous coordinate
    NullDivisor,

    /// An operation referenced a frame key that is not in the tree
    UnknownFrame(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SingularMatrix(msg) => write!(f, "Singular matrix: {}", msg),
            Error::NullDivisor => write!(f, "Perspective divide by zero"),
            Error::UnknownFrame(msg) => write!(f, "Unknown frame: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

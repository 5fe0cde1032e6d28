//! Cross-cutting error classification.
//!
//! Every public error type in the crate maps onto an [`ErrorKind`] so callers
//! can decide between correcting a request (`NotFound`, `Conflict`,
//! `Validation`) and backing off (`ResourceExhausted`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse classification shared by registry, factory and scheduler errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// An unknown template or agent identifier was referenced.
    NotFound,
    /// A duplicate agent id, a conflicting template registration, or a
    /// lifecycle transition the current state does not allow.
    Conflict,
    /// Malformed input such as an invalid version or instance configuration.
    Validation,
    /// The concurrency ceiling has been reached.
    ResourceExhausted,
    /// Construction, execution or runtime failure inside a template.
    Internal,
}

impl ErrorKind {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Validation => "validation",
            Self::ResourceExhausted => "resource_exhausted",
            Self::Internal => "internal",
        }
    }

    /// Returns whether a client should retry later rather than fix the request.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::ResourceExhausted)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

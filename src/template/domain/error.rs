//! Error types for template domain validation.

use thiserror::Error;

/// Errors returned while constructing template domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateDomainError {
    /// The template identifier is empty after trimming.
    #[error("template id must not be empty")]
    EmptyTemplateId,

    /// The template identifier contains characters outside `[A-Za-z0-9_.-]`.
    #[error(
        "template id '{0}' contains invalid characters (only alphanumeric, '_', '-' and '.' allowed)"
    )]
    InvalidTemplateId(String),

    /// The template identifier exceeds the length limit.
    #[error("template id exceeds 100 character limit: {0}")]
    TemplateIdTooLong(String),

    /// The framework tag is empty after trimming.
    #[error("framework tag must not be empty")]
    EmptyFrameworkTag,

    /// The framework tag contains characters outside `[a-z0-9_-]`.
    #[error("framework tag '{0}' contains invalid characters")]
    InvalidFrameworkTag(String),

    /// The template display name is empty after trimming.
    #[error("template name must not be empty")]
    EmptyTemplateName,

    /// The version string is not a valid semantic version.
    #[error("invalid semantic version '{version}': {reason}")]
    InvalidVersion {
        /// Rejected version string.
        version: String,
        /// Parser diagnostic.
        reason: String,
    },
}

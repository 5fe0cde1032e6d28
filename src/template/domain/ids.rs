//! Identifier types for the template domain.

use super::TemplateDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a template identifier.
const MAX_TEMPLATE_ID_LENGTH: usize = 100;

/// Framework tag assigned to templates that do not declare one.
pub const DEFAULT_FRAMEWORK_TAG: &str = "native";

/// Stable identifier of a template across all of its versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    /// Creates a validated template identifier.
    ///
    /// The input is trimmed. Only characters in `[A-Za-z0-9_.-]` are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateDomainError::EmptyTemplateId`],
    /// [`TemplateDomainError::InvalidTemplateId`] or
    /// [`TemplateDomainError::TemplateIdTooLong`].
    pub fn new(value: impl Into<String>) -> Result<Self, TemplateDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(TemplateDomainError::EmptyTemplateId);
        }
        if trimmed.len() > MAX_TEMPLATE_ID_LENGTH {
            return Err(TemplateDomainError::TemplateIdTooLong(raw));
        }

        let is_valid = trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !is_valid {
            return Err(TemplateDomainError::InvalidTemplateId(raw));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TemplateId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Label of the execution family a template belongs to.
///
/// The agent factory routes construction to a framework-specific factory
/// keyed by this tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameworkTag(String);

impl FrameworkTag {
    /// Creates a validated, lowercased framework tag.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateDomainError::EmptyFrameworkTag`] or
    /// [`TemplateDomainError::InvalidFrameworkTag`].
    pub fn new(value: impl Into<String>) -> Result<Self, TemplateDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase();

        if normalized.is_empty() {
            return Err(TemplateDomainError::EmptyFrameworkTag);
        }

        let is_valid = normalized
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-'));
        if !is_valid {
            return Err(TemplateDomainError::InvalidFrameworkTag(raw));
        }

        Ok(Self(normalized))
    }

    /// Returns the tag used when a template does not declare one.
    #[must_use]
    pub fn native() -> Self {
        Self(DEFAULT_FRAMEWORK_TAG.to_owned())
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FrameworkTag {
    fn default() -> Self {
        Self::native()
    }
}

impl AsRef<str> for FrameworkTag {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for FrameworkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

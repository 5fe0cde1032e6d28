//! Template metadata and configuration validation results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Descriptive metadata reported by a template implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateMetadata {
    /// Human-readable template name.
    pub name: String,
    /// Stable template identifier.
    pub template_id: String,
    /// Semantic version string.
    pub version: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// JSON schema describing accepted instance configuration.
    #[serde(default)]
    pub config_schema: Value,
    /// Runtime requirements (models, tools, memory) declared by the template.
    #[serde(default)]
    pub runtime_requirements: Value,
}

/// Outcome of validating an instance configuration against a template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigValidation {
    /// Whether the configuration is acceptable.
    pub valid: bool,
    /// Blocking problems.
    pub errors: Vec<String>,
    /// Non-blocking observations.
    pub warnings: Vec<String>,
}

impl ConfigValidation {
    /// Creates a passing validation result.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Records a blocking error and marks the result invalid.
    pub fn push_error(&mut self, error: impl Into<String>) {
        self.valid = false;
        self.errors.push(error.into());
    }

    /// Records a non-blocking warning.
    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Returns whether the result carries no errors.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }
}

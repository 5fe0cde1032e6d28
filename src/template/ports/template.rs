//! Capability contracts for templates and the instances they build.

use crate::agent::domain::AgentSpec;
use crate::template::domain::{ConfigValidation, DEFAULT_FRAMEWORK_TAG, TemplateMetadata};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Result type for template and instance operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Construction recipe for agent instances.
///
/// Implementations are registered in the template library at process start
/// and referenced from manifests by constructor name.
#[async_trait]
pub trait AgentTemplate: Send + Sync {
    /// Stable template identifier.
    fn template_id(&self) -> &str;

    /// Human-readable template name.
    fn template_name(&self) -> &str;

    /// Semantic version string.
    fn version(&self) -> &str;

    /// Execution family used for factory routing.
    fn framework_tag(&self) -> &str {
        DEFAULT_FRAMEWORK_TAG
    }

    /// Descriptive metadata, including the configuration schema.
    fn metadata(&self) -> TemplateMetadata;

    /// Checks an instance configuration before construction.
    fn validate_config(&self, config: &Value) -> ConfigValidation;

    /// Builds a new agent instance.
    async fn create_instance(&self, spec: &AgentSpec) -> TemplateResult<Box<dyn AgentInstance>>;
}

/// A live agent built from a template.
#[async_trait]
pub trait AgentInstance: Send + Sync {
    /// Runs the agent on one input.
    async fn execute(&self, input: Value) -> TemplateResult<Value>;

    /// Releases resources held by the instance.
    ///
    /// The default implementation does nothing.
    async fn cleanup(&self) -> TemplateResult<()> {
        Ok(())
    }
}

/// Errors reported by template and instance implementations.
#[derive(Debug, Clone, Error)]
pub enum TemplateError {
    /// The configuration was rejected during construction.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The instance could not be built.
    #[error("construction failed: {0}")]
    Construction(String),

    /// The instance failed while executing.
    #[error("execution failed: {0}")]
    Execution(String),

    /// Generic runtime failure.
    #[error("template runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl TemplateError {
    /// Wraps a runtime error from a template implementation.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}

//! Framework-specific construction.

use crate::agent::domain::AgentSpec;
use crate::template::{
    domain::TemplateDescriptor,
    ports::{AgentInstance, TemplateResult},
};
use async_trait::async_trait;

/// Builds instances for templates of one framework tag.
///
/// When a factory is registered for a descriptor's framework tag, the agent
/// factory delegates construction to it instead of calling the template's
/// own `create_instance`.
#[async_trait]
pub trait FrameworkFactory: Send + Sync {
    /// Builds an instance of `descriptor` configured by `spec`.
    async fn create_instance(
        &self,
        descriptor: &TemplateDescriptor,
        spec: &AgentSpec,
    ) -> TemplateResult<Box<dyn AgentInstance>>;
}

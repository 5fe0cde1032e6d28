//! Shared fixtures for agent service tests.

use std::sync::Arc;

use crate::agent::domain::{AgentId, AgentSpec};
use crate::template::{
    adapters::EchoTemplate,
    domain::{SourceLocation, TemplateDescriptor, TemplateHandle},
    services::TemplateRegistry,
};

/// Builds a registry holding the given templates.
pub(super) fn registry_with(
    handles: impl IntoIterator<Item = TemplateHandle>,
) -> Arc<TemplateRegistry> {
    let registry = Arc::new(TemplateRegistry::new());
    for handle in handles {
        let descriptor = TemplateDescriptor::from_template(handle, SourceLocation::Library)
            .expect("test template should describe itself");
        assert!(registry.register(descriptor), "test template should register");
    }
    registry
}

/// Builds a registry holding `echo@1.0.0` and `echo@2.0.0`.
pub(super) fn echo_registry() -> Arc<TemplateRegistry> {
    registry_with([
        TemplateHandle::from_template(EchoTemplate::default()),
        TemplateHandle::from_template(EchoTemplate::new("echo", "2.0.0")),
    ])
}

/// Parses an agent id.
pub(super) fn agent_id(raw: &str) -> AgentId {
    AgentId::new(raw).expect("valid agent id")
}

/// Builds a spec for the latest echo template.
pub(super) fn echo_spec(raw_id: &str) -> AgentSpec {
    AgentSpec::new(agent_id(raw_id), "echo")
}

//! Request shape for building an agent instance.

use super::AgentId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Everything the factory needs to build one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    agent_id: AgentId,
    name: Option<String>,
    template_id: String,
    template_version: Option<String>,
    #[serde(default)]
    config: Value,
}

impl AgentSpec {
    /// Creates a spec targeting the latest version of a template with an
    /// empty configuration.
    #[must_use]
    pub fn new(agent_id: AgentId, template_id: impl Into<String>) -> Self {
        Self {
            agent_id,
            name: None,
            template_id: template_id.into(),
            template_version: None,
            config: Value::Null,
        }
    }

    /// Pins the template version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.template_version = Some(version.into());
        self
    }

    /// Sets the instance configuration.
    #[must_use]
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    /// Sets a human-readable agent name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the agent identifier.
    #[must_use]
    pub fn with_agent_id(mut self, agent_id: AgentId) -> Self {
        self.agent_id = agent_id;
        self
    }

    /// Returns the agent identifier.
    #[must_use]
    pub const fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    /// Returns the agent name, if set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the requested template identifier.
    #[must_use]
    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    /// Returns the pinned template version, if any.
    #[must_use]
    pub fn template_version(&self) -> Option<&str> {
        self.template_version.as_deref()
    }

    /// Returns the instance configuration.
    #[must_use]
    pub const fn config(&self) -> &Value {
        &self.config
    }
}

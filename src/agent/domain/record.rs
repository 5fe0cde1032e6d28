//! Tracking records for live agent instances.

use super::{AgentId, AgentMetrics, AgentStatus};
use crate::template::domain::{FrameworkTag, TemplateId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Snapshot of what an agent was built from, frozen at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMetadata {
    /// Template the instance was built from.
    pub template_id: TemplateId,
    /// Exact template version resolved at creation.
    pub template_version: String,
    /// Framework tag of the resolved template.
    pub framework_tag: FrameworkTag,
    /// Agent name from the creation spec.
    pub name: Option<String>,
    /// Configuration the instance was built with.
    pub config: Value,
}

/// Public view of one live agent.
///
/// Later registry changes never affect the recorded template reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInstanceRecord {
    /// Agent identifier.
    pub agent_id: AgentId,
    /// Template identity and configuration snapshot.
    pub metadata: AgentMetadata,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Lifecycle status.
    pub status: AgentStatus,
    /// Latest activity timestamp.
    pub last_activity: DateTime<Utc>,
    /// Cumulative execution metrics.
    pub metrics: AgentMetrics,
}

impl AgentInstanceRecord {
    /// Returns the template identifier the agent was built from.
    #[must_use]
    pub const fn template_id(&self) -> &TemplateId {
        &self.metadata.template_id
    }

    /// Returns the template version the agent was built from.
    #[must_use]
    pub fn template_version(&self) -> &str {
        &self.metadata.template_version
    }
}

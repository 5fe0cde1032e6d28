//! Catalog snapshot served to the agent management layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry per template, describing its latest version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSchemaEntry {
    /// Template identifier.
    pub template_id: String,
    /// Latest registered version.
    pub version: String,
    /// Display name.
    pub name: String,
    /// Description reported by the implementation.
    pub description: String,
    /// Framework tag.
    pub framework: String,
    /// All registered versions, newest first.
    pub available_versions: Vec<String>,
    /// Accepted configuration schema.
    pub config_schema: Value,
    /// Declared runtime requirements.
    pub runtime_requirements: Value,
}

/// Feature flags advertised by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCapabilities {
    /// Multiple versions per template can coexist.
    pub versioning: bool,
    /// Construction can be routed to framework-specific factories.
    pub framework_routing: bool,
    /// Changed manifests can be reloaded on demand.
    pub hot_reload: bool,
    /// Instance configuration is validated before construction.
    pub config_validation: bool,
}

impl Default for CatalogCapabilities {
    fn default() -> Self {
        Self {
            versioning: true,
            framework_routing: true,
            hot_reload: true,
            config_validation: true,
        }
    }
}

/// Numeric limits advertised alongside the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogLimits {
    /// Concurrency ceiling enforced by the scheduler.
    pub max_concurrent_agents: usize,
    /// Idle timeout before eviction, in seconds.
    pub idle_timeout_secs: u64,
    /// Retention of terminal task records, in seconds.
    pub task_retention_secs: u64,
}

/// Snapshot of the whole catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSchema {
    /// Latest version of every registered template, sorted by id.
    pub templates: Vec<TemplateSchemaEntry>,
    /// Framework tags with at least one registered template.
    pub frameworks: Vec<String>,
    /// Advertised feature flags.
    pub capabilities: CatalogCapabilities,
    /// Advertised numeric limits.
    pub limits: CatalogLimits,
}

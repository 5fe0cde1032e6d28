//! Template descriptor: the catalog's record of one template version.

use super::{FrameworkTag, TemplateDomainError, TemplateId, TemplateMetadata};
use crate::template::ports::AgentTemplate;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Where a descriptor was discovered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "path", rename_all = "snake_case")]
pub enum SourceLocation {
    /// Declared by a manifest unit on disk.
    Manifest(Utf8PathBuf),
    /// Registered in-process in the template library.
    Library,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manifest(path) => write!(f, "manifest:{path}"),
            Self::Library => f.write_str("library"),
        }
    }
}

/// Shared reference to a template implementation.
///
/// Two handles are equal only when they point at the same implementation
/// object. The registry uses this identity to tell an idempotent
/// re-registration apart from a conflicting one.
#[derive(Clone)]
pub struct TemplateHandle(Arc<dyn AgentTemplate>);

impl TemplateHandle {
    /// Wraps a shared template implementation.
    #[must_use]
    pub fn new(template: Arc<dyn AgentTemplate>) -> Self {
        Self(template)
    }

    /// Wraps an owned template implementation.
    #[must_use]
    pub fn from_template(template: impl AgentTemplate + 'static) -> Self {
        Self(Arc::new(template))
    }

    /// Returns the wrapped implementation.
    #[must_use]
    pub fn template(&self) -> &dyn AgentTemplate {
        self.0.as_ref()
    }

    /// Returns whether both handles refer to the same implementation.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for TemplateHandle {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl Eq for TemplateHandle {}

impl fmt::Debug for TemplateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateHandle")
            .field("template_id", &self.0.template_id())
            .field("version", &self.0.version())
            .finish()
    }
}

/// Parameter object for building a descriptor from explicit parts.
#[derive(Debug, Clone)]
pub struct DescriptorParams {
    /// Stable template identifier.
    pub template_id: TemplateId,
    /// Semantic version string, validated on registration.
    pub version: String,
    /// Human-readable name.
    pub display_name: String,
    /// Execution family used for factory routing.
    pub framework_tag: FrameworkTag,
    /// Where the template was found.
    pub source_location: SourceLocation,
    /// JSON schema of accepted configuration.
    pub config_schema: Value,
    /// Implementation used to validate configuration and build instances.
    pub capability_handle: TemplateHandle,
}

/// Immutable descriptor for one version of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDescriptor {
    template_id: TemplateId,
    version: String,
    display_name: String,
    framework_tag: FrameworkTag,
    source_location: SourceLocation,
    config_schema: Value,
    capability_handle: TemplateHandle,
}

impl TemplateDescriptor {
    /// Creates a descriptor from explicit parts.
    #[must_use]
    pub fn new(params: DescriptorParams) -> Self {
        Self {
            template_id: params.template_id,
            version: params.version,
            display_name: params.display_name,
            framework_tag: params.framework_tag,
            source_location: params.source_location,
            config_schema: params.config_schema,
            capability_handle: params.capability_handle,
        }
    }

    /// Creates a descriptor from the values the implementation reports
    /// about itself.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateDomainError`] when the implementation reports an
    /// invalid identifier, an empty name or an invalid framework tag.
    pub fn from_template(
        handle: TemplateHandle,
        source_location: SourceLocation,
    ) -> Result<Self, TemplateDomainError> {
        let template = handle.template();
        let template_id = TemplateId::new(template.template_id())?;
        let display_name = template.template_name().trim().to_owned();
        if display_name.is_empty() {
            return Err(TemplateDomainError::EmptyTemplateName);
        }
        let framework_tag = FrameworkTag::new(template.framework_tag())?;
        let version = template.version().to_owned();
        let config_schema = template.metadata().config_schema;

        Ok(Self::new(DescriptorParams {
            template_id,
            version,
            display_name,
            framework_tag,
            source_location,
            config_schema,
            capability_handle: handle,
        }))
    }

    /// Returns the template identifier.
    #[must_use]
    pub const fn template_id(&self) -> &TemplateId {
        &self.template_id
    }

    /// Returns the version string.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the framework tag.
    #[must_use]
    pub const fn framework_tag(&self) -> &FrameworkTag {
        &self.framework_tag
    }

    /// Returns where the descriptor was discovered.
    #[must_use]
    pub const fn source_location(&self) -> &SourceLocation {
        &self.source_location
    }

    /// Returns the configuration schema.
    #[must_use]
    pub const fn config_schema(&self) -> &Value {
        &self.config_schema
    }

    /// Returns the implementation handle.
    #[must_use]
    pub const fn capability_handle(&self) -> &TemplateHandle {
        &self.capability_handle
    }

    /// Returns metadata for this descriptor.
    ///
    /// Name, version and schema come from the descriptor; description and
    /// runtime requirements come from the implementation.
    #[must_use]
    pub fn metadata(&self) -> TemplateMetadata {
        let reported = self.capability_handle.template().metadata();
        TemplateMetadata {
            name: self.display_name.clone(),
            template_id: self.template_id.as_str().to_owned(),
            version: self.version.clone(),
            description: reported.description,
            config_schema: self.config_schema.clone(),
            runtime_requirements: reported.runtime_requirements,
        }
    }
}

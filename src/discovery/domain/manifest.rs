//! Template manifest documents.
//!
//! A manifest is a JSON file holding either one entry or a `templates`
//! array. Each entry names a library constructor and may override the
//! identity the implementation reports about itself:
//!
//! ```json
//! {
//!   "templates": [
//!     { "constructor": "echo", "template_id": "greeter", "version": "2.0.0" },
//!     { "constructor": "echo", "abstract": true }
//!   ]
//! }
//! ```

use super::DiscoveryError;
use crate::template::adapters::TemplateLibrary;
use crate::template::domain::{
    DescriptorParams, FrameworkTag, SourceLocation, TemplateDescriptor, TemplateId,
};
use camino::Utf8Path;
use serde::Deserialize;
use serde_json::Value;

/// File-name suffix identifying manifest units.
pub const DEFAULT_MANIFEST_SUFFIX: &str = ".template.json";

/// Top-level manifest shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ManifestDocument {
    /// A document listing several entries.
    Catalog {
        /// Declared entries.
        templates: Vec<ManifestEntry>,
    },
    /// A document holding a single entry.
    Single(ManifestEntry),
}

impl ManifestDocument {
    /// Parses a manifest document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Parse`] when the text is not a manifest.
    pub fn parse(unit: &Utf8Path, contents: &str) -> Result<Self, DiscoveryError> {
        serde_json::from_str(contents).map_err(|source| DiscoveryError::Parse {
            unit: unit.to_owned(),
            source,
        })
    }

    /// Returns the declared entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<ManifestEntry> {
        match self {
            Self::Catalog { templates } => templates,
            Self::Single(entry) => vec![entry],
        }
    }
}

/// One template declaration inside a manifest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ManifestEntry {
    /// Library constructor name.
    pub constructor: String,
    /// Overrides the implementation's template id.
    #[serde(default)]
    pub template_id: Option<String>,
    /// Overrides the implementation's display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Overrides the implementation's version.
    #[serde(default)]
    pub version: Option<String>,
    /// Overrides the implementation's framework tag.
    #[serde(default)]
    pub framework: Option<String>,
    /// Overrides the implementation's configuration schema.
    #[serde(default)]
    pub config_schema: Option<Value>,
    /// Marks a base declaration that is never instantiated.
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
}

impl ManifestEntry {
    /// Resolves the entry against the library.
    ///
    /// Returns `Ok(None)` for abstract entries.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] when the constructor is unknown or a
    /// required field resolves to an empty or invalid value.
    pub fn resolve(
        &self,
        library: &TemplateLibrary,
        unit: &Utf8Path,
    ) -> Result<Option<TemplateDescriptor>, DiscoveryError> {
        if self.is_abstract {
            return Ok(None);
        }

        let handle = library.resolve(&self.constructor).ok_or_else(|| {
            DiscoveryError::UnknownConstructor {
                constructor: self.constructor.clone(),
            }
        })?;
        let template = handle.template();

        let template_id = self.required(
            "template_id",
            self.template_id.as_deref(),
            template.template_id(),
        )?;
        let display_name =
            self.required("name", self.name.as_deref(), template.template_name())?;
        let version = self.required("version", self.version.as_deref(), template.version())?;
        let framework_tag = FrameworkTag::new(
            self.framework
                .as_deref()
                .unwrap_or_else(|| template.framework_tag()),
        )?;
        let config_schema = self
            .config_schema
            .clone()
            .unwrap_or_else(|| template.metadata().config_schema);

        Ok(Some(TemplateDescriptor::new(DescriptorParams {
            template_id: TemplateId::new(template_id)?,
            version,
            display_name,
            framework_tag,
            source_location: SourceLocation::Manifest(unit.to_owned()),
            config_schema,
            capability_handle: handle,
        })))
    }

    fn required(
        &self,
        field: &'static str,
        declared: Option<&str>,
        reported: &str,
    ) -> Result<String, DiscoveryError> {
        let value = declared.unwrap_or(reported).trim();
        if value.is_empty() {
            return Err(DiscoveryError::MissingField {
                constructor: self.constructor.clone(),
                field,
            });
        }
        Ok(value.to_owned())
    }
}

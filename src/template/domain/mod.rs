//! Domain model for agent templates.
//!
//! Descriptors, identifiers, semantic version handling and the catalog
//! snapshot shape. Discovery and lifecycle concerns stay outside this
//! boundary.

mod descriptor;
mod error;
mod ids;
mod metadata;
mod schema;
mod version;

pub use descriptor::{DescriptorParams, SourceLocation, TemplateDescriptor, TemplateHandle};
pub use error::TemplateDomainError;
pub use ids::{DEFAULT_FRAMEWORK_TAG, FrameworkTag, TemplateId};
pub use metadata::{ConfigValidation, TemplateMetadata};
pub use schema::{CatalogCapabilities, CatalogLimits, CatalogSchema, TemplateSchemaEntry};
pub use version::{compare_versions, parse_version, satisfies_minimum, sort_descending};

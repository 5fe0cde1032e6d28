//! Versioned template catalog.
//!
//! Provides [`TemplateRegistry`], the in-memory catalog the agent factory
//! resolves descriptors from. Each template id maps to its registered
//! versions, kept sorted newest first so that element zero is the latest.

use crate::error::ErrorKind;
use crate::template::domain::{
    CatalogCapabilities, CatalogLimits, CatalogSchema, FrameworkTag, TemplateDescriptor,
    TemplateDomainError, TemplateId, TemplateMetadata, TemplateSchemaEntry, parse_version,
    satisfies_minimum, sort_descending,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Reasons a descriptor was not registered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistrationError {
    /// The version string is not a valid semantic version.
    #[error(transparent)]
    InvalidVersion(#[from] TemplateDomainError),

    /// The same id and version is registered with a different implementation.
    #[error("template {template_id}@{version} is already registered with a different implementation")]
    Conflict {
        /// Template identifier.
        template_id: TemplateId,
        /// Conflicting version.
        version: String,
    },
}

impl RegistrationError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidVersion(_) => ErrorKind::Validation,
            Self::Conflict { .. } => ErrorKind::Conflict,
        }
    }
}

/// Result of an accepted registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The descriptor was added to the catalog.
    Inserted,
    /// The identical descriptor handle was already registered.
    AlreadyRegistered,
}

#[derive(Debug, Default)]
struct CatalogEntry {
    descriptors: HashMap<String, TemplateDescriptor>,
    versions: Vec<String>,
}

impl CatalogEntry {
    fn latest(&self) -> Option<&TemplateDescriptor> {
        self.versions
            .first()
            .and_then(|version| self.descriptors.get(version))
    }

    fn resolve(&self, version: Option<&str>) -> Option<&TemplateDescriptor> {
        version.map_or_else(|| self.latest(), |requested| self.descriptors.get(requested))
    }

    fn frameworks(&self) -> BTreeSet<FrameworkTag> {
        self.descriptors
            .values()
            .map(|descriptor| descriptor.framework_tag().clone())
            .collect()
    }
}

#[derive(Debug, Default)]
struct Catalog {
    entries: HashMap<TemplateId, CatalogEntry>,
    framework_index: HashMap<FrameworkTag, BTreeSet<TemplateId>>,
    metadata_cache: HashMap<(TemplateId, String), TemplateMetadata>,
}

impl Catalog {
    /// Rebuilds framework index membership for one template id.
    fn reindex(&mut self, template_id: &TemplateId) {
        let present = self
            .entries
            .get(template_id)
            .map(CatalogEntry::frameworks)
            .unwrap_or_default();

        for (tag, members) in &mut self.framework_index {
            if !present.contains(tag) {
                members.remove(template_id);
            }
        }
        for tag in present {
            self.framework_index
                .entry(tag)
                .or_default()
                .insert(template_id.clone());
        }
        self.framework_index.retain(|_, members| !members.is_empty());
    }
}

/// Thread-safe versioned catalog of template descriptors.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    catalog: RwLock<Catalog>,
}

impl TemplateRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Catalog> {
        self.catalog.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Catalog> {
        self.catalog.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a descriptor, returning `false` instead of failing.
    ///
    /// Rejections are logged. See [`Self::try_register`] for the reasons.
    pub fn register(&self, descriptor: TemplateDescriptor) -> bool {
        let template_id = descriptor.template_id().clone();
        let version = descriptor.version().to_owned();
        match self.try_register(descriptor) {
            Ok(_) => true,
            Err(err) => {
                warn!(
                    template_id = %template_id,
                    version = %version,
                    error = %err,
                    "template registration rejected"
                );
                false
            }
        }
    }

    /// Registers a descriptor.
    ///
    /// Re-registering the same id, version and implementation is accepted
    /// without change.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidVersion`] for a malformed version
    /// and [`RegistrationError::Conflict`] when the id and version are taken
    /// by a different implementation.
    pub fn try_register(
        &self,
        descriptor: TemplateDescriptor,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        parse_version(descriptor.version())?;

        let template_id = descriptor.template_id().clone();
        let version = descriptor.version().to_owned();
        let metadata = descriptor.metadata();

        let mut catalog = self.write();
        let entry = catalog.entries.entry(template_id.clone()).or_default();

        if let Some(existing) = entry.descriptors.get(&version) {
            if existing
                .capability_handle()
                .same_as(descriptor.capability_handle())
            {
                return Ok(RegistrationOutcome::AlreadyRegistered);
            }
            return Err(RegistrationError::Conflict {
                template_id,
                version,
            });
        }

        entry.descriptors.insert(version.clone(), descriptor);
        entry.versions.push(version.clone());
        sort_descending(&mut entry.versions);

        catalog.reindex(&template_id);
        catalog
            .metadata_cache
            .insert((template_id.clone(), version.clone()), metadata);

        debug!(template_id = %template_id, version = %version, "template registered");
        Ok(RegistrationOutcome::Inserted)
    }

    /// Removes one version, or every version when `version` is `None`.
    ///
    /// Returns whether anything was removed.
    pub fn unregister(&self, template_id: &str, version: Option<&str>) -> bool {
        let Ok(id) = TemplateId::new(template_id) else {
            return false;
        };

        let mut catalog = self.write();
        let Some(entry) = catalog.entries.get_mut(&id) else {
            return false;
        };

        let removed: Vec<String> = match version {
            Some(target) => {
                if entry.descriptors.remove(target).is_none() {
                    return false;
                }
                entry.versions.retain(|v| v != target);
                vec![target.to_owned()]
            }
            None => {
                entry.descriptors.clear();
                std::mem::take(&mut entry.versions)
            }
        };

        if entry.versions.is_empty() {
            catalog.entries.remove(&id);
        }
        for removed_version in &removed {
            catalog
                .metadata_cache
                .remove(&(id.clone(), removed_version.clone()));
        }
        catalog.reindex(&id);

        info!(
            template_id = %id,
            versions = ?removed,
            "template unregistered"
        );
        true
    }

    /// Returns a descriptor; `None` for `version` selects the latest.
    #[must_use]
    pub fn get(&self, template_id: &str, version: Option<&str>) -> Option<TemplateDescriptor> {
        let id = TemplateId::new(template_id).ok()?;
        self.read()
            .entries
            .get(&id)
            .and_then(|entry| entry.resolve(version))
            .cloned()
    }

    /// Lists the latest descriptor of every template, sorted by id.
    ///
    /// With a framework tag, lists templates indexed under that tag, each at
    /// its newest version carrying the tag.
    #[must_use]
    pub fn list(&self, framework_tag: Option<&str>) -> Vec<TemplateDescriptor> {
        let catalog = self.read();
        let mut descriptors: Vec<TemplateDescriptor> = match framework_tag {
            None => catalog
                .entries
                .values()
                .filter_map(CatalogEntry::latest)
                .cloned()
                .collect(),
            Some(raw_tag) => {
                let Ok(tag) = FrameworkTag::new(raw_tag) else {
                    return Vec::new();
                };
                catalog
                    .framework_index
                    .get(&tag)
                    .into_iter()
                    .flatten()
                    .filter_map(|id| catalog.entries.get(id))
                    .filter_map(|entry| {
                        entry
                            .versions
                            .iter()
                            .filter_map(|version| entry.descriptors.get(version))
                            .find(|descriptor| *descriptor.framework_tag() == tag)
                    })
                    .cloned()
                    .collect()
            }
        };
        descriptors.sort_by(|a, b| a.template_id().cmp(b.template_id()));
        descriptors
    }

    /// Returns registered versions of a template, newest first.
    #[must_use]
    pub fn list_versions(&self, template_id: &str) -> Vec<String> {
        let Ok(id) = TemplateId::new(template_id) else {
            return Vec::new();
        };
        self.read()
            .entries
            .get(&id)
            .map(|entry| entry.versions.clone())
            .unwrap_or_default()
    }

    /// Returns versions `>= min_version`, newest first.
    ///
    /// An invalid `min_version` matches nothing.
    #[must_use]
    pub fn compatible_versions(&self, template_id: &str, min_version: &str) -> Vec<String> {
        let Ok(minimum) = parse_version(min_version) else {
            return Vec::new();
        };
        self.list_versions(template_id)
            .into_iter()
            .filter(|version| satisfies_minimum(version, &minimum))
            .collect()
    }

    /// Returns cached metadata; `None` for `version` selects the latest.
    #[must_use]
    pub fn metadata(&self, template_id: &str, version: Option<&str>) -> Option<TemplateMetadata> {
        let id = TemplateId::new(template_id).ok()?;
        let catalog = self.read();
        let resolved = match version {
            Some(requested) => requested.to_owned(),
            None => catalog.entries.get(&id)?.versions.first()?.clone(),
        };
        catalog.metadata_cache.get(&(id, resolved)).cloned()
    }

    /// Returns every registered template id, sorted.
    #[must_use]
    pub fn template_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .read()
            .entries
            .keys()
            .map(|id| id.as_str().to_owned())
            .collect();
        ids.sort();
        ids
    }

    /// Returns framework tags with at least one template, sorted.
    #[must_use]
    pub fn frameworks(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .read()
            .framework_index
            .keys()
            .map(|tag| tag.as_str().to_owned())
            .collect();
        tags.sort();
        tags
    }

    /// Returns the number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    /// Returns whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    /// Produces a snapshot of the latest version of every template.
    #[must_use]
    pub fn generate_schema(&self, limits: CatalogLimits) -> CatalogSchema {
        let templates = {
            let catalog = self.read();
            let mut templates: Vec<TemplateSchemaEntry> = catalog
                .entries
                .values()
                .filter_map(|entry| {
                    let descriptor = entry.latest()?;
                    let metadata = catalog
                        .metadata_cache
                        .get(&(descriptor.template_id().clone(), descriptor.version().to_owned()))
                        .cloned()
                        .unwrap_or_else(|| descriptor.metadata());
                    Some(TemplateSchemaEntry {
                        template_id: descriptor.template_id().as_str().to_owned(),
                        version: descriptor.version().to_owned(),
                        name: descriptor.display_name().to_owned(),
                        description: metadata.description,
                        framework: descriptor.framework_tag().as_str().to_owned(),
                        available_versions: entry.versions.clone(),
                        config_schema: descriptor.config_schema().clone(),
                        runtime_requirements: metadata.runtime_requirements,
                    })
                })
                .collect();
            templates.sort_by(|a, b| a.template_id.cmp(&b.template_id));
            templates
        };

        CatalogSchema {
            templates,
            frameworks: self.frameworks(),
            capabilities: CatalogCapabilities::default(),
            limits,
        }
    }
}

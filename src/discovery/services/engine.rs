//! Discovery engine.
//!
//! Walks every configured location through a [`TemplateSource`], parses the
//! manifest units it finds and resolves their entries against the template
//! library. Failures are contained to the unit or entry that caused them.
//! When a full scan yields nothing, the library's own templates are
//! returned instead.

use crate::discovery::{
    domain::{DiscoveryError, ManifestDocument, SourceUnit},
    ports::TemplateSource,
};
use crate::template::{adapters::TemplateLibrary, domain::TemplateDescriptor};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Callback fired once for every discovered descriptor.
pub type DiscoveryHook = Arc<dyn Fn(&TemplateDescriptor) + Send + Sync>;

/// Scans sources for template manifests.
pub struct DiscoveryEngine<S: TemplateSource> {
    source: S,
    library: TemplateLibrary,
    hooks: RwLock<Vec<DiscoveryHook>>,
    snapshots: Mutex<HashMap<Utf8PathBuf, Option<SystemTime>>>,
}

impl<S: TemplateSource> DiscoveryEngine<S> {
    /// Creates an engine reading from `source` and resolving constructors
    /// through `library`.
    #[must_use]
    pub fn new(source: S, library: TemplateLibrary) -> Self {
        Self {
            source,
            library,
            hooks: RwLock::new(Vec::new()),
            snapshots: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the template library.
    #[must_use]
    pub const fn library(&self) -> &TemplateLibrary {
        &self.library
    }

    /// Registers a callback fired for each discovered descriptor.
    pub fn add_hook(&self, hook: impl Fn(&TemplateDescriptor) + Send + Sync + 'static) {
        self.hooks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(hook));
    }

    /// Returns the number of units seen by previous scans.
    #[must_use]
    pub fn tracked_units(&self) -> usize {
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Scans every location and returns the descriptors found.
    ///
    /// Falls back to the library's templates when the scan finds none.
    pub fn discover(&self, locations: &[Utf8PathBuf]) -> Vec<TemplateDescriptor> {
        let mut descriptors = Vec::new();
        for location in locations {
            let Some(units) = self.list_location(location) else {
                continue;
            };
            for unit in units {
                self.remember(&unit);
                descriptors.extend(self.scan_unit(&unit));
            }
        }

        if descriptors.is_empty() {
            descriptors = self.library.descriptors();
            info!(
                count = descriptors.len(),
                "no manifest templates found, using library templates"
            );
        } else {
            info!(count = descriptors.len(), "discovered manifest templates");
        }

        self.fire_hooks(&descriptors);
        descriptors
    }

    /// Rescans units that are new or whose modification time changed.
    ///
    /// Only descriptors from those units are returned. Units that vanished
    /// are forgotten. The library fallback does not apply.
    pub fn reload(&self, locations: &[Utf8PathBuf]) -> Vec<TemplateDescriptor> {
        let mut descriptors = Vec::new();
        for location in locations {
            let Some(units) = self.list_location(location) else {
                continue;
            };
            self.forget_missing(location, &units);
            for unit in units {
                if self.remember(&unit) {
                    debug!(unit = %unit.path(), "unit changed, rescanning");
                    descriptors.extend(self.scan_unit(&unit));
                }
            }
        }

        if !descriptors.is_empty() {
            info!(count = descriptors.len(), "reloaded templates");
        }
        self.fire_hooks(&descriptors);
        descriptors
    }

    fn list_location(&self, location: &Utf8Path) -> Option<Vec<SourceUnit>> {
        self.source
            .list_units(location)
            .inspect_err(|err| {
                warn!(location = %location, error = %err, "skipping unreadable location");
            })
            .ok()
    }

    /// Records a unit's modification time; returns whether it changed.
    fn remember(&self, unit: &SourceUnit) -> bool {
        let mut snapshots = self
            .snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let previous = snapshots.insert(unit.path().to_owned(), unit.modified());
        previous != Some(unit.modified())
    }

    fn forget_missing(&self, location: &Utf8Path, units: &[SourceUnit]) {
        let mut snapshots = self
            .snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        snapshots.retain(|path, _| {
            !path.starts_with(location) || units.iter().any(|unit| unit.path() == path.as_path())
        });
    }

    fn scan_unit(&self, unit: &SourceUnit) -> Vec<TemplateDescriptor> {
        match self.parse_unit(unit.path()) {
            Ok(descriptors) => descriptors,
            Err(err) => {
                warn!(unit = %unit.path(), error = %err, "skipping manifest unit");
                Vec::new()
            }
        }
    }

    fn parse_unit(&self, path: &Utf8Path) -> Result<Vec<TemplateDescriptor>, DiscoveryError> {
        let contents = self
            .source
            .read_unit(path)
            .map_err(|source| DiscoveryError::Read {
                unit: path.to_owned(),
                source,
            })?;
        let document = ManifestDocument::parse(path, &contents)?;

        let mut descriptors = Vec::new();
        for entry in document.into_entries() {
            match entry.resolve(&self.library, path) {
                Ok(Some(descriptor)) => descriptors.push(descriptor),
                Ok(None) => {
                    debug!(unit = %path, constructor = %entry.constructor, "skipping abstract entry");
                }
                Err(err) => {
                    warn!(unit = %path, error = %err, "skipping manifest entry");
                }
            }
        }
        Ok(descriptors)
    }

    fn fire_hooks(&self, descriptors: &[TemplateDescriptor]) {
        let hooks: Vec<DiscoveryHook> = self
            .hooks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for descriptor in descriptors {
            for hook in &hooks {
                hook(descriptor);
            }
        }
    }
}

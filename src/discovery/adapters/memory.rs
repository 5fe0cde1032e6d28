//! In-memory template source.

use crate::discovery::{domain::SourceUnit, ports::TemplateSource};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeMap;
use std::io;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;

#[derive(Debug, Clone)]
struct StoredUnit {
    contents: String,
    modified: SystemTime,
}

/// Thread-safe in-memory template source.
///
/// Units are addressed by path; a location lists every unit whose path
/// starts with it. Modification times are supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplateSource {
    units: Arc<RwLock<BTreeMap<Utf8PathBuf, StoredUnit>>>,
}

impl InMemoryTemplateSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a unit.
    pub fn insert(
        &self,
        path: impl Into<Utf8PathBuf>,
        contents: impl Into<String>,
        modified: SystemTime,
    ) {
        self.units
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                path.into(),
                StoredUnit {
                    contents: contents.into(),
                    modified,
                },
            );
    }

    /// Removes a unit, returning whether it existed.
    pub fn remove(&self, path: &Utf8Path) -> bool {
        self.units
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path)
            .is_some()
    }
}

impl TemplateSource for InMemoryTemplateSource {
    fn list_units(&self, location: &Utf8Path) -> io::Result<Vec<SourceUnit>> {
        let units = self.units.read().unwrap_or_else(PoisonError::into_inner);
        Ok(units
            .iter()
            .filter(|(path, _)| path.starts_with(location))
            .map(|(path, unit)| SourceUnit::new(path.clone(), Some(unit.modified)))
            .collect())
    }

    fn read_unit(&self, unit: &Utf8Path) -> io::Result<String> {
        self.units
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(unit)
            .map(|stored| stored.contents.clone())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{unit} not found")))
    }
}

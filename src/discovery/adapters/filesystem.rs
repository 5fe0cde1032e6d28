//! Filesystem-backed template source.
//!
//! Directory access goes through `cap-std`, opening each location as an
//! ambient directory and walking it with capability-scoped handles.

use crate::discovery::{
    domain::{DEFAULT_MANIFEST_SUFFIX, SourceUnit},
    ports::TemplateSource,
};
use camino::Utf8Path;
use cap_std::{ambient_authority, fs::Dir};
use std::io;
use tracing::warn;

/// Scans directories for manifest files by suffix.
#[derive(Debug, Clone)]
pub struct FilesystemTemplateSource {
    suffix: String,
}

impl FilesystemTemplateSource {
    /// Creates a source matching files ending in `suffix`.
    #[must_use]
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    /// Returns the manifest suffix.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    fn walk(&self, dir: &Dir, prefix: &Utf8Path, units: &mut Vec<SourceUnit>) -> io::Result<()> {
        for entry in dir.entries()? {
            let entry = entry?;
            let Ok(name) = entry.file_name().into_string() else {
                warn!(location = %prefix, "skipping non UTF-8 entry");
                continue;
            };
            let path = prefix.join(&name);
            let file_type = entry.file_type()?;

            if file_type.is_dir() {
                let nested = entry
                    .open_dir()
                    .and_then(|child| self.walk(&child, &path, units));
                if let Err(err) = nested {
                    warn!(location = %path, error = %err, "skipping unreadable directory");
                }
            } else if file_type.is_file() && name.ends_with(&self.suffix) {
                let modified = entry
                    .metadata()
                    .and_then(|metadata| metadata.modified())
                    .map(cap_std::time::SystemTime::into_std)
                    .ok();
                units.push(SourceUnit::new(path, modified));
            }
        }
        Ok(())
    }
}

impl Default for FilesystemTemplateSource {
    fn default() -> Self {
        Self::new(DEFAULT_MANIFEST_SUFFIX)
    }
}

impl TemplateSource for FilesystemTemplateSource {
    fn list_units(&self, location: &Utf8Path) -> io::Result<Vec<SourceUnit>> {
        let dir = Dir::open_ambient_dir(location, ambient_authority())?;
        let mut units = Vec::new();
        self.walk(&dir, location, &mut units)?;
        units.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(units)
    }

    fn read_unit(&self, unit: &Utf8Path) -> io::Result<String> {
        let parent = unit
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let file_name = unit.file_name().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, format!("{unit} has no file name"))
        })?;
        let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
        dir.read_to_string(file_name)
    }
}

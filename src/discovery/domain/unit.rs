//! A scanned source unit.

use camino::{Utf8Path, Utf8PathBuf};
use std::time::SystemTime;

/// One manifest file found under a source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    path: Utf8PathBuf,
    modified: Option<SystemTime>,
}

impl SourceUnit {
    /// Creates a unit record.
    #[must_use]
    pub const fn new(path: Utf8PathBuf, modified: Option<SystemTime>) -> Self {
        Self { path, modified }
    }

    /// Returns the unit path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Returns the last-modified time, when the source reports one.
    #[must_use]
    pub const fn modified(&self) -> Option<SystemTime> {
        self.modified
    }
}

//! Source of manifest units.

use crate::discovery::domain::SourceUnit;
use camino::Utf8Path;
use std::io;

/// Enumerates and reads manifest units below a location.
pub trait TemplateSource: Send + Sync {
    /// Lists manifest units below `location`, recursively.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the location itself cannot be opened.
    fn list_units(&self, location: &Utf8Path) -> io::Result<Vec<SourceUnit>>;

    /// Reads a unit's contents.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the unit cannot be read.
    fn read_unit(&self, unit: &Utf8Path) -> io::Result<String>;
}

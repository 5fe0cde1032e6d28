//! Manifest format and scanned-unit bookkeeping.

mod error;
mod manifest;
mod unit;

pub use error::DiscoveryError;
pub use manifest::{DEFAULT_MANIFEST_SUFFIX, ManifestDocument, ManifestEntry};
pub use unit::SourceUnit;

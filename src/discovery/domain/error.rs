//! Errors raised while scanning a single unit or manifest entry.

use crate::error::ErrorKind;
use crate::template::domain::TemplateDomainError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Per-unit discovery failure.
///
/// The engine logs these and moves on to the next unit.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The unit could not be read.
    #[error("failed to read {unit}: {source}")]
    Read {
        /// Unit path.
        unit: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The unit is not a valid manifest document.
    #[error("failed to parse {unit}: {source}")]
    Parse {
        /// Unit path.
        unit: Utf8PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The entry names a constructor the library does not know.
    #[error("unknown constructor '{constructor}'")]
    UnknownConstructor {
        /// Constructor name from the manifest.
        constructor: String,
    },

    /// A required descriptor field resolved to an empty value.
    #[error("manifest entry for '{constructor}' has an empty {field}")]
    MissingField {
        /// Constructor name from the manifest.
        constructor: String,
        /// Name of the empty field.
        field: &'static str,
    },

    /// The entry produced an invalid identifier or framework tag.
    #[error(transparent)]
    InvalidDescriptor(#[from] TemplateDomainError),
}

impl DiscoveryError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Read { .. } => ErrorKind::Internal,
            Self::Parse { .. }
            | Self::MissingField { .. }
            | Self::InvalidDescriptor(_) => ErrorKind::Validation,
            Self::UnknownConstructor { .. } => ErrorKind::NotFound,
        }
    }
}

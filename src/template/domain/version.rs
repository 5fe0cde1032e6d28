//! Semantic version parsing and ordering for template versions.
//!
//! Version strings are stored verbatim on descriptors; ordering goes through
//! [`semver::Version`] so that `10.0.0` sorts above `9.0.0` and pre-releases
//! sort below their release.

use super::TemplateDomainError;
use semver::Version;
use std::cmp::Ordering;

/// Parses a semantic version string.
///
/// # Errors
///
/// Returns [`TemplateDomainError::InvalidVersion`] when `raw` is not a valid
/// `major.minor.patch[-pre][+build]` version.
pub fn parse_version(raw: &str) -> Result<Version, TemplateDomainError> {
    Version::parse(raw).map_err(|err| TemplateDomainError::InvalidVersion {
        version: raw.to_owned(),
        reason: err.to_string(),
    })
}

/// Compares two version strings by semantic-version precedence.
///
/// Unparseable strings sort below every valid version and compare
/// lexicographically among themselves.
#[must_use]
pub fn compare_versions(left: &str, right: &str) -> Ordering {
    match (Version::parse(left), Version::parse(right)) {
        (Ok(l), Ok(r)) => l.cmp(&r),
        (Ok(_), Err(_)) => Ordering::Greater,
        (Err(_), Ok(_)) => Ordering::Less,
        (Err(_), Err(_)) => left.cmp(right),
    }
}

/// Sorts version strings in place, newest first.
pub fn sort_descending(versions: &mut [String]) {
    versions.sort_by(|a, b| compare_versions(b, a));
}

/// Returns `true` when `version >= minimum`.
///
/// Non-parseable inputs never satisfy the bound.
#[must_use]
pub fn satisfies_minimum(version: &str, minimum: &Version) -> bool {
    Version::parse(version).is_ok_and(|v| v >= *minimum)
}

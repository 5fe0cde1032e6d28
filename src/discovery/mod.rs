//! Template discovery.
//!
//! Scans configured source locations for template manifests and turns each
//! manifest entry into a [`TemplateDescriptor`](crate::template::domain::TemplateDescriptor).
//! Manifests name a constructor registered in the
//! [`TemplateLibrary`](crate::template::adapters::TemplateLibrary); when no
//! manifest yields a template the library itself is enumerated instead.
//!
//! - Manifest and unit types in [`domain`]
//! - The source contract in [`ports`]
//! - Filesystem and in-memory sources in [`adapters`]
//! - The scanning engine in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;

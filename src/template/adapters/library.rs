//! In-process table of template constructors.
//!
//! Template implementations register here at process start. Manifests found
//! by discovery refer to them by constructor name, and the discovery fallback
//! enumerates them directly when no manifest yields a template.

use super::echo::{ECHO_CONSTRUCTOR, EchoTemplate};
use crate::template::{
    domain::{SourceLocation, TemplateDescriptor, TemplateHandle},
    ports::AgentTemplate,
};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::warn;

/// Errors returned while registering constructors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateLibraryError {
    /// The constructor name is empty after trimming.
    #[error("constructor name must not be empty")]
    EmptyConstructorName,

    /// A constructor with the same name is already registered.
    #[error("constructor '{0}' is already registered")]
    DuplicateConstructor(String),
}

/// Thread-safe registry of template constructors keyed by name.
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    constructors: Arc<RwLock<BTreeMap<String, TemplateHandle>>>,
}

impl TemplateLibrary {
    /// Creates an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a library holding the built-in templates.
    #[must_use]
    pub fn with_builtins() -> Self {
        let library = Self::new();
        let handle = TemplateHandle::from_template(EchoTemplate::default());
        library
            .constructors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(ECHO_CONSTRUCTOR.to_owned(), handle);
        library
    }

    /// Registers an owned template under a constructor name.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateLibraryError`] when the name is blank or taken.
    pub fn register(
        &self,
        constructor: impl Into<String>,
        template: impl AgentTemplate + 'static,
    ) -> Result<TemplateHandle, TemplateLibraryError> {
        self.register_shared(constructor, Arc::new(template))
    }

    /// Registers a shared template under a constructor name.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateLibraryError`] when the name is blank or taken.
    pub fn register_shared(
        &self,
        constructor: impl Into<String>,
        template: Arc<dyn AgentTemplate>,
    ) -> Result<TemplateHandle, TemplateLibraryError> {
        let name = constructor.into().trim().to_owned();
        if name.is_empty() {
            return Err(TemplateLibraryError::EmptyConstructorName);
        }

        let mut constructors = self
            .constructors
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if constructors.contains_key(&name) {
            return Err(TemplateLibraryError::DuplicateConstructor(name));
        }

        let handle = TemplateHandle::new(template);
        constructors.insert(name, handle.clone());
        Ok(handle)
    }

    /// Looks up a constructor by name.
    #[must_use]
    pub fn resolve(&self, constructor: &str) -> Option<TemplateHandle> {
        self.constructors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(constructor.trim())
            .cloned()
    }

    /// Returns registered constructor names in sorted order.
    #[must_use]
    pub fn constructors(&self) -> Vec<String> {
        self.constructors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Returns the number of registered constructors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns whether no constructor is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds a descriptor for every registered constructor.
    ///
    /// Constructors whose self-reported identity is invalid are skipped.
    #[must_use]
    pub fn descriptors(&self) -> Vec<TemplateDescriptor> {
        let handles: Vec<(String, TemplateHandle)> = self
            .constructors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, handle)| (name.clone(), handle.clone()))
            .collect();

        handles
            .into_iter()
            .filter_map(|(name, handle)| {
                TemplateDescriptor::from_template(handle, SourceLocation::Library)
                    .inspect_err(|err| {
                        warn!(constructor = %name, error = %err, "skipping library template");
                    })
                    .ok()
            })
            .collect()
    }
}

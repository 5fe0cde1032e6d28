//! Wiring between discovery and the template registry.

use super::TemplateRegistry;
use crate::discovery::{ports::TemplateSource, services::DiscoveryEngine};
use crate::template::domain::TemplateDescriptor;
use camino::Utf8PathBuf;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

/// Counts produced by a discovery pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Descriptors returned by discovery.
    pub discovered: usize,
    /// Descriptors present in the registry afterwards.
    pub registered: usize,
}

type Loaded = Arc<Mutex<BTreeSet<(String, String)>>>;

/// Feeds discovered descriptors into a [`TemplateRegistry`].
///
/// The manager installs a discovery hook that registers every descriptor the
/// engine reports, and remembers what it loaded so [`Self::unload`] can take
/// it back out.
pub struct TemplateManager<S: TemplateSource> {
    registry: Arc<TemplateRegistry>,
    engine: DiscoveryEngine<S>,
    locations: Vec<Utf8PathBuf>,
    loaded: Loaded,
}

impl<S: TemplateSource> TemplateManager<S> {
    /// Creates a manager and installs its registration hook on `engine`.
    #[must_use]
    pub fn new(
        registry: Arc<TemplateRegistry>,
        engine: DiscoveryEngine<S>,
        locations: Vec<Utf8PathBuf>,
    ) -> Self {
        let loaded = Loaded::default();
        let hook_registry = Arc::clone(&registry);
        let hook_loaded = Arc::clone(&loaded);
        engine.add_hook(move |descriptor| {
            if hook_registry.register(descriptor.clone()) {
                hook_loaded
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert((
                        descriptor.template_id().as_str().to_owned(),
                        descriptor.version().to_owned(),
                    ));
            }
        });

        Self {
            registry,
            engine,
            locations,
            loaded,
        }
    }

    /// Returns the registry being populated.
    #[must_use]
    pub const fn registry(&self) -> &Arc<TemplateRegistry> {
        &self.registry
    }

    /// Returns the configured source locations.
    #[must_use]
    pub fn locations(&self) -> &[Utf8PathBuf] {
        &self.locations
    }

    /// Runs a full discovery pass and registers the results.
    pub fn discover_and_register(&self) -> DiscoveryReport {
        let descriptors = self.engine.discover(&self.locations);
        let report = self.report(&descriptors);
        info!(
            discovered = report.discovered,
            registered = report.registered,
            "template discovery complete"
        );
        report
    }

    /// Rescans changed units and registers their descriptors.
    ///
    /// A changed unit that now declares an existing version with a different
    /// implementation is rejected by the registry; unregister the old version
    /// first to replace it.
    pub fn reload(&self) -> DiscoveryReport {
        let descriptors = self.engine.reload(&self.locations);
        self.report(&descriptors)
    }

    /// Unregisters every template version this manager loaded.
    ///
    /// Returns how many versions were removed.
    pub fn unload(&self) -> usize {
        let loaded = std::mem::take(
            &mut *self
                .loaded
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        let removed = loaded
            .iter()
            .filter(|(template_id, version)| self.registry.unregister(template_id, Some(version)))
            .count();
        info!(removed, "templates unloaded");
        removed
    }

    fn report(&self, descriptors: &[TemplateDescriptor]) -> DiscoveryReport {
        let registered = descriptors
            .iter()
            .filter(|descriptor| {
                self.registry
                    .get(descriptor.template_id().as_str(), Some(descriptor.version()))
                    .is_some_and(|stored| {
                        stored
                            .capability_handle()
                            .same_as(descriptor.capability_handle())
                    })
            })
            .count();
        DiscoveryReport {
            discovered: descriptors.len(),
            registered,
        }
    }
}

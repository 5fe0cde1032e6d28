//! Process-wide runtime context.
//!
//! [`Runtime`] owns one of each component, wired together from a
//! [`RuntimeConfig`]: the template library, the registry, the discovery
//! manager, the agent factory and the agent scheduler.

use crate::agent::services::{AgentFactory, AgentScheduler};
use crate::config::RuntimeConfig;
use crate::discovery::{adapters::FilesystemTemplateSource, services::DiscoveryEngine};
use crate::template::{
    adapters::TemplateLibrary,
    domain::CatalogSchema,
    services::{DiscoveryReport, TemplateManager, TemplateRegistry},
};
use mockable::{Clock, DefaultClock};
use std::sync::Arc;
use tracing::info;

/// Owns and wires the runtime components.
pub struct Runtime<C = DefaultClock>
where
    C: Clock + Send + Sync + 'static,
{
    config: RuntimeConfig,
    library: TemplateLibrary,
    registry: Arc<TemplateRegistry>,
    manager: TemplateManager<FilesystemTemplateSource>,
    factory: Arc<AgentFactory<C>>,
    scheduler: Arc<AgentScheduler<C>>,
}

impl Runtime<DefaultClock> {
    /// Builds a runtime on the system clock.
    #[must_use]
    pub fn new(config: RuntimeConfig, library: TemplateLibrary) -> Self {
        Self::with_clock(config, library, Arc::new(DefaultClock))
    }
}

impl<C> Runtime<C>
where
    C: Clock + Send + Sync + 'static,
{
    /// Builds a runtime on the given clock.
    #[must_use]
    pub fn with_clock(config: RuntimeConfig, library: TemplateLibrary, clock: Arc<C>) -> Self {
        let registry = Arc::new(TemplateRegistry::new());
        let source = FilesystemTemplateSource::new(config.discovery.manifest_suffix.clone());
        let engine = DiscoveryEngine::new(source, library.clone());
        let manager = TemplateManager::new(
            Arc::clone(&registry),
            engine,
            config.discovery.source_locations.clone(),
        );
        let factory = Arc::new(AgentFactory::new(Arc::clone(&registry), Arc::clone(&clock)));
        let scheduler = Arc::new(AgentScheduler::new(
            Arc::clone(&factory),
            clock,
            config.scheduler,
        ));

        Self {
            config,
            library,
            registry,
            manager,
            factory,
            scheduler,
        }
    }

    /// Discovers templates and starts the scheduler loops.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn init(&self) -> DiscoveryReport {
        let report = self.manager.discover_and_register();
        self.scheduler.start();
        info!(
            templates = self.registry.len(),
            frameworks = ?self.registry.frameworks(),
            "runtime initialised"
        );
        report
    }

    /// Stops the scheduler and destroys every tracked agent.
    pub async fn shutdown(&self) {
        self.scheduler.stop().await;
        info!("runtime shut down");
    }

    /// Rescans changed manifest units.
    pub fn reload_templates(&self) -> DiscoveryReport {
        self.manager.reload()
    }

    /// Returns the catalog snapshot with the scheduler's limits.
    #[must_use]
    pub fn catalog_schema(&self) -> CatalogSchema {
        self.registry
            .generate_schema(self.config.scheduler.limits())
    }

    /// Returns the configuration the runtime was built from.
    #[must_use]
    pub const fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Returns the template library.
    #[must_use]
    pub const fn library(&self) -> &TemplateLibrary {
        &self.library
    }

    /// Returns the template registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<TemplateRegistry> {
        &self.registry
    }

    /// Returns the agent factory.
    #[must_use]
    pub const fn factory(&self) -> &Arc<AgentFactory<C>> {
        &self.factory
    }

    /// Returns the agent scheduler.
    #[must_use]
    pub const fn scheduler(&self) -> &Arc<AgentScheduler<C>> {
        &self.scheduler
    }
}

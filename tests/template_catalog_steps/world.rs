//! Shared world state for template catalog BDD scenarios.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use atelier::discovery::{adapters::InMemoryTemplateSource, services::DiscoveryEngine};
use atelier::template::{
    adapters::TemplateLibrary,
    services::{DiscoveryReport, TemplateManager, TemplateRegistry},
};
use camino::{Utf8Path, Utf8PathBuf};
use rstest::fixture;

/// Location every scenario manifest is written under.
pub const ROOT: &str = "/catalog";

/// Scenario world for template catalog behaviour tests.
pub struct CatalogWorld {
    /// Manifest units visible to discovery.
    pub source: InMemoryTemplateSource,
    /// The registry under test.
    pub registry: Arc<TemplateRegistry>,
    /// Discovery-to-registry wiring.
    pub manager: TemplateManager<InMemoryTemplateSource>,
    /// Report of the last discovery or reload.
    pub last_report: Option<DiscoveryReport>,
    /// Modification counter handed to inserted units.
    pub revision: u64,
}

impl CatalogWorld {
    /// Creates a world with no manifests and the built-in library.
    #[must_use]
    pub fn new() -> Self {
        let source = InMemoryTemplateSource::new();
        let registry = Arc::new(TemplateRegistry::new());
        let engine = DiscoveryEngine::new(source.clone(), TemplateLibrary::with_builtins());
        let manager = TemplateManager::new(
            Arc::clone(&registry),
            engine,
            vec![Utf8PathBuf::from(ROOT)],
        );
        Self {
            source,
            registry,
            manager,
            last_report: None,
            revision: 0,
        }
    }

    /// Writes a manifest unit with a fresh modification time.
    pub fn write_manifest(&mut self, file_name: &str, contents: String) {
        self.revision += 1;
        let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(self.revision);
        self.source
            .insert(Utf8Path::new(ROOT).join(file_name), contents, modified);
    }
}

impl Default for CatalogWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> CatalogWorld {
    CatalogWorld::default()
}

/// Builds a manifest declaring an echo-backed template.
pub fn echo_manifest(template_id: &str, version: &str) -> String {
    serde_json::json!({
        "constructor": "echo",
        "template_id": template_id,
        "version": version,
    })
    .to_string()
}

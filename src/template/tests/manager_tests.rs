//! Unit tests for discovery-to-registry wiring.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::discovery::{
    adapters::{FilesystemTemplateSource, InMemoryTemplateSource},
    services::DiscoveryEngine,
};
use crate::template::{
    adapters::{EchoTemplate, TemplateLibrary},
    domain::{SourceLocation, TemplateDescriptor, TemplateHandle},
    services::{DiscoveryReport, TemplateManager, TemplateRegistry},
};
use camino::Utf8PathBuf;
use rstest::{fixture, rstest};

const ROOT: &str = "/templates";

fn library() -> TemplateLibrary {
    let library = TemplateLibrary::with_builtins();
    library
        .register("writer", EchoTemplate::new("writer", "1.0.0").with_name("Writer"))
        .expect("writer constructor should register");
    library
}

struct Harness {
    source: InMemoryTemplateSource,
    registry: Arc<TemplateRegistry>,
    manager: TemplateManager<InMemoryTemplateSource>,
}

#[fixture]
fn harness() -> Harness {
    let source = InMemoryTemplateSource::new();
    let registry = Arc::new(TemplateRegistry::new());
    let engine = DiscoveryEngine::new(source.clone(), library());
    let manager = TemplateManager::new(
        Arc::clone(&registry),
        engine,
        vec![Utf8PathBuf::from(ROOT)],
    );
    Harness {
        source,
        registry,
        manager,
    }
}

fn at(secs: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
}

#[rstest]
fn discovered_manifests_are_registered(harness: Harness) {
    harness.source.insert(
        "/templates/writer.template.json",
        r#"{"templates": [
            {"constructor": "writer"},
            {"constructor": "writer", "version": "2.0.0"}
        ]}"#,
        at(1),
    );

    let report = harness.manager.discover_and_register();

    assert_eq!(
        report,
        DiscoveryReport {
            discovered: 2,
            registered: 2
        }
    );
    assert_eq!(harness.registry.list_versions("writer"), ["2.0.0", "1.0.0"]);
    let latest = harness.registry.get("writer", None).expect("writer latest");
    assert_eq!(
        latest.source_location(),
        &SourceLocation::Manifest(Utf8PathBuf::from("/templates/writer.template.json"))
    );
}

#[rstest]
fn empty_locations_fall_back_to_the_library(harness: Harness) {
    let report = harness.manager.discover_and_register();

    assert_eq!(report.discovered, 2);
    assert_eq!(report.registered, 2);
    assert_eq!(harness.registry.template_ids(), ["echo", "writer"]);
}

#[test]
fn unreachable_location_falls_back_to_the_library() {
    let temp = tempfile::tempdir().expect("temp dir");
    let missing = Utf8PathBuf::from_path_buf(temp.path().join("missing"))
        .expect("temp dir should be UTF-8");
    let registry = Arc::new(TemplateRegistry::new());
    let engine = DiscoveryEngine::new(FilesystemTemplateSource::default(), library());
    let manager = TemplateManager::new(Arc::clone(&registry), engine, vec![missing]);

    let report = manager.discover_and_register();

    assert_eq!(report.registered, 2);
    let echo = registry.get("echo", None).expect("echo should be registered");
    assert_eq!(echo.source_location(), &SourceLocation::Library);
}

#[rstest]
fn reload_registers_only_changed_units(harness: Harness) {
    harness.source.insert(
        "/templates/a.template.json",
        r#"{"constructor": "writer", "template_id": "a"}"#,
        at(1),
    );
    harness.source.insert(
        "/templates/b.template.json",
        r#"{"constructor": "writer", "template_id": "b"}"#,
        at(1),
    );
    harness.manager.discover_and_register();

    harness.source.insert(
        "/templates/b.template.json",
        r#"{"constructor": "writer", "template_id": "b", "version": "1.1.0"}"#,
        at(2),
    );
    let report = harness.manager.reload();

    assert_eq!(report.discovered, 1);
    assert_eq!(report.registered, 1);
    assert_eq!(harness.registry.list_versions("b"), ["1.1.0", "1.0.0"]);
    assert_eq!(harness.registry.list_versions("a"), ["1.0.0"]);
}

#[rstest]
fn unload_removes_what_was_loaded(harness: Harness) {
    harness.source.insert(
        "/templates/writer.template.json",
        r#"{"constructor": "writer"}"#,
        at(1),
    );
    harness.manager.discover_and_register();
    let manual = TemplateDescriptor::from_template(
        TemplateHandle::from_template(EchoTemplate::new("manual", "1.0.0")),
        SourceLocation::Library,
    )
    .expect("manual descriptor");
    harness.registry.register(manual);

    let removed = harness.manager.unload();

    assert_eq!(removed, 1);
    assert_eq!(harness.registry.template_ids(), ["manual"]);
}

//! Unit tests for the discovery engine.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use crate::discovery::{adapters::InMemoryTemplateSource, services::DiscoveryEngine};
use crate::template::{
    adapters::{EchoTemplate, TemplateLibrary},
    domain::{SourceLocation, TemplateDescriptor},
};
use camino::{Utf8Path, Utf8PathBuf};
use rstest::{fixture, rstest};

struct Harness {
    source: InMemoryTemplateSource,
    engine: DiscoveryEngine<InMemoryTemplateSource>,
    locations: Vec<Utf8PathBuf>,
}

#[fixture]
fn harness() -> Harness {
    let library = TemplateLibrary::with_builtins();
    library
        .register("planner", EchoTemplate::new("planner", "3.0.0"))
        .expect("planner should register");
    let source = InMemoryTemplateSource::new();
    let engine = DiscoveryEngine::new(source.clone(), library);
    Harness {
        source,
        engine,
        locations: vec![Utf8PathBuf::from("/srv/a"), Utf8PathBuf::from("/srv/b")],
    }
}

fn at(secs: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
}

fn ids(descriptors: &[TemplateDescriptor]) -> Vec<String> {
    let mut labels: Vec<String> = descriptors
        .iter()
        .map(|d| format!("{}@{}", d.template_id(), d.version()))
        .collect();
    labels.sort();
    labels
}

#[rstest]
fn scans_every_location(harness: Harness) {
    harness
        .source
        .insert("/srv/a/one.template.json", r#"{"constructor": "echo"}"#, at(1));
    harness.source.insert(
        "/srv/b/nested/two.template.json",
        r#"{"constructor": "planner"}"#,
        at(1),
    );

    let found = harness.engine.discover(&harness.locations);

    assert_eq!(ids(&found), ["echo@1.0.0", "planner@3.0.0"]);
    assert_eq!(harness.engine.tracked_units(), 2);
}

#[rstest]
fn bad_units_do_not_stop_the_scan(harness: Harness) {
    harness
        .source
        .insert("/srv/a/broken.template.json", "{ not json", at(1));
    harness.source.insert(
        "/srv/a/unknown.template.json",
        r#"{"constructor": "ghost"}"#,
        at(1),
    );
    harness.source.insert(
        "/srv/b/good.template.json",
        r#"{"templates": [{"constructor": "ghost"}, {"constructor": "planner"}]}"#,
        at(1),
    );

    let found = harness.engine.discover(&harness.locations);

    assert_eq!(ids(&found), ["planner@3.0.0"]);
    assert!(
        found
            .iter()
            .all(|d| matches!(d.source_location(), SourceLocation::Manifest(_)))
    );
}

#[rstest]
fn library_fallback_applies_when_nothing_is_found(harness: Harness) {
    harness.source.insert(
        "/srv/a/only-abstract.template.json",
        r#"{"constructor": "echo", "abstract": true}"#,
        at(1),
    );

    let found = harness.engine.discover(&harness.locations);

    assert_eq!(ids(&found), ["echo@1.0.0", "planner@3.0.0"]);
    assert!(
        found
            .iter()
            .all(|d| d.source_location() == &SourceLocation::Library)
    );
}

#[rstest]
fn hooks_fire_once_per_descriptor(harness: Harness) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let calls = Arc::new(AtomicUsize::new(0));
    let hook_seen = Arc::clone(&seen);
    let hook_calls = Arc::clone(&calls);
    harness.engine.add_hook(move |descriptor| {
        hook_calls.fetch_add(1, Ordering::SeqCst);
        hook_seen
            .lock()
            .expect("hook lock")
            .push(descriptor.template_id().as_str().to_owned());
    });
    harness
        .source
        .insert("/srv/a/one.template.json", r#"{"constructor": "planner"}"#, at(1));

    harness.engine.discover(&harness.locations);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(*seen.lock().expect("hook lock"), ["planner"]);
}

#[rstest]
fn reload_rescans_only_changed_or_new_units(harness: Harness) {
    harness
        .source
        .insert("/srv/a/one.template.json", r#"{"constructor": "echo"}"#, at(1));
    harness
        .source
        .insert("/srv/b/two.template.json", r#"{"constructor": "planner"}"#, at(1));
    harness.engine.discover(&harness.locations);

    assert!(harness.engine.reload(&harness.locations).is_empty());

    harness.source.insert(
        "/srv/a/one.template.json",
        r#"{"constructor": "echo", "version": "1.1.0"}"#,
        at(2),
    );
    harness.source.insert(
        "/srv/b/three.template.json",
        r#"{"constructor": "planner", "template_id": "planner-lite"}"#,
        at(1),
    );

    let reloaded = harness.engine.reload(&harness.locations);

    assert_eq!(ids(&reloaded), ["echo@1.1.0", "planner-lite@3.0.0"]);
}

#[rstest]
fn reload_forgets_removed_units(harness: Harness) {
    harness
        .source
        .insert("/srv/a/one.template.json", r#"{"constructor": "echo"}"#, at(1));
    harness.engine.discover(&harness.locations);
    assert!(harness.source.remove(Utf8Path::new("/srv/a/one.template.json")));

    let reloaded = harness.engine.reload(&harness.locations);

    assert!(reloaded.is_empty());
    assert_eq!(harness.engine.tracked_units(), 0);
}

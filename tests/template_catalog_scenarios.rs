//! Behaviour tests for template discovery and cataloguing.

mod template_catalog_steps;

use rstest_bdd_macros::scenario;
use template_catalog_steps::world::{CatalogWorld, world};

#[scenario(
    path = "tests/features/template_catalog.feature",
    name = "Discover several versions of one template"
)]
#[tokio::test(flavor = "multi_thread")]
async fn discover_several_versions(world: CatalogWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/template_catalog.feature",
    name = "Fall back to the built-in library"
)]
#[tokio::test(flavor = "multi_thread")]
async fn fall_back_to_library(world: CatalogWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/template_catalog.feature",
    name = "A malformed manifest does not abort discovery"
)]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_manifest_is_skipped(world: CatalogWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/template_catalog.feature",
    name = "Reload picks up a changed manifest"
)]
#[tokio::test(flavor = "multi_thread")]
async fn reload_picks_up_changes(world: CatalogWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/template_catalog.feature",
    name = "Unloading removes discovered templates"
)]
#[tokio::test(flavor = "multi_thread")]
async fn unload_removes_templates(world: CatalogWorld) {
    let _ = world;
}

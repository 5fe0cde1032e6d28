//! When steps for template catalog BDD scenarios.

use super::world::{CatalogWorld, echo_manifest};
use rstest_bdd_macros::when;

#[when("templates are discovered")]
fn templates_are_discovered(world: &mut CatalogWorld) {
    world.last_report = Some(world.manager.discover_and_register());
}

#[when(r#"the manifest "{file}" is changed to declare "{template_id}" version "{version}""#)]
fn manifest_is_changed(world: &mut CatalogWorld, file: String, template_id: String, version: String) {
    world.write_manifest(&file, echo_manifest(&template_id, &version));
}

#[when("templates are reloaded")]
fn templates_are_reloaded(world: &mut CatalogWorld) {
    world.last_report = Some(world.manager.reload());
}

#[when("discovered templates are unloaded")]
fn templates_are_unloaded(world: &mut CatalogWorld) -> Result<(), eyre::Report> {
    let removed = world.manager.unload();
    if removed == 0 {
        return Err(eyre::eyre!("expected unload to remove templates"));
    }
    Ok(())
}

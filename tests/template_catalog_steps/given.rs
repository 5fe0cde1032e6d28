//! Given steps for template catalog BDD scenarios.

use super::world::{CatalogWorld, echo_manifest};
use rstest_bdd_macros::given;

#[given(r#"a manifest "{file}" declaring "{template_id}" version "{version}""#)]
fn a_manifest_declaring(
    world: &mut CatalogWorld,
    file: String,
    template_id: String,
    version: String,
) {
    world.write_manifest(&file, echo_manifest(&template_id, &version));
}

#[given(r#"a manifest "{file}" containing "{contents}""#)]
fn a_manifest_containing(world: &mut CatalogWorld, file: String, contents: String) {
    world.write_manifest(&file, contents);
}

#[given("templates have been discovered")]
fn templates_have_been_discovered(world: &mut CatalogWorld) -> Result<(), eyre::Report> {
    let report = world.manager.discover_and_register();
    if report.registered == 0 {
        return Err(eyre::eyre!("expected discovery to register templates"));
    }
    world.last_report = Some(report);
    Ok(())
}

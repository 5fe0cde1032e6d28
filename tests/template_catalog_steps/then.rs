//! Then steps for template catalog BDD scenarios.

use super::world::CatalogWorld;
use rstest_bdd_macros::then;

#[then(r#"the catalog lists versions "{versions}" of "{template_id}""#)]
fn catalog_lists_versions(
    world: &CatalogWorld,
    versions: String,
    template_id: String,
) -> Result<(), eyre::Report> {
    let expected: Vec<&str> = versions.split(", ").collect();
    let listed = world.registry.list_versions(&template_id);
    if listed != expected {
        return Err(eyre::eyre!(
            "expected versions {expected:?} of '{template_id}', found {listed:?}"
        ));
    }
    Ok(())
}

#[then(r#"the latest version of "{template_id}" is "{version}""#)]
fn latest_version_is(
    world: &CatalogWorld,
    template_id: String,
    version: String,
) -> Result<(), eyre::Report> {
    let latest = world
        .registry
        .get(&template_id, None)
        .ok_or_else(|| eyre::eyre!("expected '{template_id}' to be registered"))?;
    if latest.version() != version {
        return Err(eyre::eyre!(
            "expected latest '{template_id}' to be {version}, found {}",
            latest.version()
        ));
    }
    Ok(())
}

#[then(r#"the catalog contains "{template_id}""#)]
fn catalog_contains(world: &CatalogWorld, template_id: String) -> Result<(), eyre::Report> {
    if world.registry.get(&template_id, None).is_none() {
        return Err(eyre::eyre!("expected '{template_id}' in the catalog"));
    }
    Ok(())
}

#[then("the catalog size is {count:usize}")]
fn catalog_size_is(world: &CatalogWorld, count: usize) -> Result<(), eyre::Report> {
    let ids = world.registry.template_ids();
    if ids.len() != count {
        return Err(eyre::eyre!(
            "expected {count} catalogued templates, found {ids:?}"
        ));
    }
    Ok(())
}

#[then("the last pass registered {count:usize} templates")]
fn last_pass_registered(world: &CatalogWorld, count: usize) -> Result<(), eyre::Report> {
    let report = world
        .last_report
        .ok_or_else(|| eyre::eyre!("no discovery report in scenario world"))?;
    if report.registered != count {
        return Err(eyre::eyre!(
            "expected {count} registrations, report was {report:?}"
        ));
    }
    Ok(())
}

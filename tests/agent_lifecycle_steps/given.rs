//! Given steps for agent lifecycle BDD scenarios.

use super::world::LifecycleWorld;
use atelier::agent::domain::TaskStatus;
use rstest_bdd_macros::given;

#[given("a scheduler allowing {limit:usize} agents")]
fn a_scheduler_allowing(world: &mut LifecycleWorld, limit: usize) {
    *world = LifecycleWorld::with_limit(limit);
}

#[given(r#"agent "{agent_id}" has been created"#)]
fn agent_has_been_created(world: &mut LifecycleWorld, agent_id: String) -> Result<(), eyre::Report> {
    world.create(&agent_id, "echo")?;
    let status = world.last_task.as_ref().map(|task| task.status());
    if status != Some(TaskStatus::Completed) {
        return Err(eyre::eyre!(
            "expected creation of '{agent_id}' to complete, got {status:?}"
        ));
    }
    Ok(())
}

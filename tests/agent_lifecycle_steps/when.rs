//! When steps for agent lifecycle BDD scenarios.

use super::world::{LifecycleWorld, parse_agent_id, run_async};
use rstest_bdd_macros::when;
use serde_json::Value;

#[when(r#"agent "{agent_id}" is scheduled from template "{template_id}""#)]
fn agent_is_scheduled(
    world: &mut LifecycleWorld,
    agent_id: String,
    template_id: String,
) -> Result<(), eyre::Report> {
    world.create(&agent_id, &template_id)
}

#[when(r#"agent "{agent_id}" is deleted"#)]
fn agent_is_deleted(world: &mut LifecycleWorld, agent_id: String) -> Result<(), eyre::Report> {
    let id = parse_agent_id(&agent_id)?;
    let scheduled = world
        .scheduler
        .schedule_agent_deletion(&id)
        .map_err(|err| eyre::eyre!("deletion was rejected: {err}"))?;
    if !scheduled {
        return Err(eyre::eyre!("agent '{agent_id}' was not tracked"));
    }
    world.await_deletion(&id)
}

#[when(r#"agent "{agent_id}" executes "{input}""#)]
fn agent_executes(
    world: &mut LifecycleWorld,
    agent_id: String,
    input: String,
) -> Result<(), eyre::Report> {
    let id = parse_agent_id(&agent_id)?;
    let output = run_async(world.scheduler.factory().execute_agent(&id, Value::String(input)))
        .map_err(|err| eyre::eyre!("execution failed: {err}"))?;
    world.last_output = Some(output);
    Ok(())
}

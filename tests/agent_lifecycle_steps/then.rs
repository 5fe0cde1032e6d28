//! Then steps for agent lifecycle BDD scenarios.

use super::world::{LifecycleWorld, parse_agent_id};
use atelier::agent::{domain::AgentStatus, services::SchedulerError};
use rstest_bdd_macros::then;
use serde_json::json;

#[then(r#"agent "{agent_id}" is "{status}""#)]
fn agent_has_status(
    world: &LifecycleWorld,
    agent_id: String,
    status: String,
) -> Result<(), eyre::Report> {
    let expected = AgentStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("unknown status in scenario: {err}"))?;
    let actual = world.scheduler.get_agent_status(&parse_agent_id(&agent_id)?);
    if actual != Some(expected) {
        return Err(eyre::eyre!(
            "expected '{agent_id}' to be {expected}, found {actual:?}"
        ));
    }
    Ok(())
}

#[then(r#"agent "{agent_id}" is not tracked"#)]
fn agent_is_not_tracked(world: &LifecycleWorld, agent_id: String) -> Result<(), eyre::Report> {
    let id = parse_agent_id(&agent_id)?;
    if let Some(status) = world.scheduler.get_agent_status(&id) {
        return Err(eyre::eyre!("expected '{agent_id}' to be untracked, found {status}"));
    }
    if world.scheduler.factory().contains(&id) {
        return Err(eyre::eyre!("expected no live instance for '{agent_id}'"));
    }
    Ok(())
}

#[then(r#"the last task "{status}""#)]
fn last_task_status(world: &LifecycleWorld, status: String) -> Result<(), eyre::Report> {
    let task = world
        .last_task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no awaited task in scenario world"))?;
    if task.status().as_str() != status {
        return Err(eyre::eyre!(
            "expected the last task to be {status}, found {}",
            task.status()
        ));
    }
    Ok(())
}

#[then(r#"the last task error mentions "{text}""#)]
fn last_task_error_mentions(world: &LifecycleWorld, text: String) -> Result<(), eyre::Report> {
    let error = world
        .last_task
        .as_ref()
        .and_then(|task| task.error())
        .ok_or_else(|| eyre::eyre!("the last task carries no error"))?;
    if !error.contains(&text) {
        return Err(eyre::eyre!("expected error to mention '{text}', got '{error}'"));
    }
    Ok(())
}

#[then("scheduling fails because the agent limit is reached")]
fn scheduling_hits_the_limit(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_schedule_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing scheduling result in scenario world"))?;
    if !matches!(result, Err(SchedulerError::ResourceExhausted { .. })) {
        return Err(eyre::eyre!("expected resource exhaustion, got {result:?}"));
    }
    Ok(())
}

#[then(r#"the output is "{text}""#)]
fn output_is(world: &LifecycleWorld, text: String) -> Result<(), eyre::Report> {
    let expected = json!({"output": text});
    if world.last_output.as_ref() != Some(&expected) {
        return Err(eyre::eyre!(
            "expected output {expected}, found {:?}",
            world.last_output
        ));
    }
    Ok(())
}

#[then("the factory has recorded {count:u64} executions")]
fn factory_recorded_executions(world: &LifecycleWorld, count: u64) -> Result<(), eyre::Report> {
    let stats = world.scheduler.factory().get_stats();
    if stats.total_executions != count {
        return Err(eyre::eyre!(
            "expected {count} executions, found {}",
            stats.total_executions
        ));
    }
    Ok(())
}

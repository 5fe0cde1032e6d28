//! Shared world state for agent lifecycle BDD scenarios.

use std::sync::Arc;

use atelier::agent::{
    domain::{AgentId, AgentSpec, ScheduledTask, TaskId, TaskKind},
    services::{AgentFactory, AgentScheduler, SchedulerError},
};
use atelier::config::SchedulerConfig;
use atelier::template::{
    adapters::EchoTemplate,
    domain::{SourceLocation, TemplateDescriptor, TemplateHandle},
    services::TemplateRegistry,
};
use eyre::WrapErr;
use mockable::DefaultClock;
use rstest::fixture;
use serde_json::Value;

/// Scheduler type used by the BDD world.
pub type TestScheduler = AgentScheduler<DefaultClock>;

/// Scenario world for agent lifecycle behaviour tests.
pub struct LifecycleWorld {
    /// The scheduler under test.
    pub scheduler: Arc<TestScheduler>,
    /// Result of the last creation request.
    pub last_schedule_result: Option<Result<TaskId, SchedulerError>>,
    /// Terminal record of the last awaited task.
    pub last_task: Option<ScheduledTask>,
    /// Output of the last execution.
    pub last_output: Option<Value>,
}

impl LifecycleWorld {
    /// Creates a world whose scheduler admits `max_agents` agents.
    #[must_use]
    pub fn with_limit(max_agents: usize) -> Self {
        Self {
            scheduler: build_scheduler(max_agents),
            last_schedule_result: None,
            last_task: None,
            last_output: None,
        }
    }

    /// Schedules creation and waits for the task to settle.
    pub fn create(&mut self, raw_id: &str, template_id: &str) -> Result<(), eyre::Report> {
        let spec = AgentSpec::new(parse_agent_id(raw_id)?, template_id);
        let result = self.scheduler.schedule_agent_creation(spec);
        if let Ok(task_id) = &result {
            self.last_task = run_async(self.scheduler.wait_for_task(*task_id));
        }
        self.last_schedule_result = Some(result);
        Ok(())
    }

    /// Waits for the newest deletion task of `agent_id`.
    pub fn await_deletion(&mut self, agent_id: &AgentId) -> Result<(), eyre::Report> {
        let task = self
            .scheduler
            .list_scheduled_tasks()
            .into_iter()
            .rev()
            .find(|task| task.kind() == TaskKind::Delete && task.agent_id() == agent_id)
            .ok_or_else(|| eyre::eyre!("no deletion task for {agent_id}"))?;
        self.last_task = run_async(self.scheduler.wait_for_task(task.task_id()));
        Ok(())
    }
}

impl Default for LifecycleWorld {
    fn default() -> Self {
        Self::with_limit(SchedulerConfig::DEFAULT_MAX_CONCURRENT_AGENTS)
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> LifecycleWorld {
    LifecycleWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Parses an agent id from step text.
pub fn parse_agent_id(raw: &str) -> Result<AgentId, eyre::Report> {
    AgentId::new(raw).wrap_err_with(|| format!("invalid agent id '{raw}'"))
}

fn build_scheduler(max_agents: usize) -> Arc<TestScheduler> {
    let registry = Arc::new(TemplateRegistry::new());
    let handle = TemplateHandle::from_template(EchoTemplate::default());
    if let Ok(descriptor) = TemplateDescriptor::from_template(handle, SourceLocation::Library) {
        registry.register(descriptor);
    }
    let clock = Arc::new(DefaultClock);
    let factory = Arc::new(AgentFactory::new(registry, Arc::clone(&clock)));
    Arc::new(AgentScheduler::new(
        factory,
        clock,
        SchedulerConfig::default().with_max_concurrent_agents(max_agents),
    ))
}

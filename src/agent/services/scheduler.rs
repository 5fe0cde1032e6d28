//! Agent scheduler.
//!
//! Wraps factory creation and deletion in tracked background tasks and owns
//! the agent lifecycle state machine. Admission against the concurrency
//! ceiling and the `Creating` insertion happen in one critical section, so
//! concurrent requests cannot overshoot the ceiling.
//!
//! Two background loops run between [`AgentScheduler::start`] and
//! [`AgentScheduler::stop`]: a cleanup loop evicting idle agents and pruning
//! old tasks, and a monitoring loop logging statistics.

use super::{AgentFactory, FactoryError};
use crate::agent::domain::{
    AgentDomainError, AgentId, AgentInstanceRecord, AgentSpec, AgentStatus, ScheduledTask, TaskId,
    TaskKind, TaskStatus,
};
use crate::config::SchedulerConfig;
use crate::error::ErrorKind;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

/// Service-level errors for scheduler operations.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The concurrency ceiling is reached.
    #[error("agent limit reached: {tracked} of {limit} slots in use")]
    ResourceExhausted {
        /// Configured ceiling.
        limit: usize,
        /// Agents tracked when the request arrived.
        tracked: usize,
    },

    /// The agent id is already tracked.
    #[error("agent {0} is already scheduled")]
    Conflict(AgentId),

    /// The agent is not tracked.
    #[error("agent {0} is not tracked")]
    NotFound(AgentId),

    /// Domain validation failed, including invalid lifecycle transitions.
    #[error(transparent)]
    Domain(#[from] AgentDomainError),

    /// A factory operation failed.
    #[error(transparent)]
    Factory(#[from] FactoryError),
}

impl SchedulerError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ResourceExhausted { .. } => ErrorKind::ResourceExhausted,
            Self::Conflict(_) | Self::Domain(AgentDomainError::InvalidTransition { .. }) => {
                ErrorKind::Conflict
            }
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Domain(_) => ErrorKind::Validation,
            Self::Factory(err) => err.kind(),
        }
    }
}

/// Result type for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Counts derived from the scheduler's tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    /// Agents tracked in any status.
    pub tracked_agents: usize,
    /// Tracked agents per status.
    pub agents_by_status: BTreeMap<AgentStatus, usize>,
    /// Task records held.
    pub total_tasks: usize,
    /// Task records per status.
    pub tasks_by_status: BTreeMap<TaskStatus, usize>,
    /// Whether the background loops are running.
    pub running: bool,
}

/// Slot usage against the concurrency ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceUsage {
    /// Agents tracked in any status.
    pub tracked_agents: usize,
    /// Configured ceiling.
    pub max_concurrent_agents: usize,
    /// Remaining admission slots.
    pub available_slots: usize,
}

impl ResourceUsage {
    /// Returns whether new creations would be rejected.
    #[must_use]
    pub const fn at_capacity(&self) -> bool {
        self.available_slots == 0
    }
}

#[derive(Debug, Clone, Copy)]
struct TrackedAgent {
    status: AgentStatus,
    last_activity: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct SchedulerState {
    agents: HashMap<AgentId, TrackedAgent>,
    tasks: HashMap<TaskId, ScheduledTask>,
}

struct BackgroundLoops {
    shutdown: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

const MIN_LOOP_PERIOD: Duration = Duration::from_millis(10);

/// Schedules agent creation and deletion as tracked background tasks.
///
/// Operations that spawn work take `self: &Arc<Self>` and must be called
/// from within a Tokio runtime.
pub struct AgentScheduler<C>
where
    C: Clock + Send + Sync + 'static,
{
    factory: Arc<AgentFactory<C>>,
    clock: Arc<C>,
    config: SchedulerConfig,
    state: Mutex<SchedulerState>,
    task_events: Notify,
    tracker: TaskTracker,
    loops: Mutex<Option<BackgroundLoops>>,
}

impl<C> AgentScheduler<C>
where
    C: Clock + Send + Sync + 'static,
{
    /// Creates a scheduler driving `factory`.
    #[must_use]
    pub fn new(factory: Arc<AgentFactory<C>>, clock: Arc<C>, config: SchedulerConfig) -> Self {
        Self {
            factory,
            clock,
            config,
            state: Mutex::new(SchedulerState::default()),
            task_events: Notify::new(),
            tracker: TaskTracker::new(),
            loops: Mutex::new(None),
        }
    }

    /// Returns the factory.
    #[must_use]
    pub const fn factory(&self) -> &Arc<AgentFactory<C>> {
        &self.factory
    }

    /// Returns the scheduler configuration.
    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    fn lock_state(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_loops(&self) -> MutexGuard<'_, Option<BackgroundLoops>> {
        self.loops.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Schedules creation of an agent and returns the task id immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::ResourceExhausted`] when the ceiling is
    /// reached and [`SchedulerError::Conflict`] when the id is already
    /// tracked. Neither leaves any state behind.
    pub fn schedule_agent_creation(self: &Arc<Self>, spec: AgentSpec) -> SchedulerResult<TaskId> {
        let agent_id = spec.agent_id().clone();
        let now = self.clock.utc();
        let task_id = {
            let mut state = self.lock_state();
            let tracked = state.agents.len();
            if tracked >= self.config.max_concurrent_agents {
                return Err(SchedulerError::ResourceExhausted {
                    limit: self.config.max_concurrent_agents,
                    tracked,
                });
            }
            if state.agents.contains_key(&agent_id) {
                return Err(SchedulerError::Conflict(agent_id));
            }
            let task = ScheduledTask::new(TaskKind::Create, agent_id.clone(), &*self.clock);
            let task_id = task.task_id();
            state.tasks.insert(task_id, task);
            state.agents.insert(
                agent_id.clone(),
                TrackedAgent {
                    status: AgentStatus::Creating,
                    last_activity: now,
                },
            );
            task_id
        };

        info!(agent_id = %agent_id, task_id = %task_id, "agent creation scheduled");
        let scheduler = Arc::clone(self);
        self.tracker
            .spawn(async move { scheduler.run_creation(task_id, spec).await });
        Ok(task_id)
    }

    /// Schedules deletion of a tracked agent.
    ///
    /// Returns `Ok(false)` when the agent is not tracked.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Domain`] with an invalid-transition error
    /// while the agent is `Creating` or `Stopping`.
    pub fn schedule_agent_deletion(self: &Arc<Self>, agent_id: &AgentId) -> SchedulerResult<bool> {
        let task_id = {
            let mut state = self.lock_state();
            let Some(agent) = state.agents.get_mut(agent_id) else {
                return Ok(false);
            };
            if !agent.status.can_transition_to(AgentStatus::Stopping) {
                return Err(invalid_transition(agent_id, agent.status, AgentStatus::Stopping).into());
            }
            agent.status = AgentStatus::Stopping;
            let task = ScheduledTask::new(TaskKind::Delete, agent_id.clone(), &*self.clock);
            let task_id = task.task_id();
            state.tasks.insert(task_id, task);
            task_id
        };

        info!(agent_id = %agent_id, task_id = %task_id, "agent deletion scheduled");
        let scheduler = Arc::clone(self);
        let owned_id = agent_id.clone();
        self.tracker
            .spawn(async move { scheduler.run_deletion(task_id, owned_id).await });
        Ok(true)
    }

    async fn run_creation(self: Arc<Self>, task_id: TaskId, spec: AgentSpec) {
        let agent_id = spec.agent_id().clone();
        self.mark_running(task_id);

        let factory = Arc::clone(&self.factory);
        let outcome = capture(async move { factory.create_agent(spec).await.map(drop) }).await;

        let mut state = self.lock_state();
        match outcome {
            Ok(()) => {
                transition(&mut state, &agent_id, AgentStatus::Active, self.clock.utc());
                self.finish_task(&mut state, task_id, None);
                info!(agent_id = %agent_id, task_id = %task_id, "agent creation completed");
            }
            Err(message) => {
                transition(&mut state, &agent_id, AgentStatus::Error, self.clock.utc());
                warn!(agent_id = %agent_id, task_id = %task_id, error = %message, "agent creation failed");
                self.finish_task(&mut state, task_id, Some(message));
            }
        }
        drop(state);
        self.task_events.notify_waiters();
    }

    async fn run_deletion(self: Arc<Self>, task_id: TaskId, agent_id: AgentId) {
        self.mark_running(task_id);

        let factory = Arc::clone(&self.factory);
        let target = agent_id.clone();
        let outcome = capture(async move {
            // An agent the factory no longer holds is already gone.
            factory.destroy_agent(&target).await;
            Ok::<(), FactoryError>(())
        })
        .await;

        let mut state = self.lock_state();
        match outcome {
            Ok(()) => {
                transition(&mut state, &agent_id, AgentStatus::Stopped, self.clock.utc());
                state.agents.remove(&agent_id);
                self.finish_task(&mut state, task_id, None);
                info!(agent_id = %agent_id, task_id = %task_id, "agent deletion completed");
            }
            Err(message) => {
                transition(&mut state, &agent_id, AgentStatus::Error, self.clock.utc());
                warn!(agent_id = %agent_id, task_id = %task_id, error = %message, "agent deletion failed");
                self.finish_task(&mut state, task_id, Some(message));
            }
        }
        drop(state);
        self.task_events.notify_waiters();
    }

    fn mark_running(&self, task_id: TaskId) {
        if let Some(task) = self.lock_state().tasks.get_mut(&task_id) {
            task.mark_running();
        }
        self.task_events.notify_waiters();
    }

    fn finish_task(&self, state: &mut SchedulerState, task_id: TaskId, error: Option<String>) {
        let Some(task) = state.tasks.get_mut(&task_id) else {
            debug!(task_id = %task_id, "finished task was already pruned");
            return;
        };
        match error {
            None => task.complete(&*self.clock),
            Some(message) => task.fail(message, &*self.clock),
        }
    }

    /// Marks an agent busy and refreshes its activity time.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::NotFound`] for an untracked agent, or
    /// [`SchedulerError::Domain`] when the agent cannot become busy.
    pub fn set_agent_busy(&self, agent_id: &AgentId) -> SchedulerResult<()> {
        self.set_operational_status(agent_id, AgentStatus::Busy)
    }

    /// Marks an agent idle and refreshes its activity time.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::NotFound`] for an untracked agent, or
    /// [`SchedulerError::Domain`] when the agent cannot become idle.
    pub fn set_agent_idle(&self, agent_id: &AgentId) -> SchedulerResult<()> {
        self.set_operational_status(agent_id, AgentStatus::Idle)
    }

    fn set_operational_status(&self, agent_id: &AgentId, target: AgentStatus) -> SchedulerResult<()> {
        let now = self.clock.utc();
        let mut state = self.lock_state();
        let agent = state
            .agents
            .get_mut(agent_id)
            .ok_or_else(|| SchedulerError::NotFound(agent_id.clone()))?;
        if !agent.status.can_transition_to(target) {
            return Err(invalid_transition(agent_id, agent.status, target).into());
        }
        agent.status = target;
        agent.last_activity = now;
        Ok(())
    }

    /// Returns the status of a tracked agent.
    #[must_use]
    pub fn get_agent_status(&self, agent_id: &AgentId) -> Option<AgentStatus> {
        self.lock_state()
            .agents
            .get(agent_id)
            .map(|agent| agent.status)
    }

    /// Returns the factory record of an agent with the scheduler's status
    /// and activity time.
    #[must_use]
    pub fn get_agent_record(&self, agent_id: &AgentId) -> Option<AgentInstanceRecord> {
        let mut record = self.factory.get_agent(agent_id)?;
        if let Some(agent) = self.lock_state().agents.get(agent_id) {
            record.status = agent.status;
            record.last_activity = agent.last_activity;
        }
        Some(record)
    }

    /// Returns every task record, oldest first.
    #[must_use]
    pub fn list_scheduled_tasks(&self) -> Vec<ScheduledTask> {
        let mut tasks: Vec<ScheduledTask> = self.lock_state().tasks.values().cloned().collect();
        tasks.sort_by_key(ScheduledTask::created_at);
        tasks
    }

    /// Returns one task record.
    #[must_use]
    pub fn get_task(&self, task_id: TaskId) -> Option<ScheduledTask> {
        self.lock_state().tasks.get(&task_id).cloned()
    }

    /// Waits until a task is completed or failed.
    ///
    /// Returns `None` when the task is unknown or was pruned.
    pub async fn wait_for_task(&self, task_id: TaskId) -> Option<ScheduledTask> {
        loop {
            let notified = self.task_events.notified();
            let task = self.get_task(task_id)?;
            if task.is_terminal() {
                return Some(task);
            }
            notified.await;
        }
    }

    /// Schedules deletion of idle agents inactive for longer than
    /// `idle_timeout`. Returns how many deletions were scheduled.
    pub fn cleanup_idle_agents(self: &Arc<Self>, idle_timeout: Duration) -> usize {
        let Some(cutoff) = cutoff(self.clock.utc(), idle_timeout) else {
            return 0;
        };
        let candidates: Vec<AgentId> = self
            .lock_state()
            .agents
            .iter()
            .filter(|(_, agent)| {
                agent.status == AgentStatus::Idle && agent.last_activity < cutoff
            })
            .map(|(agent_id, _)| agent_id.clone())
            .collect();

        let mut scheduled = 0;
        for agent_id in candidates {
            match self.schedule_agent_deletion(&agent_id) {
                Ok(true) => scheduled += 1,
                Ok(false) => {}
                Err(err) => warn!(agent_id = %agent_id, error = %err, "idle eviction skipped"),
            }
        }
        if scheduled > 0 {
            info!(scheduled, "idle agents scheduled for deletion");
        }
        scheduled
    }

    /// Drops terminal tasks that finished more than `retention` ago.
    /// Returns how many were dropped.
    pub fn prune_completed_tasks(&self, retention: Duration) -> usize {
        let Some(cutoff) = cutoff(self.clock.utc(), retention) else {
            return 0;
        };
        let mut state = self.lock_state();
        let before = state.tasks.len();
        state.tasks.retain(|_, task| !task.finished_before(cutoff));
        let pruned = before - state.tasks.len();
        drop(state);
        if pruned > 0 {
            debug!(pruned, "pruned completed tasks");
        }
        pruned
    }

    /// Returns counts derived from the scheduler's tables.
    #[must_use]
    pub fn get_stats(&self) -> SchedulerStats {
        let running = self.is_running();
        let state = self.lock_state();
        let mut agents_by_status = BTreeMap::new();
        for agent in state.agents.values() {
            *agents_by_status.entry(agent.status).or_insert(0) += 1;
        }
        let mut tasks_by_status = BTreeMap::new();
        for task in state.tasks.values() {
            *tasks_by_status.entry(task.status()).or_insert(0) += 1;
        }
        SchedulerStats {
            tracked_agents: state.agents.len(),
            agents_by_status,
            total_tasks: state.tasks.len(),
            tasks_by_status,
            running,
        }
    }

    /// Returns slot usage against the concurrency ceiling.
    #[must_use]
    pub fn get_resource_usage(&self) -> ResourceUsage {
        let tracked_agents = self.lock_state().agents.len();
        ResourceUsage {
            tracked_agents,
            max_concurrent_agents: self.config.max_concurrent_agents,
            available_slots: self
                .config
                .max_concurrent_agents
                .saturating_sub(tracked_agents),
        }
    }

    /// Returns whether the background loops are running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lock_loops().is_some()
    }

    /// Starts the cleanup and monitoring loops.
    ///
    /// Returns `false` when they are already running.
    pub fn start(self: &Arc<Self>) -> bool {
        let mut loops = self.lock_loops();
        if loops.is_some() {
            return false;
        }

        let shutdown = CancellationToken::new();
        let cleanup = tokio::spawn(Arc::clone(self).cleanup_loop(shutdown.clone()));
        let monitor = tokio::spawn(Arc::clone(self).monitor_loop(shutdown.clone()));
        *loops = Some(BackgroundLoops {
            shutdown,
            handles: vec![cleanup, monitor],
        });
        drop(loops);

        info!(
            cleanup_interval_secs = self.config.cleanup_interval.as_secs(),
            monitor_interval_secs = self.config.monitor_interval.as_secs(),
            "agent scheduler started"
        );
        true
    }

    /// Stops the loops, waits for in-flight tasks and destroys every
    /// tracked agent.
    pub async fn stop(&self) {
        let loops = self.lock_loops().take();
        if let Some(BackgroundLoops { shutdown, handles }) = loops {
            shutdown.cancel();
            for handle in handles {
                if let Err(err) = handle.await {
                    error!(error = %err, "scheduler loop ended abnormally");
                }
            }
        }

        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();

        let remaining: Vec<AgentId> = self.lock_state().agents.keys().cloned().collect();
        for agent_id in &remaining {
            if !self.factory.destroy_agent(agent_id).await {
                debug!(agent_id = %agent_id, "tracked agent had no live instance");
            }
        }
        self.lock_state().agents.clear();
        self.task_events.notify_waiters();

        info!(destroyed = remaining.len(), "agent scheduler stopped");
    }

    async fn cleanup_loop(self: Arc<Self>, shutdown: CancellationToken) {
        let mut timer = tokio::time::interval(self.config.cleanup_interval.max(MIN_LOOP_PERIOD));
        timer.tick().await; // Skip first immediate tick

        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    debug!("cleanup loop shutting down");
                    return;
                }
                _ = timer.tick() => {
                    let scheduler = Arc::clone(&self);
                    let pass = tokio::spawn(async move { scheduler.run_cleanup_pass() });
                    if let Err(err) = pass.await {
                        error!(error = %err, "cleanup pass failed");
                    }
                }
            }
        }
    }

    fn run_cleanup_pass(self: &Arc<Self>) {
        let evicted = self.cleanup_idle_agents(self.config.idle_timeout);
        let pruned = self.prune_completed_tasks(self.config.task_retention);
        debug!(evicted, pruned, "cleanup pass finished");
    }

    async fn monitor_loop(self: Arc<Self>, shutdown: CancellationToken) {
        let mut timer = tokio::time::interval(self.config.monitor_interval.max(MIN_LOOP_PERIOD));
        timer.tick().await; // Skip first immediate tick

        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    debug!("monitor loop shutting down");
                    return;
                }
                _ = timer.tick() => self.log_stats(),
            }
        }
    }

    fn log_stats(&self) {
        let stats = self.get_stats();
        let usage = self.get_resource_usage();
        let factory = self.factory.get_stats();
        info!(
            tracked_agents = stats.tracked_agents,
            available_slots = usage.available_slots,
            total_tasks = stats.total_tasks,
            live_agents = factory.total_agents,
            total_executions = factory.total_executions,
            error_rate = factory.error_rate,
            "scheduler statistics"
        );
    }
}

/// Runs `work` on its own task so a panic surfaces as a failure message.
async fn capture<F>(work: F) -> Result<(), String>
where
    F: Future<Output = Result<(), FactoryError>> + Send + 'static,
{
    match tokio::spawn(work).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(err.to_string()),
        Err(join_err) => Err(format!("task aborted: {join_err}")),
    }
}

fn transition(
    state: &mut SchedulerState,
    agent_id: &AgentId,
    target: AgentStatus,
    now: DateTime<Utc>,
) {
    let Some(agent) = state.agents.get_mut(agent_id) else {
        warn!(agent_id = %agent_id, to = %target, "status update for untracked agent dropped");
        return;
    };
    if !agent.status.can_transition_to(target) {
        warn!(
            agent_id = %agent_id,
            from = %agent.status,
            to = %target,
            "invalid status transition dropped"
        );
        return;
    }
    agent.status = target;
    agent.last_activity = now;
}

fn invalid_transition(agent_id: &AgentId, from: AgentStatus, to: AgentStatus) -> AgentDomainError {
    AgentDomainError::InvalidTransition {
        agent_id: agent_id.clone(),
        from: from.as_str().to_owned(),
        to: to.as_str().to_owned(),
    }
}

fn cutoff(now: DateTime<Utc>, age: Duration) -> Option<DateTime<Utc>> {
    now.checked_sub_signed(TimeDelta::from_std(age).ok()?)
}

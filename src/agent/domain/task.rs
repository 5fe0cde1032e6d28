//! Audit record for asynchronous creation and deletion.

use super::{AgentId, TaskId, TaskKind, TaskStatus};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// One scheduled creation or deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    task_id: TaskId,
    kind: TaskKind,
    agent_id: AgentId,
    status: TaskStatus,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    error: Option<String>,
}

impl ScheduledTask {
    /// Creates a task in the `Scheduled` state.
    #[must_use]
    pub fn new(kind: TaskKind, agent_id: AgentId, clock: &impl Clock) -> Self {
        Self {
            task_id: TaskId::new(),
            kind,
            agent_id,
            status: TaskStatus::Scheduled,
            created_at: clock.utc(),
            completed_at: None,
            error: None,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the operation kind.
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Returns the agent the task operates on.
    #[must_use]
    pub const fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    /// Returns the task status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns when the task was scheduled.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the task finished, if it has.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the failure message, if the task failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns whether the task has finished.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Marks the task as started.
    pub fn mark_running(&mut self) {
        if self.status == TaskStatus::Scheduled {
            self.status = TaskStatus::Running;
        }
    }

    /// Marks the task as finished successfully.
    pub fn complete(&mut self, clock: &impl Clock) {
        self.status = TaskStatus::Completed;
        self.completed_at = Some(clock.utc());
    }

    /// Marks the task as failed with a message.
    pub fn fail(&mut self, error: impl Into<String>, clock: &impl Clock) {
        self.status = TaskStatus::Failed;
        self.error = Some(error.into());
        self.completed_at = Some(clock.utc());
    }

    /// Returns whether the task finished before `cutoff`.
    #[must_use]
    pub fn finished_before(&self, cutoff: DateTime<Utc>) -> bool {
        self.is_terminal() && self.completed_at.is_some_and(|at| at < cutoff)
    }
}

//! Lifecycle states for agents and scheduled tasks.

use super::ParseAgentStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a tracked agent.
///
/// `Creating → Active → {Busy ↔ Idle} → Stopping → Stopped`, with `Error`
/// reachable from `Creating` and `Stopping` when the backing task fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// A creation task is building the instance.
    Creating,
    /// The instance is built and has not reported activity yet.
    Active,
    /// The execution layer is running the agent.
    Busy,
    /// The agent is waiting for work and eligible for idle eviction.
    Idle,
    /// A deletion task is tearing the instance down.
    Stopping,
    /// The instance has been destroyed.
    Stopped,
    /// The last creation or deletion task failed.
    Error,
}

impl AgentStatus {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Creating => "creating",
            Self::Active => "active",
            Self::Busy => "busy",
            Self::Idle => "idle",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Error => "error",
        }
    }

    /// Returns whether transition to `target` is allowed.
    ///
    /// `Busy` and `Idle` may be re-entered to refresh activity. An agent in
    /// `Error` may only be stopped.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Creating, Self::Active | Self::Error)
                | (
                    Self::Active | Self::Busy | Self::Idle,
                    Self::Busy | Self::Idle | Self::Stopping
                )
                | (Self::Stopping, Self::Stopped | Self::Error)
                | (Self::Error, Self::Stopping)
        )
    }

    /// Returns whether the agent has a live instance that can do work.
    #[must_use]
    pub const fn is_operational(self) -> bool {
        matches!(self, Self::Active | Self::Busy | Self::Idle)
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AgentStatus {
    type Error = ParseAgentStatusError;

    fn try_from(value: &str) -> Result<Self, ParseAgentStatusError> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "creating" => Ok(Self::Creating),
            "active" => Ok(Self::Active),
            "busy" => Ok(Self::Busy),
            "idle" => Ok(Self::Idle),
            "stopping" => Ok(Self::Stopping),
            "stopped" => Ok(Self::Stopped),
            "error" => Ok(Self::Error),
            _ => Err(ParseAgentStatusError(value.to_owned())),
        }
    }
}

/// Kind of lifecycle operation a scheduled task performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Builds an agent instance.
    Create,
    /// Destroys an agent instance.
    Delete,
}

impl TaskKind {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Recorded but not yet started.
    Scheduled,
    /// The factory call is in flight.
    Running,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
}

impl TaskStatus {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Returns whether the task has finished.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AgentStatus::Creating, AgentStatus::Active, true)]
    #[case(AgentStatus::Creating, AgentStatus::Error, true)]
    #[case(AgentStatus::Creating, AgentStatus::Stopping, false)]
    #[case(AgentStatus::Active, AgentStatus::Busy, true)]
    #[case(AgentStatus::Busy, AgentStatus::Idle, true)]
    #[case(AgentStatus::Idle, AgentStatus::Busy, true)]
    #[case(AgentStatus::Idle, AgentStatus::Stopping, true)]
    #[case(AgentStatus::Idle, AgentStatus::Creating, false)]
    #[case(AgentStatus::Stopping, AgentStatus::Stopped, true)]
    #[case(AgentStatus::Stopping, AgentStatus::Error, true)]
    #[case(AgentStatus::Stopping, AgentStatus::Active, false)]
    #[case(AgentStatus::Error, AgentStatus::Stopping, true)]
    #[case(AgentStatus::Error, AgentStatus::Active, false)]
    #[case(AgentStatus::Stopped, AgentStatus::Active, false)]
    fn lifecycle_transition_matrix(
        #[case] current: AgentStatus,
        #[case] target: AgentStatus,
        #[case] expected: bool,
    ) {
        assert_eq!(current.can_transition_to(target), expected);
    }

    #[rstest]
    #[case("creating", AgentStatus::Creating)]
    #[case(" IDLE ", AgentStatus::Idle)]
    #[case("error", AgentStatus::Error)]
    fn status_parses_canonical_strings(#[case] raw: &str, #[case] expected: AgentStatus) {
        assert_eq!(AgentStatus::try_from(raw), Ok(expected));
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert_eq!(
            AgentStatus::try_from("sleeping"),
            Err(ParseAgentStatusError("sleeping".to_owned()))
        );
    }

    #[test]
    fn only_completed_and_failed_are_terminal() {
        assert!(!TaskStatus::Scheduled.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
    }
}

//! Domain model for agent instances and scheduled lifecycle tasks.

mod error;
mod ids;
mod metrics;
mod record;
mod spec;
mod status;
mod task;

pub use error::{AgentDomainError, ParseAgentStatusError};
pub use ids::{AgentId, TaskId};
pub use metrics::AgentMetrics;
pub(crate) use metrics::average;
pub use record::{AgentInstanceRecord, AgentMetadata};
pub use spec::AgentSpec;
pub use status::{AgentStatus, TaskKind, TaskStatus};
pub use task::ScheduledTask;

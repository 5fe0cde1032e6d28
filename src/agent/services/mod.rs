//! Application services for agent lifecycle management.

mod factory;
mod scheduler;

pub use factory::{AgentFactory, FactoryError, FactoryResult, FactoryStats};
pub use scheduler::{
    AgentScheduler, ResourceUsage, SchedulerError, SchedulerResult, SchedulerStats,
};

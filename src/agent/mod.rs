//! Agent instance lifecycle for Atelier.
//!
//! The [`services::AgentFactory`] builds and destroys agent instances from
//! registered templates; the [`services::AgentScheduler`] wraps those calls in
//! tracked background tasks, enforces the concurrency ceiling and evicts idle
//! agents. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Orchestration services in [`services`]

pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;

//! Agent template catalog for Atelier.
//!
//! Templates are construction recipes for agent instances. This module holds
//! the template contract, the versioned registry that serves descriptors to
//! the agent factory, and the manager that feeds discovered templates into
//! the registry. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;

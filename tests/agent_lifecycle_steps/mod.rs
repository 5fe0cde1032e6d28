//! Step definitions for agent lifecycle BDD scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;

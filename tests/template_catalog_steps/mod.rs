//! Step definitions for template catalog BDD scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;

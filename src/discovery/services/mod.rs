//! Discovery services.

mod engine;

pub use engine::{DiscoveryEngine, DiscoveryHook};

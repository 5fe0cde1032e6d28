//! Port contracts for agent construction.

mod framework;

pub use framework::FrameworkFactory;

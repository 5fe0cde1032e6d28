//! Application services for the template catalog.

mod manager;
mod registry;

pub use manager::{DiscoveryReport, TemplateManager};
pub use registry::{RegistrationError, RegistrationOutcome, TemplateRegistry};

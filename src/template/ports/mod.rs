//! Port contracts implemented by agent templates.
//!
//! Every template exposes the same capability set: identity, metadata,
//! configuration validation and instance construction.

mod template;

pub use template::{AgentInstance, AgentTemplate, TemplateError, TemplateResult};

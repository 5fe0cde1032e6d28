//! Port contracts for template sources.

mod source;

pub use source::TemplateSource;

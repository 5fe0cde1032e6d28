//! Template source implementations.

mod filesystem;
mod memory;

pub use filesystem::FilesystemTemplateSource;
pub use memory::InMemoryTemplateSource;

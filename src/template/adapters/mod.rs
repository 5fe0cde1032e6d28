//! Adapter implementations for the template ports.

mod echo;
mod library;

pub use echo::{ECHO_CONSTRUCTOR, EchoTemplate};
pub use library::{TemplateLibrary, TemplateLibraryError};

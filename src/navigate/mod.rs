//! Directory navigation
//!
//! Handles CWD/CDUP resolution and RETR path resolution within the session root.

pub mod operations;
pub mod validation;

pub use operations::{change_directory, parent_directory, resolve_file, virtual_path};
pub use validation::PathClass;

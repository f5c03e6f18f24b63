//! Error handling
//!
//! Defines error types and their reply-code mapping for the FTP server.

pub mod types;

pub use types::*;

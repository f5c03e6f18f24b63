//! Server core functionality
//!
//! This module contains the session manager that accepts control connections.

pub mod core;

pub use core::Server;

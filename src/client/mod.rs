//! Client management system
//!
//! Handles the control-connection loop and per-connection session state.

pub mod handler;
pub mod state;

pub use handler::handle_client;
pub use state::Session;

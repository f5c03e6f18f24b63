//! Utility functions
//!
//! Helpers shared by the protocol and transfer modules.

pub mod network;

//! Server middleware
//!
//! Provides request/reply logging.

pub mod logging;

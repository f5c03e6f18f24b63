//! Transfer module for FTP server
//!
//! Handles passive data channels, file streaming and the transfer parameters
//! negotiated on the control connection.

pub mod data_channel;
pub mod file_ops;
pub mod modes;
pub mod results;

// Re-export key types and functions
pub use data_channel::{DATA_PORT_RANGE, PassiveChannel, random_data_port};
pub use file_ops::send_file;
pub use modes::{FileStructure, Negotiation, RepresentationType, TransferMode};
pub use results::{ListOutcome, TransferOutcome};

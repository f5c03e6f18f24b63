//! FTP Protocol implementation
//!
//! Handles FTP command parsing, dispatch, and reply encoding.

pub mod commands;
pub mod handlers;
pub mod responses;

pub use commands::{Command, CommandLine, CommandStatus, strip_line_ending};
pub use handlers::Dispatcher;
pub use responses::{Reply, ReplyCode, encode_reply, send_reply};

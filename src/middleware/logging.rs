//! Logging middleware
//!
//! Request and reply line logging for the control connection.

use log::info;
use std::net::SocketAddr;

/// Log a client connection
pub fn log_connection(client_addr: &SocketAddr) {
    info!("Accepted the client connection from {}", client_addr);
}

/// Log a received control line
pub fn log_request(client_addr: &SocketAddr, line: &str) {
    info!("{} --> {}", client_addr, line);
}

/// Log a reply sent on the control connection
pub fn log_reply(line: &str) {
    info!("<-- {}", line.trim_end());
}

//! Error types
//!
//! Defines domain-specific error types for each module of the FTP server.
//! Errors raised while serving a command know which reply code they map to.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::protocol::ReplyCode;

/// Authentication module errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error("User not found: {0}")]
    UserNotFound(String),
}

impl AuthError {
    pub fn reply_code(&self) -> ReplyCode {
        match self {
            AuthError::MalformedInput(_) => ReplyCode::SyntaxErrorInArguments,
            AuthError::UserNotFound(_) => ReplyCode::NotLoggedIn,
        }
    }
}

/// Navigate module errors
#[derive(Debug, Error)]
pub enum NavigateError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("Path traversal attempt: {0}")]
    PathTraversal(String),
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("Not a directory: {0}")]
    NotADirectory(String),
    #[error("Already at the session root")]
    AtRoot,
    #[error("Failed to change directory to {path}: {source}")]
    ChangeFailed { path: String, source: io::Error },
}

impl NavigateError {
    pub fn reply_code(&self) -> ReplyCode {
        match self {
            NavigateError::ChangeFailed { .. } => ReplyCode::CommandUnrecognized,
            _ => ReplyCode::FileUnavailable,
        }
    }
}

/// Transfer module errors
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("No passive data channel has been requested")]
    DataChannelNotInitialized,
    #[error("No non-loopback IPv4 address available for passive mode")]
    NoInterfaceAddress,
    #[error("Failed to bind to {0}: {1}")]
    PortBindingFailed(SocketAddr, io::Error),
    #[error("Failed to configure listener: {0}")]
    ListenerConfigurationFailed(io::Error),
    #[error("Timeout after {0:?} waiting for data connection")]
    ConnectionTimeout(Duration),
    #[error("Failed to accept data connection: {0}")]
    AcceptFailed(io::Error),
}

impl TransferError {
    pub fn reply_code(&self) -> ReplyCode {
        match self {
            TransferError::DataChannelNotInitialized
            | TransferError::ConnectionTimeout(_)
            | TransferError::AcceptFailed(_) => ReplyCode::CantOpenDataConnection,
            // Allocation failures are reported while handling PASV.
            TransferError::NoInterfaceAddress
            | TransferError::PortBindingFailed(..)
            | TransferError::ListenerConfigurationFailed(_) => ReplyCode::CommandUnrecognized,
        }
    }
}

/// Errors that stop the server itself rather than a single command
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Failed to bind control socket {0}: {1}")]
    Bind(String, io::Error),
    #[error("Server root {0} is unusable: {1}")]
    ServerRoot(String, io::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

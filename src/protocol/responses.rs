//! Module `responses`
//!
//! Encodes status codes and detail text into reply lines and writes them to
//! the control connection.

use log::warn;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::middleware::logging::log_reply;

/// Status codes this server emits with a fixed reply template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyCode {
    AboutToOpenDataConnection,
    CommandOk,
    ServiceReady,
    ClosingControlConnection,
    ClosingDataConnection,
    LoggedIn,
    FileActionOk,
    CantOpenDataConnection,
    TransferAborted,
    FileBusy,
    LocalProcessingError,
    CommandUnrecognized,
    SyntaxErrorInArguments,
    NotImplementedForParameter,
    NotLoggedIn,
    FileUnavailable,
}

impl ReplyCode {
    pub fn code(self) -> u16 {
        match self {
            ReplyCode::AboutToOpenDataConnection => 150,
            ReplyCode::CommandOk => 200,
            ReplyCode::ServiceReady => 220,
            ReplyCode::ClosingControlConnection => 221,
            ReplyCode::ClosingDataConnection => 226,
            ReplyCode::LoggedIn => 230,
            ReplyCode::FileActionOk => 250,
            ReplyCode::CantOpenDataConnection => 425,
            ReplyCode::TransferAborted => 426,
            ReplyCode::FileBusy => 450,
            ReplyCode::LocalProcessingError => 451,
            ReplyCode::CommandUnrecognized => 500,
            ReplyCode::SyntaxErrorInArguments => 501,
            ReplyCode::NotImplementedForParameter => 504,
            ReplyCode::NotLoggedIn => 530,
            ReplyCode::FileUnavailable => 550,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        let reply = match code {
            150 => ReplyCode::AboutToOpenDataConnection,
            200 => ReplyCode::CommandOk,
            220 => ReplyCode::ServiceReady,
            221 => ReplyCode::ClosingControlConnection,
            226 => ReplyCode::ClosingDataConnection,
            230 => ReplyCode::LoggedIn,
            250 => ReplyCode::FileActionOk,
            425 => ReplyCode::CantOpenDataConnection,
            426 => ReplyCode::TransferAborted,
            450 => ReplyCode::FileBusy,
            451 => ReplyCode::LocalProcessingError,
            500 => ReplyCode::CommandUnrecognized,
            501 => ReplyCode::SyntaxErrorInArguments,
            504 => ReplyCode::NotImplementedForParameter,
            530 => ReplyCode::NotLoggedIn,
            550 => ReplyCode::FileUnavailable,
            _ => return None,
        };
        Some(reply)
    }

    /// Fixed text that follows the numeric code.
    pub fn text(self) -> &'static str {
        match self {
            ReplyCode::AboutToOpenDataConnection => {
                "File status okay; about to open data connection"
            }
            ReplyCode::CommandOk => "Command okay",
            ReplyCode::ServiceReady => "Service ready for new user",
            ReplyCode::ClosingControlConnection => "Service closing control connection",
            ReplyCode::ClosingDataConnection => "Closing data connection",
            ReplyCode::LoggedIn => "User logged in, proceed",
            ReplyCode::FileActionOk => "Requested file action okay, completed",
            ReplyCode::CantOpenDataConnection => "Can't open data connection",
            ReplyCode::TransferAborted => "Connection closed; transfer aborted",
            ReplyCode::FileBusy => {
                "Requested file action not taken. File unavailable (e.g., file busy)"
            }
            ReplyCode::LocalProcessingError => {
                "Requested action aborted: local error in processing"
            }
            ReplyCode::CommandUnrecognized => "Syntax error, command unrecognized",
            ReplyCode::SyntaxErrorInArguments => "Syntax error in parameters or arguments",
            ReplyCode::NotImplementedForParameter => "Command not implemented for that parameter",
            ReplyCode::NotLoggedIn => "Not logged in",
            ReplyCode::FileUnavailable => {
                "Requested action not taken. File unavailable (e.g., file not found, no access)"
            }
        }
    }
}

/// A single reply to be written on the control connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A templated reply: code, fixed text and caller detail.
    Coded(ReplyCode, String),
    /// A line sent exactly as given.
    Raw(String),
}

impl Reply {
    pub fn new(code: ReplyCode, detail: impl Into<String>) -> Self {
        Reply::Coded(code, detail.into())
    }

    pub fn code(code: ReplyCode) -> Self {
        Reply::Coded(code, String::new())
    }

    /// Numeric code of the reply, if it has one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Reply::Coded(code, _) => Some(code.code()),
            Reply::Raw(line) => line.get(..3).and_then(|digits| digits.parse().ok()),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Reply::Coded(code, detail) if detail.is_empty() => {
                format!("{} {}.\r\n", code.code(), code.text())
            }
            Reply::Coded(code, detail) => {
                format!("{} {}. {}\r\n", code.code(), code.text(), detail)
            }
            Reply::Raw(line) => line.clone(),
        }
    }
}

/// Encodes a numeric status and detail. Codes without a template pass the
/// detail through unchanged.
pub fn encode_reply(code: u16, detail: &str) -> String {
    match ReplyCode::from_code(code) {
        Some(code) => Reply::new(code, detail).encode(),
        None => detail.to_string(),
    }
}

/// Writes a reply to the control connection and flushes it.
///
/// Send failures are logged and otherwise ignored; the session notices a dead
/// control connection on its next read.
pub async fn send_reply<W>(control: &mut W, reply: &Reply)
where
    W: AsyncWrite + Unpin,
{
    let line = reply.encode();
    if let Err(e) = control.write_all(line.as_bytes()).await {
        warn!("Failed to send reply {:?}: {}", line.trim_end(), e);
        return;
    }
    if let Err(e) = control.flush().await {
        warn!("Failed to flush reply {:?}: {}", line.trim_end(), e);
        return;
    }
    log_reply(&line);
}

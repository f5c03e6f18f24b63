//! Transfer result types
//!
//! Outcomes of file and listing transfers and the replies they produce.

use std::io;

use crate::protocol::{Reply, ReplyCode};

/// Outcome of streaming a file over the data connection.
#[derive(Debug)]
pub enum TransferOutcome {
    Completed { bytes: u64 },
    OpenFailed(io::Error),
    ReadFailed(io::Error),
    WriteFailed(io::Error),
    /// The data connection stopped accepting bytes.
    ShortWrite { bytes: u64 },
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TransferOutcome::Completed { .. })
    }

    pub fn reply(&self) -> Reply {
        match self {
            TransferOutcome::Completed { .. } => Reply::code(ReplyCode::ClosingDataConnection),
            TransferOutcome::OpenFailed(_) => {
                Reply::new(ReplyCode::TransferAborted, "The file could not be opened.")
            }
            TransferOutcome::ReadFailed(_) => {
                Reply::new(ReplyCode::TransferAborted, "The file could not be read.")
            }
            TransferOutcome::WriteFailed(_) => Reply::code(ReplyCode::TransferAborted),
            TransferOutcome::ShortWrite { .. } => {
                Reply::new(ReplyCode::TransferAborted, "A short write happened.")
            }
        }
    }
}

/// Outcome reported by a directory lister.
#[derive(Debug)]
pub enum ListOutcome {
    Completed { entries: usize },
    /// Enumerating the directory failed on this side.
    LocalFailure(io::Error),
    /// Writing the listing to the data connection failed.
    RemoteFailure(io::Error),
}

impl ListOutcome {
    pub fn reply(&self) -> Reply {
        match self {
            ListOutcome::Completed { .. } => Reply::code(ReplyCode::ClosingDataConnection),
            ListOutcome::LocalFailure(_) => Reply::code(ReplyCode::LocalProcessingError),
            ListOutcome::RemoteFailure(_) => Reply::code(ReplyCode::FileBusy),
        }
    }
}

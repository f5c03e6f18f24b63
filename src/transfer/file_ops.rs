//! Module `file_ops`
//!
//! Streams file contents over an accepted data connection and classifies
//! how the transfer ended.

use std::io::ErrorKind;
use std::path::Path;

use log::{error, info, warn};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::transfer::results::TransferOutcome;

/// Sends the file at `path` to `data_stream` in chunks of `buffer_size`.
///
/// Stops at the first read or write failure.
pub async fn send_file<W>(data_stream: &mut W, path: &Path, buffer_size: usize) -> TransferOutcome
where
    W: AsyncWrite + Unpin,
{
    info!("Starting file download: {}", path.display());

    let mut file = match File::open(path).await {
        Ok(file) => file,
        Err(e) => {
            error!("Failed to open file {}: {}", path.display(), e);
            return TransferOutcome::OpenFailed(e);
        }
    };

    let mut buffer = vec![0u8; buffer_size.max(1)];
    let mut total_bytes_sent = 0u64;

    loop {
        let n = match file.read(&mut buffer).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                error!("Read error on {}: {}", path.display(), e);
                return TransferOutcome::ReadFailed(e);
            }
        };

        match data_stream.write_all(&buffer[..n]).await {
            Ok(()) => total_bytes_sent += n as u64,
            Err(e) if e.kind() == ErrorKind::WriteZero => {
                warn!(
                    "Short write to data stream after {} bytes of {}",
                    total_bytes_sent,
                    path.display()
                );
                return TransferOutcome::ShortWrite {
                    bytes: total_bytes_sent,
                };
            }
            Err(e) => {
                error!("Write failure to data stream: {}", e);
                return TransferOutcome::WriteFailed(e);
            }
        }
    }

    if let Err(e) = data_stream.flush().await {
        error!("Failed to flush data stream: {}", e);
        return TransferOutcome::WriteFailed(e);
    }

    info!(
        "File download completed successfully: {} ({} bytes)",
        path.display(),
        total_bytes_sent
    );
    TransferOutcome::Completed {
        bytes: total_bytes_sent,
    }
}

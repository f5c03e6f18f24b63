//! Directory listing
//!
//! The NLST feed is produced by a [`DirectoryLister`], which enumerates a
//! directory and writes it to the data connection.

use std::path::Path;

use async_trait::async_trait;
use log::{error, info};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::transfer::ListOutcome;

/// Writes a listing of `path` to a byte sink.
#[async_trait]
pub trait DirectoryLister: Send + Sync {
    async fn list(&self, sink: &mut (dyn AsyncWrite + Unpin + Send), path: &Path) -> ListOutcome;
}

/// Lists entry names only, sorted, one per CRLF-terminated line.
#[derive(Debug, Default, Clone, Copy)]
pub struct NameLister;

impl NameLister {
    async fn entry_names(path: &Path) -> std::io::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(path).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl DirectoryLister for NameLister {
    async fn list(&self, sink: &mut (dyn AsyncWrite + Unpin + Send), path: &Path) -> ListOutcome {
        let names = match Self::entry_names(path).await {
            Ok(names) => names,
            Err(e) => {
                error!("Failed to list directory {}: {}", path.display(), e);
                return ListOutcome::LocalFailure(e);
            }
        };

        let listing: String = names.iter().map(|name| format!("{name}\r\n")).collect();
        if let Err(e) = sink.write_all(listing.as_bytes()).await {
            error!("Failed to send directory listing: {}", e);
            return ListOutcome::RemoteFailure(e);
        }
        if let Err(e) = sink.flush().await {
            error!("Failed to flush directory listing: {}", e);
            return ListOutcome::RemoteFailure(e);
        }

        info!("Listed {} ({} entries)", path.display(), names.len());
        ListOutcome::Completed {
            entries: names.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_lists_sorted_names() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.txt"), b"b").unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let mut sink = Vec::new();
        let outcome = NameLister.list(&mut sink, dir.path()).await;

        assert!(matches!(outcome, ListOutcome::Completed { entries: 3 }));
        assert_eq!(String::from_utf8(sink).unwrap(), "a.txt\r\nb.txt\r\nsub\r\n");
    }

    #[tokio::test]
    async fn test_missing_directory_is_local_failure() {
        let dir = TempDir::new().unwrap();
        let mut sink = Vec::new();
        let outcome = NameLister.list(&mut sink, &dir.path().join("gone")).await;

        assert!(matches!(outcome, ListOutcome::LocalFailure(_)));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_closed_sink_is_remote_failure() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("file"), b"x").unwrap();

        let (mut writer, reader) = tokio::io::duplex(64);
        drop(reader);
        let outcome = NameLister.list(&mut writer, dir.path()).await;

        assert!(matches!(outcome, ListOutcome::RemoteFailure(_)));
    }
}

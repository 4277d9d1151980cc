use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio::io::AsyncWriteExt;

use turnlog_record::CanonicalRecord;

/// Append-only JSONL journal.  One record per line, newline-terminated.
///
/// Concurrent logger processes interleave safely at line granularity: the
/// file is opened in append mode and a whole line is written in one call,
/// relying on OS append atomicity for writes below the platform's atomic
/// write size.  No locking here.
#[derive(Debug, Clone)]
pub struct JournalSink {
    path: PathBuf,
}

impl JournalSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, record: &CanonicalRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        // Flush userspace buffers and fsync so the line survives a process
        // crash or power loss immediately after append.
        file.flush().await?;
        file.sync_all().await?;
        Ok(())
    }
}

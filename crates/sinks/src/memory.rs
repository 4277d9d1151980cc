use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use turnlog_config::{LoggerConfig, RotationMode};
use turnlog_record::CanonicalRecord;
use turnlog_record::schema::{truncate_str, value_is_truthy};

/// Why a memory-store write failed.  Every variant is a routine, expected
/// outcome for this sink — the pipeline logs it at debug level and moves on.
#[derive(Debug, Error)]
pub enum MemoryStoreError {
    #[error("memory store binary not found: {0}")]
    BinaryNotFound(PathBuf),
    #[error("memory store put timed out after {0}s")]
    Timeout(u64),
    #[error("memory store exited with status {code:?}")]
    NonZeroExit { code: Option<i32> },
    #[error("staging payload failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("serializing record failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Best-effort writer for the external searchable-memory store.
///
/// Each record becomes one `put` against the rotation-addressed store file,
/// staged through a temp file and bounded by a fixed timeout.  Nothing this
/// sink does may propagate as a fatal error to the caller.
#[derive(Debug, Clone)]
pub struct MemorySink {
    bin: PathBuf,
    dir: PathBuf,
    rotation: RotationMode,
    single_store: String,
    timeout_secs: u64,
    preview_chars: usize,
    session_prefix_chars: usize,
}

impl MemorySink {
    pub fn new(config: &LoggerConfig) -> Self {
        Self {
            bin: config.memvid_bin(),
            dir: PathBuf::from(&config.memory.dir),
            rotation: config.memory.rotation,
            single_store: config.memory.single_store.clone(),
            timeout_secs: config.memory.timeout_secs,
            preview_chars: config.memory.preview_chars,
            session_prefix_chars: config.memory.session_prefix_chars,
        }
    }

    /// Physical store file for this record.  Resolved from the shard id the
    /// builder stamped on the record, so a month rollover between build and
    /// store cannot split the two sinks across shards.
    pub fn store_path(&self, record: &CanonicalRecord) -> PathBuf {
        match self.rotation {
            RotationMode::Monthly => self
                .dir
                .join(format!("memory_{}.mv2", record.memory_shard_id)),
            RotationMode::Single => self.dir.join(&self.single_store),
        }
    }

    pub async fn store(&self, record: &CanonicalRecord) -> Result<(), MemoryStoreError> {
        let store = self.store_path(record);
        self.ensure_store(&store).await;

        // Stage the full record as pretty JSON.  The guard deletes the file
        // when it drops, on every exit path below.
        let staged = tempfile::Builder::new()
            .prefix("turnlog-")
            .suffix(".json")
            .tempfile()?;
        serde_json::to_writer_pretty(staged.as_file(), record)?;
        staged.as_file().flush()?;

        let mut cmd = self.command();
        cmd.arg("put")
            .arg(&store)
            .arg("--title")
            .arg(self.derive_title(record))
            .arg("--timestamp")
            .arg(record.timestamp_date())
            .arg("--tag")
            .arg(self.derive_tags(record))
            .arg("--input")
            .arg(staged.path());
        self.run(cmd).await
    }

    /// Idempotent lazy creation of the shard's backing store.  Losing a
    /// creation race to a concurrent invocation is an expected outcome, so
    /// every failure here is ignored apart from a debug line.
    async fn ensure_store(&self, store: &Path) {
        if store.exists() {
            return;
        }
        if let Err(err) = tokio::fs::create_dir_all(&self.dir).await {
            debug!(error = %err, dir = %self.dir.display(), "memory dir creation failed");
        }
        let mut cmd = self.command();
        cmd.arg("create").arg(store);
        if let Err(err) = self.run(cmd).await {
            debug!(error = %err, store = %store.display(), "store creation failed");
        }
    }

    /// `[{role_tag}] {preview}...` — tool records embed the tool name
    /// instead.  The preview is whitespace-normalised and truncated to the
    /// configured character budget; the ellipsis is always appended.
    fn derive_title(&self, record: &CanonicalRecord) -> String {
        let prefix = if record.role_tag == "tool" {
            format!(
                "tool:{}",
                record.tool_name.as_deref().unwrap_or("unknown")
            )
        } else {
            record.role_tag.clone()
        };
        let flattened = record.content.replace(['\n', '\r'], " ");
        let preview = truncate_str(flattened.trim(), self.preview_chars);
        format!("[{prefix}] {preview}...")
    }

    /// Deduplicated, ordered tag list joined with commas.
    fn derive_tags(&self, record: &CanonicalRecord) -> String {
        let mut tags: Vec<String> = Vec::new();
        let mut push = |tags: &mut Vec<String>, tag: String| {
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        };

        push(&mut tags, record.role_tag.clone());
        push(&mut tags, record.source.clone());
        if let Some(agent_id) = record.agent_id.as_deref() {
            push(&mut tags, format!("agent:{agent_id}"));
        }
        if record.tool_calls.as_ref().is_some_and(value_is_truthy) {
            push(&mut tags, "has_tools".to_string());
        }
        if !record.session_id.is_empty() {
            let prefix = truncate_str(&record.session_id, self.session_prefix_chars);
            push(&mut tags, format!("session:{prefix}"));
        }

        if tags.is_empty() {
            "conversation".to_string()
        } else {
            tags.join(",")
        }
    }

    fn command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.bin);
        cmd.stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            // Timing out drops the output future; make sure the child dies
            // with it instead of outliving the logger.
            .kill_on_drop(true);
        cmd
    }

    async fn run(&self, mut cmd: tokio::process::Command) -> Result<(), MemoryStoreError> {
        let output = tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            cmd.output(),
        )
        .await
        .map_err(|_| MemoryStoreError::Timeout(self.timeout_secs))?
        .map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                MemoryStoreError::BinaryNotFound(self.bin.clone())
            } else {
                MemoryStoreError::Io(err)
            }
        })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(MemoryStoreError::NonZeroExit {
                code: output.status.code(),
            })
        }
    }
}

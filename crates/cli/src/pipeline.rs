use chrono::Utc;
use tracing::{debug, warn};

use turnlog_config::LoggerConfig;
use turnlog_record::{RawMessage, build_record};
use turnlog_sinks::{JournalSink, MemorySink};

/// Which sinks accepted the record, for diagnostics and tests.  Never turns
/// into a non-zero exit — this logger must not be the reason a surrounding
/// conversation pipeline fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkOutcome {
    pub journal_ok: bool,
    pub memory_ok: bool,
}

/// Run one logging pass over raw stdin bytes.
///
/// Empty input is a no-op; unparsable input gets a one-line stderr
/// diagnostic and is dropped.  Otherwise the record is built once and fanned
/// out to both sinks independently — a failing journal never skips the
/// memory store and vice versa.
pub async fn log_message(input: &str, config: &LoggerConfig) -> Option<SinkOutcome> {
    if input.trim().is_empty() {
        return None;
    }

    let raw: RawMessage = match serde_json::from_str(input) {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("[turnlog error] {err}");
            return None;
        }
    };

    let record = build_record(&raw, Utc::now(), config);

    let journal = JournalSink::new(&config.journal.path);
    let journal_ok = match journal.append(&record).await {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, path = %journal.path().display(), "journal append failed");
            false
        }
    };

    let memory_ok = match MemorySink::new(config).store(&record).await {
        Ok(()) => true,
        Err(err) => {
            // Store rejections are routine (size limits, missing binary);
            // keep them off stderr unless debug logging is on.
            debug!(error = %err, "memory store write failed");
            false
        }
    };

    Some(SinkOutcome {
        journal_ok,
        memory_ok,
    })
}

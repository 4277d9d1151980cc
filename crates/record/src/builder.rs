use chrono::{DateTime, SecondsFormat, Utc};

use turnlog_config::LoggerConfig;

use crate::classify::classify_role;
use crate::rotation;
use crate::schema::{CanonicalRecord, RawMessage};

/// Assemble the canonical record from a raw message.
///
/// `now` is injected so shard addressing and the `logged_at` stamp are
/// testable without a wall clock.  Infallible: every missing input field has
/// a documented default, so partial or even empty messages still build.
pub fn build_record(
    raw: &RawMessage,
    now: DateTime<Utc>,
    config: &LoggerConfig,
) -> CanonicalRecord {
    let timestamp = match raw.timestamp.as_deref() {
        Some(ts) if !ts.is_empty() => ts.to_string(),
        _ => now.to_rfc3339_opts(SecondsFormat::Secs, true),
    };

    CanonicalRecord {
        timestamp,
        session_id: non_empty_or(raw.session_id.as_deref(), "unknown"),
        role: non_empty_or(raw.role.as_deref(), "unknown"),
        role_tag: classify_role(raw),
        content: raw.content.clone().unwrap_or_default(),
        agent_id: raw.agent_identifier().map(str::to_string),
        agent_name: raw.agent_name.clone(),
        tool_calls: raw.tool_calls.clone(),
        tool_name: raw.tool_name.clone(),
        tool_result: raw.tool_result.clone(),
        source: non_empty_or(raw.source.as_deref(), "openclaw_conversation"),
        kind: non_empty_or(raw.kind.as_deref(), "message"),
        memory_shard_id: rotation::shard_label(config, now),
        logged_at: now,
    }
}

fn non_empty_or(value: Option<&str>, default: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

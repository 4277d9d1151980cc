use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One message event as handed to us on stdin.
///
/// Every field is optional — upstream hooks send whatever subset they have
/// and the builder fills in documented defaults.  Unknown extra fields are
/// ignored rather than rejected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMessage {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// `Some` whenever the key was present in the input, even as JSON
    /// `null` — upstream sends `"tool_calls": [...] | null`, and the key
    /// being there matters for role classification.
    #[serde(default, deserialize_with = "present_value")]
    pub tool_calls: Option<Value>,
    #[serde(default, deserialize_with = "present_value")]
    pub tool_result: Option<Value>,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub agent_id: Option<String>,
    /// Some callers send `subagent_id` instead of `agent_id`; kept separate
    /// so a message carrying both still parses (`agent_id` wins).
    #[serde(default)]
    pub subagent_id: Option<String>,
    #[serde(default)]
    pub agent_name: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl RawMessage {
    /// First non-empty agent identifier: `agent_id`, else `subagent_id`.
    pub fn agent_identifier(&self) -> Option<&str> {
        self.agent_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or_else(|| self.subagent_id.as_deref().filter(|id| !id.is_empty()))
    }
}

/// The durable unit of record, written verbatim to both sinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub timestamp: String,
    pub session_id: String,
    pub role: String,
    pub role_tag: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub tool_calls: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub tool_result: Option<Value>,
    pub source: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub memory_shard_id: String,
    /// Always set by the builder from its injected clock, never trusted
    /// from input.
    pub logged_at: DateTime<Utc>,
}

impl CanonicalRecord {
    /// Date-only portion of the message timestamp: everything before the
    /// `T` separator, else the first ten characters.
    pub fn timestamp_date(&self) -> &str {
        match self.timestamp.split_once('T') {
            Some((date, _)) => date,
            None => truncate_str(&self.timestamp, 10),
        }
    }
}

/// Deserializes a field so that a present key always yields `Some`, even
/// when its value is JSON `null`.  Plain `Option<Value>` would collapse an
/// explicit `null` into the same `None` as an absent key.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// `true` when a JSON value carries actual content.  `null`, `false`, `""`,
/// `0`, `[]` and `{}` are all falsy.
pub fn value_is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Truncate `s` to at most `max_chars` Unicode scalar values, returning a
/// sub-slice.  Never splits a multi-byte character.
pub fn truncate_str(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

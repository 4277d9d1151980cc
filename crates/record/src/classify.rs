use crate::schema::{RawMessage, value_is_truthy};

/// Derive the canonical role tag for a message.  Pure; always returns a
/// non-empty string.
///
/// Precedence, first match wins:
///
/// | Rule | Condition                                   | Tag              |
/// |------|---------------------------------------------|------------------|
/// | 1    | non-empty `agent_id` (or `subagent_id`)     | `agent:{id}`     |
/// | 2    | `source` starts with `agent:`               | `source` as-is   |
/// | 3    | `type` is `system` / `heartbeat` / `cron`   | `system`         |
/// | 4    | `tool_calls` present and truthy `tool_result` | `tool`         |
/// | 5    | otherwise                                   | raw `role`       |
pub fn classify_role(raw: &RawMessage) -> String {
    if let Some(agent_id) = raw.agent_identifier() {
        return format!("agent:{agent_id}");
    }

    if let Some(source) = raw.source.as_deref() {
        if source.starts_with("agent:") {
            return source.to_string();
        }
    }

    if let Some(kind) = raw.kind.as_deref() {
        if matches!(kind, "system" | "heartbeat" | "cron") {
            return "system".to_string();
        }
    }

    if raw.tool_calls.is_some() && raw.tool_result.as_ref().is_some_and(value_is_truthy) {
        return "tool".to_string();
    }

    raw.role
        .as_deref()
        .filter(|r| !r.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::classify_role;
    use crate::schema::RawMessage;

    fn msg(value: serde_json::Value) -> RawMessage {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn agent_id_wins_over_everything() {
        let raw = msg(json!({
            "agent_id": "r1",
            "source": "agent:other",
            "type": "system",
            "role": "assistant",
        }));
        assert_eq!(classify_role(&raw), "agent:r1");
    }

    #[test]
    fn subagent_id_counts_as_agent() {
        let raw = msg(json!({"subagent_id": "scout"}));
        assert_eq!(classify_role(&raw), "agent:scout");
    }

    #[test]
    fn empty_agent_id_falls_through() {
        let raw = msg(json!({"agent_id": "", "role": "assistant"}));
        assert_eq!(classify_role(&raw), "assistant");
    }

    #[test]
    fn agent_source_passes_through_unchanged() {
        let raw = msg(json!({"source": "agent:researcher", "role": "assistant"}));
        assert_eq!(classify_role(&raw), "agent:researcher");
    }

    #[test]
    fn system_like_types_map_to_system() {
        for kind in ["system", "heartbeat", "cron"] {
            let raw = msg(json!({"type": kind, "role": "assistant"}));
            assert_eq!(classify_role(&raw), "system", "type={kind}");
        }
    }

    #[test]
    fn other_types_do_not_map_to_system() {
        let raw = msg(json!({"type": "message", "role": "user"}));
        assert_eq!(classify_role(&raw), "user");
    }

    #[test]
    fn tool_calls_with_truthy_result_is_tool() {
        let raw = msg(json!({
            "role": "assistant",
            "tool_calls": [{"name": "read_file"}],
            "tool_result": "file contents",
        }));
        assert_eq!(classify_role(&raw), "tool");
    }

    #[test]
    fn null_tool_calls_key_with_truthy_result_is_tool() {
        // Upstream sends `"tool_calls": [...] | null`; the key being
        // present is what counts for rule 4, not its value.
        let raw = msg(json!({
            "role": "assistant",
            "tool_calls": null,
            "tool_result": "ok",
        }));
        assert_eq!(classify_role(&raw), "tool");
    }

    #[test]
    fn tool_calls_without_result_keeps_role() {
        let raw = msg(json!({
            "role": "assistant",
            "tool_calls": [{"name": "read_file"}],
        }));
        assert_eq!(classify_role(&raw), "assistant");
    }

    #[test]
    fn tool_calls_with_falsy_result_keeps_role() {
        for falsy in [json!(null), json!(false), json!(""), json!([])] {
            let raw = msg(json!({
                "role": "assistant",
                "tool_calls": [{}],
                "tool_result": falsy,
            }));
            assert_eq!(classify_role(&raw), "assistant");
        }
    }

    #[test]
    fn plain_roles_pass_through() {
        assert_eq!(classify_role(&msg(json!({"role": "user"}))), "user");
        assert_eq!(classify_role(&msg(json!({"role": "assistant"}))), "assistant");
    }

    #[test]
    fn missing_role_defaults_to_unknown() {
        assert_eq!(classify_role(&msg(json!({}))), "unknown");
        assert_eq!(classify_role(&msg(json!({"role": ""}))), "unknown");
    }
}

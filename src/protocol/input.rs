use serde::Deserialize;
use serde_json::Value;

/// The payload Claude Code sends on stdin when it invokes a hook.
///
/// Tool events carry `tool_name`/`tool_input`; lifecycle events carry their
/// own optional fields. Only `hook_event_name` is required. Unknown fields are
/// silently ignored for forward compatibility.
#[derive(Debug, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub transcript_path: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    pub hook_event_name: HookEvent,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub tool_input: Value,
    /// Notification text (`Notification`).
    #[serde(default)]
    pub message: Option<String>,
    /// Set when Claude is already continuing because of a stop hook (`Stop`).
    #[serde(default)]
    pub stop_hook_active: bool,
    /// `manual` or `auto` (`PreCompact`).
    #[serde(default)]
    pub trigger: Option<String>,
}

/// Hook lifecycle points. Names match the JSON sent by Claude Code.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub enum HookEvent {
    PreToolUse,
    PostToolUse,
    Stop,
    SubagentStop,
    Notification,
    PreCompact,
    UserPromptSubmit,
    SessionStart,
    #[serde(other)]
    Other,
}

impl HookEvent {
    /// Events that describe a tool invocation.
    pub fn is_tool_event(self) -> bool {
        matches!(self, HookEvent::PreToolUse | HookEvent::PostToolUse)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HookEvent::PreToolUse => "PreToolUse",
            HookEvent::PostToolUse => "PostToolUse",
            HookEvent::Stop => "Stop",
            HookEvent::SubagentStop => "SubagentStop",
            HookEvent::Notification => "Notification",
            HookEvent::PreCompact => "PreCompact",
            HookEvent::UserPromptSubmit => "UserPromptSubmit",
            HookEvent::SessionStart => "SessionStart",
            HookEvent::Other => "Other",
        }
    }
}

impl HookInput {
    /// Parse the raw stdin payload.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Working directory for relative path resolution; falls back to the
    /// process cwd, then `/`.
    pub fn cwd_or_current(&self) -> String {
        match &self.cwd {
            Some(cwd) if !cwd.is_empty() => cwd.clone(),
            _ => std::env::current_dir()
                .ok()
                .and_then(|p| p.to_str().map(String::from))
                .unwrap_or_else(|| "/".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_input_json() -> Value {
        json!({
            "session_id": "sess-123",
            "transcript_path": "/tmp/transcript.jsonl",
            "cwd": "/home/user/project",
            "hook_event_name": "PreToolUse",
            "tool_name": "Write",
            "tool_input": {"file_path": "src/app.css", "content": "body {}"}
        })
    }

    #[test]
    fn parse_tool_event() {
        let input: HookInput =
            serde_json::from_value(write_input_json()).expect("should parse valid input");

        assert_eq!(input.session_id.as_deref(), Some("sess-123"));
        assert_eq!(input.cwd.as_deref(), Some("/home/user/project"));
        assert_eq!(input.hook_event_name, HookEvent::PreToolUse);
        assert_eq!(input.tool_name.as_deref(), Some("Write"));
        assert_eq!(input.tool_input["content"], "body {}");
        assert!(!input.stop_hook_active);
    }

    #[test]
    fn parse_lifecycle_events() {
        let stop = HookInput::from_json(
            r#"{"hook_event_name": "Stop", "session_id": "s", "stop_hook_active": true}"#,
        )
        .unwrap();
        assert_eq!(stop.hook_event_name, HookEvent::Stop);
        assert!(stop.stop_hook_active);
        assert!(stop.tool_input.is_null());

        let compact =
            HookInput::from_json(r#"{"hook_event_name": "PreCompact", "trigger": "auto"}"#)
                .unwrap();
        assert_eq!(compact.trigger.as_deref(), Some("auto"));

        let note = HookInput::from_json(
            r#"{"hook_event_name": "Notification", "message": "Claude needs input"}"#,
        )
        .unwrap();
        assert_eq!(note.message.as_deref(), Some("Claude needs input"));
    }

    #[test]
    fn unknown_event_name_is_other() {
        let input = HookInput::from_json(r#"{"hook_event_name": "SomethingNew"}"#).unwrap();
        assert_eq!(input.hook_event_name, HookEvent::Other);
        assert!(!input.hook_event_name.is_tool_event());
    }

    #[test]
    fn missing_event_name_is_an_error() {
        assert!(HookInput::from_json(r#"{"tool_name": "Write"}"#).is_err());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let mut input = write_input_json();
        input["brandNewField"] = json!("surprise");
        let parsed: HookInput =
            serde_json::from_value(input).expect("unknown fields should not cause failure");
        assert_eq!(parsed.session_id.as_deref(), Some("sess-123"));
    }

    #[test]
    fn empty_cwd_falls_back_to_process_dir() {
        let input = HookInput::from_json(r#"{"hook_event_name": "Stop", "cwd": ""}"#).unwrap();
        assert!(input.cwd_or_current().starts_with('/'));
    }
}

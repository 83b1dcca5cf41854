//! Tooling for Claude Code `settings.json`: audit, hook patching and merge.
//!
//! Documents are handled as [`serde_json::Value`] so keys this crate does
//! not know about survive a rewrite untouched and in their original order.

mod audit;
mod merge;
mod patch;

pub use audit::{audit, AuditFinding, AuditSeverity};
pub use merge::merge;
pub use patch::{add_hook, remove_hook};

/// Hook events Claude Code recognizes in `settings.json`.
pub const KNOWN_EVENTS: &[&str] = &[
    "PreToolUse",
    "PostToolUse",
    "Notification",
    "UserPromptSubmit",
    "Stop",
    "SubagentStop",
    "PreCompact",
    "SessionStart",
];

/// Events whose groups are filtered by `matcher`.
pub(crate) fn uses_matcher(event: &str) -> bool {
    matches!(event, "PreToolUse" | "PostToolUse")
}

/// Matchers that select every tool.
pub(crate) fn is_match_all(matcher: &str) -> bool {
    matcher.is_empty() || matcher == "*"
}

/// Matcher of a hook group; missing or match-all matchers compare equal.
pub(crate) fn group_matcher(group: &serde_json::Value) -> &str {
    match group.get("matcher").and_then(|m| m.as_str()) {
        Some(m) if !is_match_all(m) => m,
        _ => "",
    }
}

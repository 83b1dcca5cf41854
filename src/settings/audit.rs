use std::collections::HashSet;
use std::fmt;

use regex::Regex;
use serde_json::{Map, Value};

use super::{group_matcher, is_match_all, uses_matcher, KNOWN_EVENTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AuditSeverity {
    Warning,
    Error,
}

impl fmt::Display for AuditSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AuditSeverity::Warning => "warning",
            AuditSeverity::Error => "error",
        })
    }
}

/// One problem found in a settings document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditFinding {
    pub severity: AuditSeverity,
    /// JSON pointer to the offending value (`""` is the root).
    pub path: String,
    pub message: String,
}

impl fmt::Display for AuditFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{} {path}: {}", self.severity, self.message)
    }
}

/// Permission lists checked for shape and conflicts.
const PERMISSION_LISTS: &[&str] = &["allow", "deny", "ask"];

#[derive(Default)]
struct Auditor {
    findings: Vec<AuditFinding>,
}

impl Auditor {
    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.push(AuditSeverity::Error, path.into(), message.into());
    }

    fn warning(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.push(AuditSeverity::Warning, path.into(), message.into());
    }

    fn push(&mut self, severity: AuditSeverity, path: String, message: String) {
        self.findings.push(AuditFinding {
            severity,
            path,
            message,
        });
    }
}

/// Escape a key for use in a JSON pointer (RFC 6901).
fn pointer_token(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

/// Check a `settings.json` document for structural problems.
///
/// Findings are reported in document order. Unknown top-level keys are
/// left alone; only `hooks` and `permissions` are inspected.
pub fn audit(settings: &Value) -> Vec<AuditFinding> {
    let mut auditor = Auditor::default();
    let Some(root) = settings.as_object() else {
        auditor.error("", "settings root must be a JSON object");
        return auditor.findings;
    };

    if let Some(hooks) = root.get("hooks") {
        audit_hooks(&mut auditor, hooks);
    }
    if let Some(permissions) = root.get("permissions") {
        audit_permissions(&mut auditor, permissions);
    }
    auditor.findings
}

fn audit_hooks(auditor: &mut Auditor, hooks: &Value) {
    let Some(events) = hooks.as_object() else {
        auditor.error("/hooks", "\"hooks\" must be an object keyed by event name");
        return;
    };

    for (event, groups) in events {
        let event_path = format!("/hooks/{}", pointer_token(event));
        if !KNOWN_EVENTS.contains(&event.as_str()) {
            auditor.warning(
                event_path.as_str(),
                format!(
                    "unknown hook event '{event}'; expected one of: {}",
                    KNOWN_EVENTS.join(", ")
                ),
            );
        }
        let Some(groups) = groups.as_array() else {
            auditor.error(event_path, "event value must be an array of hook groups");
            continue;
        };

        let mut seen: HashSet<(String, String)> = HashSet::new();
        for (gi, group) in groups.iter().enumerate() {
            let group_path = format!("{event_path}/{gi}");
            if !group.is_object() {
                auditor.error(group_path, "hook group must be an object");
                continue;
            }
            audit_matcher(auditor, event, &group_path, group.get("matcher"));

            let Some(list) = group.get("hooks").and_then(Value::as_array) else {
                auditor.error(
                    format!("{group_path}/hooks"),
                    "hook group needs a \"hooks\" array",
                );
                continue;
            };
            for (hi, hook) in list.iter().enumerate() {
                let hook_path = format!("{group_path}/hooks/{hi}");
                if let Some(command) = audit_hook(auditor, &hook_path, hook) {
                    let key = (group_matcher(group).to_string(), command.to_string());
                    if !seen.insert(key) {
                        auditor.warning(
                            format!("{hook_path}/command"),
                            format!("duplicate command '{command}' for {event}"),
                        );
                    }
                }
            }
        }
    }
}

fn audit_matcher(auditor: &mut Auditor, event: &str, group_path: &str, matcher: Option<&Value>) {
    let Some(matcher) = matcher else {
        return;
    };
    let path = format!("{group_path}/matcher");
    let Some(pattern) = matcher.as_str() else {
        auditor.error(path, "matcher must be a string");
        return;
    };
    if !is_match_all(pattern) {
        if let Err(e) = Regex::new(pattern) {
            auditor.error(path.as_str(), format!("matcher is not a valid regex: {e}"));
        }
    }
    if !uses_matcher(event) {
        auditor.warning(path, format!("{event} ignores matchers"));
    }
}

/// Audit one hook entry; returns its command when usable.
fn audit_hook<'v>(auditor: &mut Auditor, hook_path: &str, hook: &'v Value) -> Option<&'v str> {
    let Some(entry) = hook.as_object() else {
        auditor.error(hook_path, "hook must be an object");
        return None;
    };

    match entry.get("type").and_then(Value::as_str) {
        Some("command") => {}
        Some(other) => auditor.error(
            format!("{hook_path}/type"),
            format!("unsupported hook type '{other}'; expected \"command\""),
        ),
        None => auditor.error(format!("{hook_path}/type"), "hook type is missing"),
    }

    if let Some(timeout) = entry.get("timeout") {
        if !timeout.as_f64().is_some_and(|t| t > 0.0) {
            auditor.error(
                format!("{hook_path}/timeout"),
                "timeout must be a positive number of seconds",
            );
        }
    }

    match entry.get("command").and_then(Value::as_str) {
        Some(command) if !command.trim().is_empty() => Some(command),
        _ => {
            auditor.error(
                format!("{hook_path}/command"),
                "hook command is missing or empty",
            );
            None
        }
    }
}

fn audit_permissions(auditor: &mut Auditor, permissions: &Value) {
    let Some(lists) = permissions.as_object() else {
        auditor.error("/permissions", "\"permissions\" must be an object");
        return;
    };

    for name in PERMISSION_LISTS {
        let Some(list) = lists.get(*name) else {
            continue;
        };
        let path = format!("/permissions/{name}");
        let well_formed = list
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string));
        if !well_formed {
            auditor.error(path, format!("permissions.{name} must be an array of strings"));
        }
    }

    let deny = string_items(lists, "deny");
    for (i, rule) in string_items(lists, "allow").into_iter().enumerate() {
        if deny.contains(&rule) {
            auditor.warning(
                format!("/permissions/allow/{i}"),
                format!("'{rule}' is both allowed and denied; deny takes precedence"),
            );
        }
    }
}

fn string_items<'a>(lists: &'a Map<String, Value>, name: &str) -> Vec<&'a str> {
    lists
        .get(name)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

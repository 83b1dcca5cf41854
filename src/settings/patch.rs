use serde_json::{json, Map, Value};

use super::group_matcher;

/// Add a command hook under `event`, reusing the group with the same matcher.
///
/// Idempotent: returns `false` when the command is already registered for
/// that event and matcher. Missing or non-object containers are replaced.
pub fn add_hook(
    settings: &mut Value,
    event: &str,
    matcher: Option<&str>,
    command: &str,
    timeout: Option<u64>,
) -> bool {
    if !settings.is_object() {
        *settings = Value::Object(Map::new());
    }
    let Some(root) = settings.as_object_mut() else {
        return false;
    };

    let hooks = root
        .entry("hooks")
        .or_insert_with(|| Value::Object(Map::new()));
    if !hooks.is_object() {
        *hooks = Value::Object(Map::new());
    }
    let Some(hooks) = hooks.as_object_mut() else {
        return false;
    };

    let groups = hooks
        .entry(event)
        .or_insert_with(|| Value::Array(Vec::new()));
    if !groups.is_array() {
        *groups = Value::Array(Vec::new());
    }
    let Some(groups) = groups.as_array_mut() else {
        return false;
    };

    let wanted = match matcher {
        Some(m) if !super::is_match_all(m) => m,
        _ => "",
    };
    let mut entry = json!({"type": "command", "command": command});
    if let Some(timeout) = timeout {
        entry["timeout"] = json!(timeout);
    }

    let existing = groups
        .iter()
        .position(|g| g.is_object() && group_matcher(g) == wanted);
    match existing {
        Some(idx) => {
            let group = &mut groups[idx];
            if !group.get("hooks").is_some_and(Value::is_array) {
                group["hooks"] = Value::Array(Vec::new());
            }
            let Some(list) = group.get_mut("hooks").and_then(Value::as_array_mut) else {
                return false;
            };
            if list.iter().any(|h| hook_command(h) == Some(command)) {
                return false;
            }
            list.push(entry);
        }
        None => {
            let mut group = Map::new();
            if let Some(m) = matcher {
                group.insert("matcher".to_string(), json!(m));
            }
            group.insert("hooks".to_string(), json!([entry]));
            groups.push(Value::Object(group));
        }
    }

    tracing::debug!(event, matcher = wanted, command, "hook added");
    true
}

/// Remove every hook whose command is `command`, pruning emptied groups
/// and events. Returns the number of hooks removed.
pub fn remove_hook(settings: &mut Value, command: &str) -> usize {
    let Some(hooks) = settings.get_mut("hooks").and_then(Value::as_object_mut) else {
        return 0;
    };

    let mut removed = 0;
    let mut emptied_events = Vec::new();
    for (event, groups) in hooks.iter_mut() {
        let Some(groups) = groups.as_array_mut() else {
            continue;
        };
        let mut emptied_groups = Vec::new();
        for (idx, group) in groups.iter_mut().enumerate() {
            if let Some(list) = group.get_mut("hooks").and_then(Value::as_array_mut) {
                let before = list.len();
                list.retain(|h| hook_command(h) != Some(command));
                removed += before - list.len();
                if before > 0 && list.is_empty() {
                    emptied_groups.push(idx);
                }
            }
        }
        if emptied_groups.is_empty() {
            continue;
        }
        let mut idx = 0;
        groups.retain(|_| {
            let keep = !emptied_groups.contains(&idx);
            idx += 1;
            keep
        });
        if groups.is_empty() {
            emptied_events.push(event.clone());
        }
    }
    if !emptied_events.is_empty() {
        hooks.retain(|event, _| !emptied_events.contains(event));
    }

    tracing::debug!(command, removed, "hooks removed");
    removed
}

pub(crate) fn hook_command(hook: &Value) -> Option<&str> {
    hook.get("command").and_then(Value::as_str)
}

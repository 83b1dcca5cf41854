use serde_json::{Map, Value};

use super::group_matcher;
use super::patch::hook_command;

/// Layer `overlay` on top of `base`.
///
/// Objects merge recursively, arrays union in order without duplicates and
/// scalars come from the overlay. `hooks` is merged by event and matcher so
/// the same hook group in both files ends up once.
pub fn merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(b), Value::Object(o)) => {
            let mut merged = b.clone();
            for (key, value) in o {
                let next = match (key.as_str(), merged.get(key)) {
                    ("hooks", Some(existing)) => merge_hooks(existing, value),
                    (_, Some(existing)) => merge_value(existing, value),
                    (_, None) => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        _ => overlay.clone(),
    }
}

fn merge_value(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(b), Value::Object(o)) => {
            let mut merged = b.clone();
            for (key, value) in o {
                let next = match merged.get(key) {
                    Some(existing) => merge_value(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        (Value::Array(b), Value::Array(o)) => {
            let mut merged = b.clone();
            for item in o {
                if !merged.contains(item) {
                    merged.push(item.clone());
                }
            }
            Value::Array(merged)
        }
        _ => overlay.clone(),
    }
}

fn merge_hooks(base: &Value, overlay: &Value) -> Value {
    let (Value::Object(b), Value::Object(o)) = (base, overlay) else {
        return overlay.clone();
    };
    let mut merged: Map<String, Value> = b.clone();
    for (event, groups) in o {
        let next = match (merged.get(event), groups) {
            (Some(Value::Array(existing)), Value::Array(incoming)) => {
                Value::Array(merge_groups(existing, incoming))
            }
            _ => groups.clone(),
        };
        merged.insert(event.clone(), next);
    }
    Value::Object(merged)
}

fn merge_groups(base: &[Value], overlay: &[Value]) -> Vec<Value> {
    let mut merged = base.to_vec();
    for group in overlay {
        let target = merged.iter().position(|g| {
            g.is_object() && group.is_object() && group_matcher(g) == group_matcher(group)
        });
        let Some(idx) = target else {
            merged.push(group.clone());
            continue;
        };

        let incoming = group
            .get("hooks")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let existing = &mut merged[idx];
        if !existing.get("hooks").is_some_and(Value::is_array) {
            existing["hooks"] = Value::Array(Vec::new());
        }
        if let Some(list) = existing.get_mut("hooks").and_then(Value::as_array_mut) {
            for hook in incoming {
                let duplicate = match hook_command(&hook) {
                    Some(command) => list.iter().any(|h| hook_command(h) == Some(command)),
                    None => list.contains(&hook),
                };
                if !duplicate {
                    list.push(hook);
                }
            }
        }
    }
    merged
}

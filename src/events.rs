//! Side effects for lifecycle events: the JSONL event log and transcript
//! backups before compaction.
//!
//! Failures here are reported as warnings; a lifecycle hook never blocks.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::config::EventsConfig;
use crate::path;
use crate::protocol::{HookEvent, HookInput, Outcome};

/// Error from an event side effect.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error(transparent)]
    Path(#[from] path::PathError),
    #[error("failed to write event log {path}: {source}")]
    Log {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to back up transcript {from} to {to}: {source}")]
    Backup {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

/// One line of the event log.
#[derive(Debug, Serialize)]
struct EventRecord<'a> {
    timestamp: String,
    event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trigger: Option<&'a str>,
}

/// Handle a lifecycle event and report any failed side effect as a warning.
pub fn handle(input: &HookInput, config: &EventsConfig) -> Outcome {
    if matches!(
        input.hook_event_name,
        HookEvent::Stop | HookEvent::SubagentStop
    ) && input.stop_hook_active
    {
        tracing::debug!("stop hook already active, allowing");
        return Outcome::allow();
    }

    let now = Utc::now();
    let cwd = input.cwd_or_current();
    let mut outcome = Outcome::allow();

    if input.hook_event_name == HookEvent::PreCompact {
        if let Err(e) = backup_transcript(input, config, &cwd, now) {
            tracing::warn!(error = %e, "transcript backup failed");
            outcome = outcome.merge(Outcome::warn(format!("claude-hookkit [events] {e}")));
        }
    }

    if let Err(e) = append_log(input, config, &cwd, now) {
        tracing::warn!(error = %e, "event log write failed");
        outcome = outcome.merge(Outcome::warn(format!("claude-hookkit [events] {e}")));
    }

    outcome
}

fn append_log(
    input: &HookInput,
    config: &EventsConfig,
    cwd: &str,
    now: DateTime<Utc>,
) -> Result<(), EventError> {
    let Some(log) = config.log.as_deref() else {
        return Ok(());
    };
    let log_path = configured_path(log, cwd)?;

    let record = EventRecord {
        timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        event: input.hook_event_name.as_str(),
        session_id: input.session_id.as_deref(),
        message: input.message.as_deref(),
        trigger: input.trigger.as_deref(),
    };
    let line = serde_json::to_string(&record).map_err(|e| EventError::Log {
        path: log_path.clone(),
        source: e.into(),
    })?;

    let io_err = |source| EventError::Log {
        path: log_path.clone(),
        source,
    };
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(io_err)?;
    writeln!(file, "{line}").map_err(io_err)?;

    tracing::info!(path = %log_path.display(), event = record.event, "event logged");
    Ok(())
}

fn backup_transcript(
    input: &HookInput,
    config: &EventsConfig,
    cwd: &str,
    now: DateTime<Utc>,
) -> Result<Option<PathBuf>, EventError> {
    let (Some(dir), Some(transcript)) = (
        config.backup_dir.as_deref(),
        input.transcript_path.as_deref(),
    ) else {
        return Ok(None);
    };
    let from = PathBuf::from(path::normalize(transcript, cwd)?);
    if !from.is_file() {
        tracing::debug!(path = %from.display(), "no transcript to back up");
        return Ok(None);
    }

    let dir = configured_path(dir, cwd)?;
    let to = backup_path(&dir, input.session_id.as_deref(), now);
    let io_err = |source| EventError::Backup {
        from: from.clone(),
        to: to.clone(),
        source,
    };
    std::fs::create_dir_all(&dir).map_err(io_err)?;
    std::fs::copy(&from, &to).map_err(io_err)?;

    tracing::info!(from = %from.display(), to = %to.display(), "transcript backed up");
    Ok(Some(to))
}

/// Config path with placeholders expanded; relative paths are under `cwd`.
fn configured_path(raw: &str, cwd: &str) -> Result<PathBuf, EventError> {
    let expanded = path::expand_pattern(raw, cwd)?;
    Ok(PathBuf::from(path::normalize(&expanded, cwd)?))
}

/// `<dir>/<session>-<YYYYmmddTHHMMSSZ>.jsonl`
///
/// The session id is reduced to `[A-Za-z0-9._-]` so it stays one file name.
fn backup_path(dir: &Path, session_id: Option<&str>, now: DateTime<Utc>) -> PathBuf {
    let session: String = match session_id.filter(|s| !s.is_empty()) {
        Some(id) => id
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '_' | '-' => c,
                _ => '_',
            })
            .collect(),
        None => "unknown".to_string(),
    };
    dir.join(format!("{session}-{}.jsonl", now.format("%Y%m%dT%H%M%SZ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Verdict;
    use chrono::TimeZone;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn input(value: Value) -> HookInput {
        HookInput::from_json(&value.to_string()).unwrap()
    }

    fn config(log: Option<&Path>, backup_dir: Option<&Path>) -> EventsConfig {
        EventsConfig {
            log: log.map(|p| p.display().to_string()),
            backup_dir: backup_dir.map(|p| p.display().to_string()),
        }
    }

    fn log_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn nothing_configured_allows() {
        let outcome = handle(
            &input(json!({"hook_event_name": "Stop"})),
            &EventsConfig::default(),
        );
        assert_eq!(outcome.verdict, Verdict::Allow);
    }

    #[test]
    fn events_are_appended_as_json_lines() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("logs/events.jsonl");
        let cfg = config(Some(&log), None);

        let notification = json!({
            "hook_event_name": "Notification",
            "session_id": "s1",
            "message": "Waiting"
        });
        handle(&input(notification), &cfg);
        let compact = json!({
            "hook_event_name": "PreCompact",
            "session_id": "s1",
            "trigger": "auto"
        });
        handle(&input(compact), &cfg);

        let lines = log_lines(&log);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "Notification");
        assert_eq!(lines[0]["message"], "Waiting");
        assert!(lines[0].get("trigger").is_none());
        assert_eq!(lines[1]["event"], "PreCompact");
        assert_eq!(lines[1]["trigger"], "auto");
        let ts = lines[0]["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(ts).is_ok(), "{ts}");
    }

    #[test]
    fn active_stop_hook_skips_side_effects() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("events.jsonl");
        let outcome = handle(
            &input(json!({"hook_event_name": "SubagentStop", "stop_hook_active": true})),
            &config(Some(&log), None),
        );
        assert_eq!(outcome.verdict, Verdict::Allow);
        assert!(!log.exists());
    }

    #[test]
    fn pre_compact_backs_up_transcript() {
        let dir = TempDir::new().unwrap();
        let transcript = dir.path().join("t.jsonl");
        std::fs::write(&transcript, "{\"role\":\"user\"}\n").unwrap();
        let backups = dir.path().join("backups");

        let outcome = handle(
            &input(json!({
                "hook_event_name": "PreCompact",
                "session_id": "abc",
                "transcript_path": transcript.display().to_string(),
            })),
            &config(None, Some(&backups)),
        );
        assert_eq!(outcome.verdict, Verdict::Allow);

        let copies: Vec<_> = std::fs::read_dir(&backups).unwrap().flatten().collect();
        assert_eq!(copies.len(), 1);
        let name = copies[0].file_name().into_string().unwrap();
        assert!(name.starts_with("abc-") && name.ends_with("Z.jsonl"), "{name}");
        assert_eq!(
            std::fs::read_to_string(copies[0].path()).unwrap(),
            "{\"role\":\"user\"}\n"
        );
    }

    #[test]
    fn missing_transcript_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let outcome = handle(
            &input(json!({
                "hook_event_name": "PreCompact",
                "transcript_path": dir.path().join("nope.jsonl").display().to_string(),
            })),
            &config(None, Some(&dir.path().join("backups"))),
        );
        assert_eq!(outcome.verdict, Verdict::Allow);
    }

    #[test]
    fn failed_log_write_warns() {
        let dir = TempDir::new().unwrap();
        // A directory where the log file should be.
        let outcome = handle(
            &input(json!({"hook_event_name": "SessionStart"})),
            &config(Some(dir.path()), None),
        );
        assert_eq!(outcome.verdict, Verdict::Warn);
        assert!(outcome.messages[0]
            .starts_with("claude-hookkit [events] failed to write event log"));
    }

    #[test]
    fn backup_file_name_uses_utc_timestamp() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(
            backup_path(Path::new("/b"), Some("s9"), now),
            PathBuf::from("/b/s9-20260304T050607Z.jsonl")
        );
        assert_eq!(
            backup_path(Path::new("/b"), None, now),
            PathBuf::from("/b/unknown-20260304T050607Z.jsonl")
        );
    }

    #[test]
    fn session_id_cannot_leave_backup_dir() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(
            backup_path(Path::new("/b"), Some("../../etc/x y"), now),
            PathBuf::from("/b/.._.._etc_x_y-20260304T050607Z.jsonl")
        );
    }

    #[test]
    fn relative_paths_resolve_against_payload_cwd() {
        let dir = TempDir::new().unwrap();
        let transcript = dir.path().join("t.jsonl");
        std::fs::write(&transcript, "{}\n").unwrap();
        let cfg = EventsConfig {
            log: Some("logs/events.jsonl".to_string()),
            backup_dir: Some("./backups/../backups".to_string()),
        };

        let outcome = handle(
            &input(json!({
                "hook_event_name": "PreCompact",
                "cwd": dir.path().display().to_string(),
                "transcript_path": "t.jsonl",
            })),
            &cfg,
        );
        assert_eq!(outcome.verdict, Verdict::Allow, "{:?}", outcome.messages);
        assert_eq!(log_lines(&dir.path().join("logs/events.jsonl")).len(), 1);
        assert_eq!(std::fs::read_dir(dir.path().join("backups")).unwrap().count(), 1);
    }
}

use std::io::Read;
use std::path::Path;

use crate::check::{self, APP_NAME};
use crate::config::Config;
use crate::protocol::{HookInput, Outcome};

/// Execute the hook subcommand: read JSON from stdin, evaluate, report.
///
/// Messages go to stderr and the verdict becomes the exit code (0 allow,
/// 1 warn, 2 block). Unreadable input and config errors are reported as
/// warnings so a broken hook never blocks the session.
pub fn run(config_path: Option<&Path>) -> i32 {
    let outcome = execute_from_stdin(config_path);
    let text = outcome.stderr_text();
    if !text.is_empty() {
        eprintln!("{text}");
    }
    outcome.exit_code()
}

fn execute_from_stdin(config_path: Option<&Path>) -> Outcome {
    let mut raw = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut raw) {
        tracing::warn!(error = %e, "failed to read stdin");
        return Outcome::warn(format!("{APP_NAME}: failed to read hook input: {e}"));
    }
    evaluate_payload(&raw, config_path)
}

fn evaluate_payload(raw: &str, config_path: Option<&Path>) -> Outcome {
    let input = match HookInput::from_json(raw) {
        Ok(input) => input,
        Err(e) => {
            tracing::warn!(error = %e, "invalid hook payload");
            return Outcome::warn(format!("{APP_NAME}: invalid hook input: {e}"));
        }
    };

    let cwd = input.cwd_or_current();
    let config = match Config::discover(config_path, &cwd) {
        Ok((config, source)) => {
            tracing::debug!(config = ?source, "config loaded");
            config
        }
        Err(e) => {
            tracing::warn!(error = %e, "config error");
            return Outcome::warn(format!("{APP_NAME}: config error: {e}"));
        }
    };

    let outcome = check::evaluate(&input, &config);
    tracing::info!(
        event = input.hook_event_name.as_str(),
        tool = input.tool_name.as_deref().unwrap_or("-"),
        verdict = %outcome.verdict,
        "hook evaluated"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Verdict;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn malformed_payload_warns() {
        let outcome = evaluate_payload("not json", None);
        assert_eq!(outcome.verdict, Verdict::Warn);
        assert!(outcome.messages[0].starts_with("claude-hookkit: invalid hook input"));
    }

    #[test]
    fn config_error_warns() {
        let mut config = NamedTempFile::new().unwrap();
        config.write_all(b"bogus-section").unwrap();
        let outcome = evaluate_payload(
            r#"{"hook_event_name":"PreToolUse","tool_name":"Bash","tool_input":{"command":"ls"}}"#,
            Some(config.path()),
        );
        assert_eq!(outcome.verdict, Verdict::Warn);
        assert!(outcome.messages[0].contains("config error"));
    }

    #[test]
    fn valid_payload_is_evaluated() {
        let outcome = evaluate_payload(
            r#"{"hook_event_name":"PreToolUse","cwd":"/tmp","tool_name":"Bash","tool_input":{"command":"git commit --no-verify"}}"#,
            None,
        );
        assert_eq!(outcome.verdict, Verdict::Block);
    }
}

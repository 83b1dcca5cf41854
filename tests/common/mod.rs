// Shared helpers for integration tests: run the real binary with piped stdin.
#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::NamedTempFile;

pub struct Run {
    pub stdout: String,
    pub stderr: String,
    pub code: i32,
}

pub fn binary_path() -> PathBuf {
    let path = PathBuf::from(env!("CARGO_BIN_EXE_claude-hookkit"));
    assert!(path.exists(), "binary not found at {}", path.display());
    path
}

/// Runs the binary with the given args and stdin.
pub fn run_args(args: &[&str], stdin_input: &str) -> Run {
    run_args_with_env(args, stdin_input, &[])
}

/// Like [`run_args`], with extra environment variables for the child.
pub fn run_args_with_env(args: &[&str], stdin_input: &str, env: &[(&str, &str)]) -> Run {
    let output = Command::new(binary_path())
        .args(args)
        .env_remove("CLAUDE_PROJECT_DIR")
        .env_remove("HOOKKIT_LOG")
        .envs(env.iter().copied())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .and_then(|mut child| {
            use std::io::ErrorKind;
            let write_result = child
                .stdin
                .take()
                .unwrap()
                .write_all(stdin_input.as_bytes());
            if let Err(e) = write_result {
                if e.kind() != ErrorKind::BrokenPipe {
                    return Err(e);
                }
            }
            child.wait_with_output()
        })
        .expect("failed to execute binary");

    Run {
        stdout: String::from_utf8(output.stdout).expect("stdout not valid UTF-8"),
        stderr: String::from_utf8(output.stderr).expect("stderr not valid UTF-8"),
        code: output.status.code().unwrap_or(-1),
    }
}

pub fn run_hook(stdin_input: &str) -> Run {
    run_args(&["hook"], stdin_input)
}

pub fn run_hook_with_config(stdin_input: &str, config_content: &str) -> Run {
    let mut tmpfile = NamedTempFile::new().expect("failed to create temp config");
    tmpfile
        .write_all(config_content.as_bytes())
        .expect("failed to write config");
    let config_path = tmpfile.path().to_str().unwrap().to_string();
    run_args(&["hook", "--config", &config_path], stdin_input)
}

/// Tool-event payload with a cwd that has no `.claude/hookkit.kdl`.
pub fn tool_input_json(tool_name: &str, tool_input: serde_json::Value) -> String {
    serde_json::json!({
        "session_id": "sess-e2e-test",
        "transcript_path": "/tmp/transcript.jsonl",
        "cwd": "/tmp/hookkit-e2e",
        "hook_event_name": "PreToolUse",
        "tool_name": tool_name,
        "tool_input": tool_input,
    })
    .to_string()
}

pub fn bash_input_json(command: &str) -> String {
    tool_input_json("Bash", serde_json::json!({"command": command}))
}

pub fn write_input_json(file_path: &str, content: &str) -> String {
    tool_input_json(
        "Write",
        serde_json::json!({"file_path": file_path, "content": content}),
    )
}

pub fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp path is UTF-8")
}

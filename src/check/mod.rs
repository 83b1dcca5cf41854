mod aggregation;
mod design_tokens;
mod pii;
mod protected_files;
mod shell;
mod tcpa;

use std::fmt;

use crate::config::{CheckKind, Config};
use crate::events;
use crate::protocol::{HookEvent, HookInput, Outcome, ToolUse, Verdict};

pub(crate) use aggregation::aggregate;

pub(crate) const APP_NAME: &str = "claude-hookkit";

/// One rule hit reported by a check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub check: CheckKind,
    pub rule: String,
    pub severity: Verdict,
    /// 1-based line in the written text, when the finding comes from content.
    pub line: Option<usize>,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{APP_NAME} [{}] {}: {}",
            self.check.as_str(),
            self.rule,
            self.message
        )?;
        if let Some(line) = self.line {
            write!(f, " (line {line})")?;
        }
        Ok(())
    }
}

/// Everything a check may look at, derived once per hook run.
pub(crate) struct CheckContext<'a> {
    pub tool_use: &'a ToolUse,
    pub cwd: &'a str,
    /// File path as sent by the tool.
    pub raw_path: Option<&'a str>,
    /// Normalized absolute path; `Err` holds the reason normalization failed.
    pub path: Option<Result<String, String>>,
    /// Text introduced by a write-like tool.
    pub text: Option<String>,
}

impl<'a> CheckContext<'a> {
    pub(crate) fn new(tool_use: &'a ToolUse, cwd: &'a str) -> Self {
        let raw_path = tool_use.file_path();
        CheckContext {
            tool_use,
            cwd,
            raw_path,
            path: raw_path.map(|p| crate::path::normalize(p, cwd).map_err(|e| e.to_string())),
            text: tool_use.written_text(),
        }
    }

    /// Normalized path when available.
    pub(crate) fn normalized_path(&self) -> Option<&str> {
        match &self.path {
            Some(Ok(p)) => Some(p),
            _ => None,
        }
    }
}

/// A content or command check run on tool events.
pub(crate) trait Check {
    fn kind(&self) -> CheckKind;

    /// Inspect the tool call. An empty result means no opinion.
    fn inspect(&self, ctx: &CheckContext<'_>) -> Vec<Finding>;
}

/// Instantiate the enabled checks in run order.
pub(crate) fn build_checks(config: &Config) -> Vec<Box<dyn Check + '_>> {
    CheckKind::ALL
        .into_iter()
        .filter(|&kind| config.is_enabled(kind))
        .map(|kind| build_check(kind, config))
        .collect()
}

fn build_check<'c>(kind: CheckKind, config: &'c Config) -> Box<dyn Check + 'c> {
    match kind {
        CheckKind::ProtectedFiles => Box::new(protected_files::ProtectedFilesCheck::new(
            &config.protected_files,
        )),
        CheckKind::Shell => Box::new(shell::ShellCheck::new(&config.shell)),
        CheckKind::Pii => Box::new(pii::PiiCheck::new(&config.pii)),
        CheckKind::DesignTokens => {
            Box::new(design_tokens::DesignTokenCheck::new(&config.design_tokens))
        }
        CheckKind::Tcpa => Box::new(tcpa::TcpaCheck::new(&config.tcpa)),
    }
}

/// Evaluate a hook payload against the config and return the outcome.
///
/// - Tool events run every enabled check and aggregate the findings
/// - Lifecycle events are handed to [`crate::events`]
/// - Unknown events are allowed silently
///
/// # Examples
///
/// ```
/// use claude_hookkit::check::evaluate;
/// use claude_hookkit::config::Config;
/// use claude_hookkit::protocol::{HookInput, Verdict};
///
/// let input = HookInput::from_json(r#"{
///     "hook_event_name": "PreToolUse",
///     "cwd": "/project",
///     "tool_name": "Bash",
///     "tool_input": {"command": "git commit --no-verify -m wip"}
/// }"#).unwrap();
///
/// let outcome = evaluate(&input, &Config::default());
/// assert_eq!(outcome.verdict, Verdict::Block);
/// assert_eq!(outcome.exit_code(), 2);
/// ```
pub fn evaluate(input: &HookInput, config: &Config) -> Outcome {
    match input.hook_event_name {
        HookEvent::PreToolUse | HookEvent::PostToolUse => evaluate_tool(input, config),
        HookEvent::Other => Outcome::allow(),
        _ => events::handle(input, &config.events),
    }
}

fn evaluate_tool(input: &HookInput, config: &Config) -> Outcome {
    let Some(tool_name) = input.tool_name.as_deref() else {
        return Outcome::allow();
    };
    let tool_use = ToolUse::parse(tool_name, &input.tool_input);
    let cwd = input.cwd_or_current();
    let ctx = CheckContext::new(&tool_use, &cwd);

    let mut findings = Vec::new();
    for check in build_checks(config) {
        let found = check.inspect(&ctx);
        tracing::debug!(
            check = check.kind().as_str(),
            tool = tool_name,
            findings = found.len(),
            "check complete"
        );
        findings.extend(found);
    }
    aggregate(&findings)
}

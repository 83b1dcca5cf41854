use crate::command;
use crate::config::{CheckKind, ShellConfig};
use crate::protocol::{ToolUse, Verdict};

use super::{Check, CheckContext, Finding};

/// Matches Bash commands against block/warn command-prefix rules.
pub(super) struct ShellCheck<'a> {
    config: &'a ShellConfig,
}

impl<'a> ShellCheck<'a> {
    pub(super) fn new(config: &'a ShellConfig) -> Self {
        ShellCheck { config }
    }
}

impl Check for ShellCheck<'_> {
    fn kind(&self) -> CheckKind {
        CheckKind::Shell
    }

    fn inspect(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
        let ToolUse::Bash {
            command: Some(command),
        } = ctx.tool_use
        else {
            return vec![];
        };
        if command.trim().is_empty() || self.config.rules.is_empty() {
            return vec![];
        }

        let segments = match command::parse(command) {
            Ok(segments) => segments,
            Err(e) => {
                return vec![Finding {
                    check: CheckKind::Shell,
                    rule: "unparsable-command".to_string(),
                    severity: Verdict::Warn,
                    line: None,
                    message: format!("could not parse command: {e}"),
                }]
            }
        };

        self.config
            .rules
            .iter()
            .filter_map(|(rule, verdict)| {
                let segment = segments.iter().find(|seg| rule.matches(seg))?;
                Some(Finding {
                    check: CheckKind::Shell,
                    rule: rule.raw.clone(),
                    severity: *verdict,
                    line: None,
                    message: format!(
                        "'{}' matches a {verdict} rule",
                        std::iter::once(segment.program.as_str())
                            .chain(segment.args.iter().map(String::as_str))
                            .collect::<Vec<_>>()
                            .join(" ")
                    ),
                })
            })
            .collect()
    }
}

use crate::config::{CheckKind, ProtectedFilesConfig, ProtectedRule};
use crate::path;
use crate::protocol::Verdict;

use super::{Check, CheckContext, Finding};

/// Guards sensitive paths against write-like tools.
pub(super) struct ProtectedFilesCheck<'a> {
    config: &'a ProtectedFilesConfig,
}

impl<'a> ProtectedFilesCheck<'a> {
    pub(super) fn new(config: &'a ProtectedFilesConfig) -> Self {
        ProtectedFilesCheck { config }
    }

    fn rule_matches(&self, rule: &ProtectedRule, path: &str, cwd: &str) -> Result<bool, String> {
        let expanded = path::expand_pattern(&rule.pattern, cwd).map_err(|e| e.to_string())?;
        path::matches(path, &expanded)
            .map_err(|e| format!("invalid pattern \"{}\": {e}", rule.pattern))
    }
}

fn warning(rule: &str, message: String) -> Finding {
    Finding {
        check: CheckKind::ProtectedFiles,
        rule: rule.to_string(),
        severity: Verdict::Warn,
        line: None,
        message,
    }
}

impl Check for ProtectedFilesCheck<'_> {
    fn kind(&self) -> CheckKind {
        CheckKind::ProtectedFiles
    }

    fn inspect(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
        if !ctx.tool_use.is_write_like() {
            return vec![];
        }
        let path = match &ctx.path {
            None => return vec![],
            Some(Err(reason)) => return vec![warning("unresolvable-path", reason.clone())],
            Some(Ok(path)) => path.as_str(),
        };

        let mut worst: Option<&ProtectedRule> = None;
        let mut problems = Vec::new();
        for rule in &self.config.rules {
            match self.rule_matches(rule, path, ctx.cwd) {
                Ok(true) => {
                    if worst.map_or(true, |w| rule.severity > w.severity) {
                        worst = Some(rule);
                    }
                }
                Ok(false) => {}
                Err(reason) => {
                    tracing::warn!(
                        pattern = %rule.pattern,
                        %reason,
                        "protected-files: pattern skipped"
                    );
                    problems.push(warning("unusable-pattern", reason));
                }
            }
        }

        let mut findings: Vec<Finding> = worst
            .map(|rule| Finding {
                check: CheckKind::ProtectedFiles,
                rule: rule.pattern.clone(),
                severity: rule.severity,
                line: None,
                message: format!("{path} is a protected file"),
            })
            .into_iter()
            .collect();
        findings.extend(problems);
        findings
    }
}

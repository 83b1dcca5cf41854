use crate::config::{CheckKind, TcpaConfig};

use super::{Check, CheckContext, Finding};

/// Requires consent, opt-out and rates language wherever SMS/autodialer
/// messaging is introduced.
pub(super) struct TcpaCheck<'a> {
    config: &'a TcpaConfig,
}

impl<'a> TcpaCheck<'a> {
    pub(super) fn new(config: &'a TcpaConfig) -> Self {
        TcpaCheck { config }
    }
}

impl Check for TcpaCheck<'_> {
    fn kind(&self) -> CheckKind {
        CheckKind::Tcpa
    }

    fn inspect(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
        let Some(text) = ctx.text.as_deref() else {
            return vec![];
        };

        let Some((line, trigger)) = first_trigger(self.config, text) else {
            return vec![];
        };

        self.config
            .groups
            .iter()
            .filter(|group| !group.patterns.iter().any(|p| p.is_match(text)))
            .map(|group| Finding {
                check: CheckKind::Tcpa,
                rule: format!("missing-{}", group.name),
                severity: self.config.severity,
                line: Some(line),
                message: format!(
                    "content mentions \"{trigger}\" but has no {} language",
                    group.name
                ),
            })
            .collect()
    }
}

/// Line number and text of the first trigger match.
fn first_trigger(config: &TcpaConfig, text: &str) -> Option<(usize, String)> {
    text.lines().enumerate().find_map(|(idx, line)| {
        config
            .triggers
            .iter()
            .find_map(|t| t.find(line))
            .map(|m| (idx + 1, m.as_str().to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::protocol::{ToolUse, Verdict};
    use serde_json::json;

    fn findings_with(config: &TcpaConfig, content: &str) -> Vec<Finding> {
        let tool_use = ToolUse::parse(
            "Write",
            &json!({"file_path": "src/SignupForm.tsx", "content": content}),
        );
        let ctx = CheckContext::new(&tool_use, "/project");
        TcpaCheck::new(config).inspect(&ctx)
    }

    fn findings_for(content: &str) -> Vec<Finding> {
        findings_with(&TcpaConfig::default(), content)
    }

    #[test]
    fn untriggered_content_is_clean() {
        assert!(findings_for("<label>Email me updates</label>").is_empty());
    }

    #[test]
    fn trigger_without_language_reports_every_group() {
        let found = findings_for("<p>Title</p>\n<label>Get SMS updates</label>");
        let rules: Vec<&str> = found.iter().map(|f| f.rule.as_str()).collect();
        assert_eq!(rules, vec!["missing-consent", "missing-opt-out", "missing-rates"]);
        assert!(found.iter().all(|f| f.line == Some(2)));
        assert!(found[0].message.contains("\"SMS\""));
    }

    #[test]
    fn compliant_copy_passes() {
        let copy = "By checking this box you consent to receive marketing text messages. \
                    Message and data rates may apply. Reply STOP to cancel.";
        assert!(findings_for(copy).is_empty());
    }

    #[test]
    fn partial_copy_reports_only_missing_groups() {
        let copy = "I agree to receive SMS alerts. Text STOP to opt out.";
        let found = findings_for(copy);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rule, "missing-rates");
    }

    #[test]
    fn configured_severity_applies() {
        let config = Config::parse(r#"tcpa { severity "block"; }"#).unwrap().tcpa;
        let found = findings_with(&config, "Autodialer campaign");
        assert!(found.iter().all(|f| f.severity == Verdict::Block));
        assert_eq!(found.len(), 3);
    }
}

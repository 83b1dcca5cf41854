use std::sync::LazyLock;

use regex::Regex;

use crate::config::{CheckKind, DesignTokenConfig};

use super::{Check, CheckContext, Finding};

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[\s:"'`(,])(#(?:[0-9a-fA-F]{8}|[0-9a-fA-F]{6}|[0-9a-fA-F]{3,4}))\b"#)
        .expect("hex color regex")
});

static COLOR_FUNCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:rgba?|hsla?)\([^)]*\)").expect("color function regex"));

static SPACING_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:margin|padding|gap|row-gap|column-gap|inset|top|right|bottom|left)[a-z-]*\s*:\s*([^;,}\n]*)",
    )
    .expect("spacing declaration regex")
});

static PX_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+(?:\.\d+)?px\b").expect("px value regex"));

/// Flags raw color and spacing literals in style-bearing files.
pub(super) struct DesignTokenCheck<'a> {
    config: &'a DesignTokenConfig,
}

impl<'a> DesignTokenCheck<'a> {
    pub(super) fn new(config: &'a DesignTokenConfig) -> Self {
        DesignTokenCheck { config }
    }
}

/// Hits of one rule: first line, up to three sample values, total count.
#[derive(Default)]
struct Hits {
    first_line: Option<usize>,
    samples: Vec<String>,
    count: usize,
}

impl Hits {
    fn record(&mut self, line: usize, value: &str) {
        self.count += 1;
        self.first_line.get_or_insert(line);
        if self.samples.len() < 3 && !self.samples.iter().any(|s| s == value) {
            self.samples.push(value.to_string());
        }
    }
}

impl Check for DesignTokenCheck<'_> {
    fn kind(&self) -> CheckKind {
        CheckKind::DesignTokens
    }

    fn inspect(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
        let (Some(text), Some(raw_path)) = (ctx.text.as_deref(), ctx.raw_path) else {
            return vec![];
        };
        if !self.config.applies_to(raw_path) {
            return vec![];
        }
        if let Some(path) = ctx.normalized_path() {
            if self.config.ignore.is_match(path) {
                tracing::debug!(path, "design-tokens: token definition file ignored");
                return vec![];
            }
        }

        let mut colors = Hits::default();
        let mut functions = Hits::default();
        let mut spacing = Hits::default();

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            if is_token_definition(line) {
                continue;
            }
            for caps in HEX_COLOR.captures_iter(line) {
                let value = &caps[1];
                if !self.config.is_allowed(value) {
                    colors.record(line_no, value);
                }
            }
            for m in COLOR_FUNCTION.find_iter(line) {
                if !self.config.is_allowed(m.as_str()) {
                    functions.record(line_no, m.as_str());
                }
            }
            for caps in SPACING_DECL.captures_iter(line) {
                for px in PX_VALUE.find_iter(&caps[1]) {
                    if !self.config.is_allowed(px.as_str()) {
                        spacing.record(line_no, px.as_str());
                    }
                }
            }
        }

        [
            ("hardcoded-color", "raw color", colors),
            ("color-function", "raw color function", functions),
            ("hardcoded-spacing", "raw spacing value", spacing),
        ]
        .into_iter()
        .filter_map(|(rule, what, hits)| {
            let line = hits.first_line?;
            Some(Finding {
                check: CheckKind::DesignTokens,
                rule: rule.to_string(),
                severity: self.config.severity,
                line: Some(line),
                message: format!(
                    "{what} {} ({} total); use a design token instead",
                    hits.samples.join(", "),
                    hits.count
                ),
            })
        })
        .collect()
    }
}

/// CSS custom properties and SCSS/LESS variables define tokens themselves.
fn is_token_definition(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("--") || trimmed.starts_with('$') || trimmed.starts_with('@')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::protocol::{ToolUse, Verdict};
    use serde_json::json;

    fn findings_for(path: &str, content: &str) -> Vec<Finding> {
        let config = DesignTokenConfig::default();
        let tool_use = ToolUse::parse("Write", &json!({"file_path": path, "content": content}));
        let ctx = CheckContext::new(&tool_use, "/project");
        DesignTokenCheck::new(&config).inspect(&ctx)
    }

    fn rules(findings: &[Finding]) -> Vec<&str> {
        findings.iter().map(|f| f.rule.as_str()).collect()
    }

    #[test]
    fn hex_colors_are_flagged() {
        let found = findings_for(
            "src/button.css",
            ".btn {\n  color: #3366ff;\n  background: #FFF;\n}",
        );
        assert_eq!(rules(&found), vec!["hardcoded-color"]);
        assert_eq!(found[0].line, Some(2));
        assert_eq!(found[0].severity, Verdict::Warn);
        assert!(found[0].message.contains("#3366ff"));
        assert!(found[0].message.contains("(1 total)"));
    }

    #[test]
    fn color_functions_are_flagged() {
        let found = findings_for("a.scss", ".x { color: rgba(0, 0, 0, 0.5); }");
        assert_eq!(rules(&found), vec!["color-function"]);
    }

    #[test]
    fn spacing_px_in_css_and_jsx() {
        let found = findings_for(
            "src/Card.tsx",
            "const s = { marginTop: '12px', padding: '0px' };\n<div style={{ gap: \"8px\" }} />",
        );
        assert_eq!(rules(&found), vec!["hardcoded-spacing"]);
        assert!(found[0].message.contains("12px"));
        assert!(found[0].message.contains("(2 total)"));
    }

    #[test]
    fn token_usage_is_clean() {
        let found = findings_for(
            "src/button.css",
            ".btn { color: var(--color-primary); padding: var(--space-2); border: 1px solid; }",
        );
        assert!(found.is_empty(), "{found:?}");
    }

    #[test]
    fn variable_definitions_are_skipped() {
        let found = findings_for(
            "src/vars.scss",
            ":root {\n  --color-primary: #3366ff;\n}\n$gap: 12px;",
        );
        assert!(found.is_empty(), "{found:?}");
    }

    #[test]
    fn non_style_files_and_token_files_are_skipped() {
        assert!(findings_for("src/main.rs", "let c = \"#3366ff\";").is_empty());
        assert!(findings_for("src/tokens/colors.css", ".a { color: #3366ff; }").is_empty());
        assert!(findings_for("src/theme.ts.tsx", ".a { color: #3366ff; }").is_empty());
    }

    #[test]
    fn severity_from_config() {
        let config = Config::parse(r#"design-tokens { severity "block"; }"#)
            .unwrap()
            .design_tokens;
        let tool_use = ToolUse::parse(
            "Edit",
            &json!({"file_path": "a.css", "new_string": "color: #abcdef;"}),
        );
        let ctx = CheckContext::new(&tool_use, "/project");
        let found = DesignTokenCheck::new(&config).inspect(&ctx);
        assert_eq!(found[0].severity, Verdict::Block);
    }
}

use regex::Regex;

use super::document::ParseNode;
use super::{parse_severity, ConfigError};
use crate::path::GlobList;
use crate::protocol::Verdict;

/// Regex rules for personal data in written content.
#[derive(Debug, Clone)]
pub struct PiiConfig {
    pub rules: Vec<PiiRule>,
    /// Files matching these globs are not scanned.
    pub ignore: GlobList,
}

#[derive(Debug, Clone)]
pub struct PiiRule {
    pub id: String,
    pub regex: Regex,
    pub severity: Verdict,
    /// Extra check on each regex match to cut false positives.
    pub validator: Option<Validator>,
}

/// Post-match validation for built-in rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    /// Digits must pass the Luhn checksum and count 13..=19.
    Luhn,
    /// SSN area/group/serial must be assignable (no 000, 666, 9xx, 00, 0000).
    SsnArea,
}

const DEFAULT_IGNORE: &[&str] = &[
    "**/*.test.*",
    "**/*.spec.*",
    "**/__tests__/**",
    "**/fixtures/**",
];

fn builtin(id: &str, pattern: &str, severity: Verdict, validator: Option<Validator>) -> PiiRule {
    PiiRule {
        id: id.to_string(),
        // Built-in patterns are constants covered by tests.
        regex: Regex::new(pattern).unwrap_or_else(|e| panic!("built-in pii rule {id}: {e}")),
        severity,
        validator,
    }
}

impl Default for PiiConfig {
    fn default() -> Self {
        PiiConfig {
            rules: vec![
                builtin(
                    "ssn",
                    r"\b\d{3}-\d{2}-\d{4}\b",
                    Verdict::Block,
                    Some(Validator::SsnArea),
                ),
                builtin(
                    "credit-card",
                    r"\b\d(?:[ -]?\d){12,18}\b",
                    Verdict::Block,
                    Some(Validator::Luhn),
                ),
                builtin(
                    "aws-access-key",
                    r"\bAKIA[0-9A-Z]{16}\b",
                    Verdict::Block,
                    None,
                ),
                builtin(
                    "email",
                    r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
                    Verdict::Warn,
                    None,
                ),
                builtin(
                    "us-phone",
                    r"(?:\+1[ .-]?)?\(?\b\d{3}\)?[ .-]\d{3}[ .-]\d{4}\b",
                    Verdict::Warn,
                    None,
                ),
            ],
            ignore: GlobList::new(DEFAULT_IGNORE)
                .unwrap_or_else(|e| panic!("built-in pii ignore globs: {e}")),
        }
    }
}

impl PiiConfig {
    /// Parse a `pii { ... }` section on top of the defaults.
    ///
    /// - `rule "<id>" "<regex>" severity="warn|block"` adds or replaces a rule
    /// - `disable "<id>"...` drops rules by id
    /// - `ignore "<glob>"...` replaces the default ignore list
    pub(super) fn from_node(node: &ParseNode<'_>) -> Result<Self, ConfigError> {
        let mut config = PiiConfig::default();
        let mut ignore: Option<Vec<String>> = None;

        for child in node.section_body()?.nodes() {
            match child.name() {
                "rule" => {
                    let values = child.required_strings()?;
                    let &[id, pattern] = values.as_slice() else {
                        return Err(child.invalid("rule takes an id and a regex"));
                    };
                    let regex = Regex::new(pattern)
                        .map_err(|e| child.invalid(format!("invalid regex for rule '{id}': {e}")))?;
                    let severity = match child.property("severity") {
                        Some(s) => parse_severity(&child, s)?,
                        None => Verdict::Warn,
                    };
                    let rule = PiiRule {
                        id: id.to_string(),
                        regex,
                        severity,
                        validator: None,
                    };
                    match config.rules.iter_mut().find(|r| r.id == id) {
                        Some(existing) => *existing = rule,
                        None => config.rules.push(rule),
                    }
                }
                "disable" => {
                    let ids = child.required_strings()?;
                    config.rules.retain(|r| !ids.contains(&r.id.as_str()));
                }
                "ignore" => {
                    let globs = child.required_strings()?;
                    ignore
                        .get_or_insert_with(Vec::new)
                        .extend(globs.into_iter().map(String::from));
                }
                other => {
                    return Err(child.invalid(format!("unknown node '{other}' in pii section")))
                }
            }
        }

        if let Some(globs) = ignore {
            config.ignore = GlobList::new(&globs)
                .map_err(|e| node.invalid(format!("invalid ignore glob in pii section: {e}")))?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{Config, ConfigError};
    use crate::protocol::Verdict;

    #[test]
    fn defaults_cover_expected_rules() {
        let ids: Vec<String> = Config::default().pii.rules.into_iter().map(|r| r.id).collect();
        assert_eq!(
            ids,
            vec!["ssn", "credit-card", "aws-access-key", "email", "us-phone"]
        );
    }

    #[test]
    fn rule_replaces_builtin_with_same_id() {
        let config = Config::parse(
            r#"pii {
                rule "email" "[a-z]+@corp\\.internal" severity="block"
            }"#,
        )
        .unwrap();
        let email = config.pii.rules.iter().find(|r| r.id == "email").unwrap();
        assert_eq!(email.severity, Verdict::Block);
        assert!(email.regex.is_match("bob@corp.internal"));
        assert!(email.validator.is_none());
    }

    #[test]
    fn ignore_replaces_defaults() {
        let config = Config::parse(r#"pii { ignore "**/seed/**"; }"#).unwrap();
        assert!(config.pii.ignore.is_match("/p/seed/users.sql"));
        assert!(!config.pii.ignore.is_match("/p/src/a.test.ts"));
    }

    #[test]
    fn invalid_regex_is_rejected_with_line() {
        let err = Config::parse("pii {\n    rule \"bad\" \"(unclosed\"\n}").unwrap_err();
        match err {
            ConfigError::Invalid { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("bad"), "{message}");
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn rule_without_regex_is_rejected() {
        assert!(Config::parse(r#"pii { rule "only-id"; }"#).is_err());
    }

    #[test]
    fn bad_severity_is_rejected() {
        let err = Config::parse(r#"pii { rule "x" "y" severity="fatal"; }"#).unwrap_err();
        assert!(err.to_string().contains("invalid severity"), "{err}");
    }
}

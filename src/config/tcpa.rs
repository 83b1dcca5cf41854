use regex::{Regex, RegexBuilder};

use super::document::ParseNode;
use super::{parse_severity, single_string, ConfigError};
use crate::protocol::Verdict;

/// Consent-language requirements for SMS / autodialer copy.
#[derive(Debug, Clone)]
pub struct TcpaConfig {
    /// Any match makes the content subject to the consent requirements.
    pub triggers: Vec<Regex>,
    /// Every group must be satisfied by at least one of its patterns.
    pub groups: Vec<ConsentGroup>,
    pub severity: Verdict,
}

#[derive(Debug, Clone)]
pub struct ConsentGroup {
    pub name: String,
    pub patterns: Vec<Regex>,
}

const DEFAULT_TRIGGERS: &[&str] = &[
    r"\bsms\b",
    r"\btext messages?\b",
    r"\bautodial(?:er|ed)?\b",
    r"\bpre-?recorded\b",
    r"\bmarketing texts?\b",
];

const DEFAULT_GROUPS: &[(&str, &[&str])] = &[
    (
        "consent",
        &[
            r"consent to receive",
            r"express written consent",
            r"i agree to receive",
        ],
    ),
    ("opt-out", &[r"reply\s+stop", r"text\s+stop", r"opt[- ]?out"]),
    (
        "rates",
        &[
            r"message and data rates may apply",
            r"msg\s*(?:&|and)\s*data rates",
        ],
    ),
];

/// All TCPA patterns match case-insensitively.
fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

fn compile_builtin(pattern: &str) -> Regex {
    compile(pattern).unwrap_or_else(|e| panic!("built-in tcpa pattern {pattern}: {e}"))
}

impl Default for TcpaConfig {
    fn default() -> Self {
        TcpaConfig {
            triggers: DEFAULT_TRIGGERS.iter().map(|p| compile_builtin(p)).collect(),
            groups: DEFAULT_GROUPS
                .iter()
                .map(|(name, patterns)| ConsentGroup {
                    name: name.to_string(),
                    patterns: patterns.iter().map(|p| compile_builtin(p)).collect(),
                })
                .collect(),
            severity: Verdict::Warn,
        }
    }
}

impl TcpaConfig {
    /// Parse a `tcpa { ... }` section.
    ///
    /// `trigger` nodes replace the default triggers; `require "<group>"
    /// "<regex>"...` nodes replace the default groups (repeated group names
    /// accumulate patterns).
    pub(super) fn from_node(node: &ParseNode<'_>) -> Result<Self, ConfigError> {
        let mut config = TcpaConfig::default();
        let mut triggers: Option<Vec<Regex>> = None;
        let mut groups: Option<Vec<ConsentGroup>> = None;

        for child in node.section_body()?.nodes() {
            match child.name() {
                "trigger" => {
                    for pattern in child.required_strings()? {
                        let regex = compile(pattern).map_err(|e| {
                            child.invalid(format!("invalid trigger regex: {e}"))
                        })?;
                        triggers.get_or_insert_with(Vec::new).push(regex);
                    }
                }
                "require" => {
                    let values = child.required_strings()?;
                    let Some((name, patterns)) = values.split_first() else {
                        return Err(child.invalid("require takes a group name and patterns"));
                    };
                    if patterns.is_empty() {
                        return Err(child.invalid(format!(
                            "require \"{name}\" needs at least one pattern"
                        )));
                    }
                    let mut compiled = Vec::with_capacity(patterns.len());
                    for pattern in patterns {
                        compiled.push(compile(pattern).map_err(|e| {
                            child.invalid(format!("invalid regex in group '{name}': {e}"))
                        })?);
                    }
                    let groups = groups.get_or_insert_with(Vec::new);
                    match groups.iter_mut().find(|g| g.name == *name) {
                        Some(group) => group.patterns.extend(compiled),
                        None => groups.push(ConsentGroup {
                            name: name.to_string(),
                            patterns: compiled,
                        }),
                    }
                }
                "severity" => config.severity = parse_severity(&child, single_string(&child)?)?,
                other => {
                    return Err(child.invalid(format!("unknown node '{other}' in tcpa section")))
                }
            }
        }

        if let Some(triggers) = triggers {
            config.triggers = triggers;
        }
        if let Some(groups) = groups {
            config.groups = groups;
        }
        Ok(config)
    }
}

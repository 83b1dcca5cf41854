use super::document::ParseNode;
use super::ConfigError;
use crate::protocol::Verdict;

/// Paths that write-like tools must not (block) or should not (warn) touch.
#[derive(Debug, Clone)]
pub struct ProtectedFilesConfig {
    pub rules: Vec<ProtectedRule>,
}

/// A glob that may contain `<cwd>`, `<home>` or a leading `~`; expanded per
/// hook run because `<cwd>` comes from the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedRule {
    pub pattern: String,
    pub severity: Verdict,
}

const DEFAULT_RULES: &[(&str, Verdict)] = &[
    ("**/.env", Verdict::Block),
    ("**/.env.*", Verdict::Block),
    ("~/.ssh/**", Verdict::Block),
    ("**/package-lock.json", Verdict::Warn),
    ("**/*.lock", Verdict::Warn),
];

impl Default for ProtectedFilesConfig {
    fn default() -> Self {
        ProtectedFilesConfig {
            rules: DEFAULT_RULES
                .iter()
                .map(|(pattern, severity)| ProtectedRule {
                    pattern: pattern.to_string(),
                    severity: *severity,
                })
                .collect(),
        }
    }
}

/// Syntax-check a pattern with placeholders substituted by fixed paths.
fn validate_pattern(pattern: &str) -> Result<(), globset::Error> {
    let mut probe = pattern.replace("<cwd>", "/cwd").replace("<home>", "/home");
    if let Some(rest) = probe.strip_prefix('~') {
        probe = format!("/home{rest}");
    }
    globset::Glob::new(&probe).map(|_| ())
}

impl ProtectedFilesConfig {
    /// Parse `protected-files { block "<glob>"...; warn "<glob>"... }`. A
    /// present section replaces the defaults.
    pub(super) fn from_node(node: &ParseNode<'_>) -> Result<Self, ConfigError> {
        let mut rules = Vec::new();
        for child in node.section_body()?.nodes() {
            let severity = match child.name() {
                "block" => Verdict::Block,
                "warn" => Verdict::Warn,
                other => {
                    return Err(child.invalid(format!(
                        "unknown node '{other}' in protected-files section; expected block or warn"
                    )))
                }
            };
            for pattern in child.required_strings()? {
                validate_pattern(pattern)
                    .map_err(|e| child.invalid(format!("invalid glob \"{pattern}\": {e}")))?;
                rules.push(ProtectedRule {
                    pattern: pattern.to_string(),
                    severity,
                });
            }
        }
        Ok(ProtectedFilesConfig { rules })
    }
}

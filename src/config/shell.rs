use super::document::ParseNode;
use super::ConfigError;
use crate::command::ShellRule;
use crate::protocol::Verdict;

/// Command-prefix rules for the Bash tool.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Rules in declaration order with the verdict they produce.
    pub rules: Vec<(ShellRule, Verdict)>,
}

const DEFAULT_RULES: &[(&str, Verdict)] = &[
    ("rm -rf /", Verdict::Block),
    ("rm -rf ~", Verdict::Block),
    ("git commit --no-verify", Verdict::Block),
    ("git push --force", Verdict::Warn),
];

impl Default for ShellConfig {
    fn default() -> Self {
        ShellConfig {
            rules: DEFAULT_RULES
                .iter()
                .map(|(raw, verdict)| {
                    let rule = ShellRule::new(raw)
                        .unwrap_or_else(|e| panic!("built-in shell rule {raw}: {e}"));
                    (rule, *verdict)
                })
                .collect(),
        }
    }
}

impl ShellConfig {
    /// Parse `shell { block "..."; warn "..." }`. A present section replaces
    /// the default rules entirely.
    pub(super) fn from_node(node: &ParseNode<'_>) -> Result<Self, ConfigError> {
        let mut rules = Vec::new();
        for child in node.section_body()?.nodes() {
            let verdict = match child.name() {
                "block" => Verdict::Block,
                "warn" => Verdict::Warn,
                other => {
                    return Err(child.invalid(format!(
                        "unknown node '{other}' in shell section; expected block or warn"
                    )))
                }
            };
            for raw in child.required_strings()? {
                let rule = ShellRule::new(raw)
                    .map_err(|e| child.invalid(format!("invalid shell rule \"{raw}\": {e}")))?;
                rules.push((rule, verdict));
            }
        }
        Ok(ShellConfig { rules })
    }
}

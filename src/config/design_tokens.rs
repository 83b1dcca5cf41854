use std::collections::HashSet;

use super::document::ParseNode;
use super::{parse_severity, single_string, ConfigError};
use crate::path::GlobList;
use crate::protocol::Verdict;

/// Settings for the hardcoded-style-value check.
#[derive(Debug, Clone)]
pub struct DesignTokenConfig {
    /// Lowercase file extensions (no dot) that are scanned.
    pub extensions: Vec<String>,
    /// Literal values accepted without a token, compared lowercase.
    pub allow: HashSet<String>,
    /// Token definition files and other paths that may hold raw values.
    pub ignore: GlobList,
    pub severity: Verdict,
}

const DEFAULT_EXTENSIONS: &[&str] = &["css", "scss", "less", "tsx", "jsx", "vue", "svelte"];
const DEFAULT_ALLOW: &[&str] = &["#fff", "#ffffff", "#000", "#000000", "0px", "1px"];
const DEFAULT_IGNORE: &[&str] = &["**/tokens/**", "**/theme.*", "**/*.tokens.*"];

impl Default for DesignTokenConfig {
    fn default() -> Self {
        DesignTokenConfig {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            allow: DEFAULT_ALLOW.iter().map(|s| s.to_string()).collect(),
            ignore: GlobList::new(DEFAULT_IGNORE)
                .unwrap_or_else(|e| panic!("built-in design token ignore globs: {e}")),
            severity: Verdict::Warn,
        }
    }
}

impl DesignTokenConfig {
    /// Whether a file's extension is in scope.
    pub fn applies_to(&self, path: &str) -> bool {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|e| *e == ext)
            }
            _ => false,
        }
    }

    pub fn is_allowed(&self, value: &str) -> bool {
        self.allow.contains(&value.to_ascii_lowercase())
    }

    pub(super) fn from_node(node: &ParseNode<'_>) -> Result<Self, ConfigError> {
        let mut config = DesignTokenConfig::default();
        let mut extensions: Option<Vec<String>> = None;
        let mut allow: Option<HashSet<String>> = None;
        let mut ignore: Option<Vec<String>> = None;

        for child in node.section_body()?.nodes() {
            match child.name() {
                "extensions" => extensions.get_or_insert_with(Vec::new).extend(
                    child
                        .required_strings()?
                        .into_iter()
                        .map(|e| e.trim_start_matches('.').to_ascii_lowercase()),
                ),
                "allow" => allow.get_or_insert_with(HashSet::new).extend(
                    child
                        .required_strings()?
                        .into_iter()
                        .map(|v| v.to_ascii_lowercase()),
                ),
                "ignore" => ignore
                    .get_or_insert_with(Vec::new)
                    .extend(child.required_strings()?.into_iter().map(String::from)),
                "severity" => config.severity = parse_severity(&child, single_string(&child)?)?,
                other => {
                    return Err(child.invalid(format!(
                        "unknown node '{other}' in design-tokens section"
                    )))
                }
            }
        }

        if let Some(extensions) = extensions {
            config.extensions = extensions;
        }
        if let Some(allow) = allow {
            config.allow = allow;
        }
        if let Some(globs) = ignore {
            config.ignore = GlobList::new(&globs).map_err(|e| {
                node.invalid(format!("invalid ignore glob in design-tokens section: {e}"))
            })?;
        }
        Ok(config)
    }
}

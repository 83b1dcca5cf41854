//! Config document abstraction layer.
//!
//! `ConfigDocument`, `ConfigSection`, and `ParseNode` wrap the `kdl` crate
//! types so section parsers never touch KDL entries or spans directly.

use super::ConfigError;

/// Parsed KDL document paired with its source text.
pub(super) struct ConfigDocument {
    doc: kdl::KdlDocument,
    source: String,
}

/// Borrowed view into a children block.
pub(super) struct ConfigSection<'a> {
    doc: &'a kdl::KdlDocument,
    source: &'a str,
}

/// Single KDL node with source context for line-number reporting.
pub(super) struct ParseNode<'a> {
    node: &'a kdl::KdlNode,
    source: &'a str,
}

impl ConfigDocument {
    pub(super) fn parse(source: &str) -> Result<Self, ConfigError> {
        let doc: kdl::KdlDocument = source
            .parse()
            .map_err(|e: kdl::KdlError| ConfigError::ParseError(e.to_string()))?;
        Ok(Self {
            doc,
            source: source.to_string(),
        })
    }

    /// All top-level nodes.
    pub(super) fn root(&self) -> ConfigSection<'_> {
        ConfigSection {
            doc: &self.doc,
            source: &self.source,
        }
    }
}

impl<'a> ConfigSection<'a> {
    pub(super) fn nodes(&self) -> Vec<ParseNode<'a>> {
        self.doc
            .nodes()
            .iter()
            .map(|node| ParseNode {
                node,
                source: self.source,
            })
            .collect()
    }
}

impl<'a> ParseNode<'a> {
    /// The node's identifier (e.g. `"pii"`, `"rule"`).
    pub(super) fn name(&self) -> &'a str {
        self.node.name().value()
    }

    /// Positional string arguments, in order. Properties are excluded.
    pub(super) fn string_values(&self) -> Vec<&'a str> {
        self.node
            .entries()
            .iter()
            .filter(|e| e.name().is_none())
            .filter_map(|e| e.value().as_string())
            .collect()
    }

    /// Positional arguments that are not strings (numbers, bools, null).
    pub(super) fn has_non_string_values(&self) -> bool {
        self.node
            .entries()
            .iter()
            .filter(|e| e.name().is_none())
            .any(|e| e.value().as_string().is_none())
    }

    /// String value of a named property (`severity="block"`).
    pub(super) fn property(&self, key: &str) -> Option<&'a str> {
        self.node
            .entries()
            .iter()
            .find(|e| e.name().map(|n| n.value()) == Some(key))
            .and_then(|e| e.value().as_string())
    }

    pub(super) fn children(&self) -> Option<ConfigSection<'a>> {
        self.node.children().map(|doc| ConfigSection {
            doc,
            source: self.source,
        })
    }

    /// 1-based line number of this node in the original source.
    pub(super) fn line(&self) -> usize {
        let offset = self.node.span().offset();
        self.source[..offset.min(self.source.len())]
            .bytes()
            .filter(|&b| b == b'\n')
            .count()
            + 1
    }

    /// Build a line-tagged validation error for this node.
    pub(super) fn invalid(&self, message: impl Into<String>) -> ConfigError {
        ConfigError::Invalid {
            line: self.line(),
            message: message.into(),
        }
    }

    /// String arguments, rejecting non-string entries and empty lists.
    pub(super) fn required_strings(&self) -> Result<Vec<&'a str>, ConfigError> {
        if self.has_non_string_values() {
            return Err(self.invalid(format!(
                "{} node contains non-string values; all entries must be quoted strings",
                self.name()
            )));
        }
        let values = self.string_values();
        if values.is_empty() {
            return Err(self.invalid(format!("{} node requires at least one value", self.name())));
        }
        Ok(values)
    }

    /// Children block of a section node; a section without one is an error.
    pub(super) fn section_body(&self) -> Result<ConfigSection<'a>, ConfigError> {
        self.children()
            .ok_or_else(|| self.invalid(format!("{} requires a {{ ... }} block", self.name())))
    }
}

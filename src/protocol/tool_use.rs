use serde_json::Value;

/// Typed representation of a tool invocation, parsed at the protocol boundary.
///
/// Each variant carries the tool-specific fields extracted from `tool_input`.
/// Missing or non-string fields become `None` / empty so checks never touch
/// raw JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolUse {
    /// Whole-file write.
    Write {
        file_path: Option<String>,
        content: String,
    },
    /// Single string replacement.
    Edit {
        file_path: Option<String>,
        new_string: String,
    },
    /// Several replacements in one file; holds every `new_string`.
    MultiEdit {
        file_path: Option<String>,
        edits: Vec<String>,
    },
    /// Bash command execution. `None` when the command field is missing.
    Bash { command: Option<String> },
    /// Any other tool: content checks have no opinion.
    Unknown { tool_name: String },
}

impl ToolUse {
    /// Parse from raw hook input fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use claude_hookkit::protocol::ToolUse;
    ///
    /// let tool_use = ToolUse::parse("Write", &serde_json::json!({
    ///     "file_path": "/tmp/a.css",
    ///     "content": "color: red;"
    /// }));
    /// assert_eq!(tool_use.file_path(), Some("/tmp/a.css"));
    /// assert_eq!(tool_use.written_text().as_deref(), Some("color: red;"));
    /// ```
    pub fn parse(tool_name: &str, tool_input: &Value) -> Self {
        match tool_name {
            "Write" => ToolUse::Write {
                file_path: extract_string(tool_input, "file_path"),
                content: extract_string(tool_input, "content").unwrap_or_default(),
            },
            "Edit" => ToolUse::Edit {
                file_path: extract_string(tool_input, "file_path"),
                new_string: extract_string(tool_input, "new_string").unwrap_or_default(),
            },
            "MultiEdit" => ToolUse::MultiEdit {
                file_path: extract_string(tool_input, "file_path"),
                edits: tool_input
                    .get("edits")
                    .and_then(|v| v.as_array())
                    .map(|edits| {
                        edits
                            .iter()
                            .filter_map(|e| extract_string(e, "new_string"))
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            "Bash" => ToolUse::Bash {
                command: tool_input
                    .get("command")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string()),
            },
            _ => ToolUse::Unknown {
                tool_name: tool_name.to_string(),
            },
        }
    }

    /// Target file of a write-like tool.
    pub fn file_path(&self) -> Option<&str> {
        match self {
            ToolUse::Write { file_path, .. }
            | ToolUse::Edit { file_path, .. }
            | ToolUse::MultiEdit { file_path, .. } => file_path.as_deref(),
            _ => None,
        }
    }

    /// Text the tool introduces into the file. `None` for non-write tools.
    ///
    /// MultiEdit fragments are joined with newlines so line numbers stay
    /// meaningful within each fragment.
    pub fn written_text(&self) -> Option<String> {
        match self {
            ToolUse::Write { content, .. } => Some(content.clone()),
            ToolUse::Edit { new_string, .. } => Some(new_string.clone()),
            ToolUse::MultiEdit { edits, .. } => Some(edits.join("\n")),
            _ => None,
        }
    }

    pub fn is_write_like(&self) -> bool {
        matches!(
            self,
            ToolUse::Write { .. } | ToolUse::Edit { .. } | ToolUse::MultiEdit { .. }
        )
    }
}

/// Extract a non-empty string field from JSON.
fn extract_string(value: &Value, field: &str) -> Option<String> {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

use super::document::ParseNode;
use super::{single_string, ConfigError};

/// Side effects for lifecycle events. Paths may use `<cwd>`, `<home>`, `~`.
#[derive(Debug, Clone, Default)]
pub struct EventsConfig {
    /// JSONL file that receives one record per lifecycle event.
    pub log: Option<String>,
    /// Directory that receives transcript copies before compaction.
    pub backup_dir: Option<String>,
}

impl EventsConfig {
    pub(super) fn from_node(node: &ParseNode<'_>) -> Result<Self, ConfigError> {
        let mut config = EventsConfig::default();
        for child in node.section_body()?.nodes() {
            match child.name() {
                "log" => config.log = Some(single_string(&child)?.to_string()),
                "backup-dir" => config.backup_dir = Some(single_string(&child)?.to_string()),
                other => {
                    return Err(child.invalid(format!("unknown node '{other}' in events section")))
                }
            }
        }
        Ok(config)
    }
}

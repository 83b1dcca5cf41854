//! Named workflows stored in `chains.json`.
//!
//! ```json
//! {"chains": {"ship": {"description": "...", "steps": [
//!     "cargo fmt --check",
//!     {"command": "cargo test", "parallel": "verify"},
//!     {"command": "cargo clippy", "parallel": "verify"},
//!     {"chain": "release"}
//! ]}}}
//! ```

mod plan;
mod validate;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::aliases::AliasError;
use crate::jsonfile::{self, JsonFileError};

pub use plan::Stage;
pub use validate::{ChainIssue, IssueKind};

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error(transparent)]
    File(#[from] JsonFileError),
    #[error("invalid chains file: {0}")]
    Invalid(#[source] serde_json::Error),
    #[error("unknown chain '{0}'")]
    Unknown(String),
    #[error("chain '{from}' references unknown chain '{to}'")]
    UnknownReference { from: String, to: String },
    #[error("chain cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
    #[error(transparent)]
    Alias(#[from] AliasError),
}

/// One entry of a chain's `steps` array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Step {
    /// A bare command string.
    Command(String),
    /// Inline every step of another chain.
    Chain { chain: String },
    Task {
        command: String,
        #[serde(default)]
        parallel: Option<String>,
        #[serde(default)]
        agent: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Chain {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A command step after nested chains have been inlined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedStep {
    pub command: String,
    pub parallel: Option<String>,
    pub agent: Option<String>,
    /// Chain the step was declared in.
    pub origin: String,
}

impl fmt::Display for ExpandedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command)?;
        if let Some(agent) = &self.agent {
            write!(f, " [agent: {agent}]")?;
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct ChainFile {
    #[serde(default)]
    chains: BTreeMap<String, Chain>,
}

/// All chains of one file, by name.
#[derive(Debug, Clone, Default)]
pub struct ChainBook {
    chains: BTreeMap<String, Chain>,
}

impl ChainBook {
    pub fn from_value(value: serde_json::Value) -> Result<Self, ChainError> {
        let file: ChainFile = serde_json::from_value(value).map_err(ChainError::Invalid)?;
        Ok(ChainBook {
            chains: file.chains,
        })
    }

    /// Load a chains file; it must exist.
    pub fn load(path: &Path) -> Result<Self, ChainError> {
        Self::from_value(jsonfile::read(path)?)
    }

    /// Chain names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.chains.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&Chain> {
        self.chains.get(name)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &Chain)> {
        self.chains.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Flatten `name` into command steps, inlining referenced chains.
    pub fn expand(&self, name: &str) -> Result<Vec<ExpandedStep>, ChainError> {
        if !self.chains.contains_key(name) {
            return Err(ChainError::Unknown(name.to_string()));
        }
        let mut out = Vec::new();
        let mut stack = Vec::new();
        self.expand_into(name, &mut stack, &mut out)?;
        Ok(out)
    }

    fn expand_into(
        &self,
        name: &str,
        stack: &mut Vec<String>,
        out: &mut Vec<ExpandedStep>,
    ) -> Result<(), ChainError> {
        if let Some(start) = stack.iter().position(|s| s == name) {
            let mut cycle = stack[start..].to_vec();
            cycle.push(name.to_string());
            return Err(ChainError::Cycle(cycle));
        }
        let chain = self.chains.get(name).ok_or_else(|| ChainError::UnknownReference {
            from: stack.last().cloned().unwrap_or_default(),
            to: name.to_string(),
        })?;

        stack.push(name.to_string());
        for step in &chain.steps {
            match step {
                Step::Command(command) => out.push(ExpandedStep {
                    command: command.clone(),
                    parallel: None,
                    agent: None,
                    origin: name.to_string(),
                }),
                Step::Task {
                    command,
                    parallel,
                    agent,
                } => out.push(ExpandedStep {
                    command: command.clone(),
                    parallel: parallel.clone(),
                    agent: agent.clone(),
                    origin: name.to_string(),
                }),
                Step::Chain { chain } => self.expand_into(chain, stack, out)?,
            }
        }
        stack.pop();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    pub(super) fn book(value: serde_json::Value) -> ChainBook {
        ChainBook::from_value(value).unwrap()
    }

    #[test]
    fn parses_all_step_forms() {
        let b = book(json!({"chains": {"ship": {"description": "release it", "steps": [
            "cargo fmt",
            {"command": "cargo test", "parallel": "verify", "agent": "tester"},
            {"chain": "tag"}
        ]}}}));
        let ship = b.get("ship").unwrap();
        assert_eq!(ship.description.as_deref(), Some("release it"));
        assert_eq!(
            ship.steps,
            vec![
                Step::Command("cargo fmt".into()),
                Step::Task {
                    command: "cargo test".into(),
                    parallel: Some("verify".into()),
                    agent: Some("tester".into()),
                },
                Step::Chain { chain: "tag".into() },
            ]
        );
    }

    #[test]
    fn malformed_step_is_invalid() {
        let err = ChainBook::from_value(json!({"chains": {"x": {"steps": [42]}}})).unwrap_err();
        assert!(matches!(err, ChainError::Invalid(_)));
    }

    #[test]
    fn load_requires_file() {
        let dir = TempDir::new().unwrap();
        let err = ChainBook::load(&dir.path().join("chains.json")).unwrap_err();
        assert!(matches!(err, ChainError::File(JsonFileError::NotFound(_))));

        let path = dir.path().join("chains.json");
        std::fs::write(&path, r#"{"chains": {"b": {"steps": []}, "a": {"steps": ["x"]}}}"#)
            .unwrap();
        let b = ChainBook::load(&path).unwrap();
        assert_eq!(b.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn expand_inlines_nested_chains() {
        let b = book(json!({"chains": {
            "ci": {"steps": ["lint", {"chain": "test"}, "report"]},
            "test": {"steps": ["unit", {"command": "e2e", "agent": "qa"}]}
        }}));
        let steps = b.expand("ci").unwrap();
        let commands: Vec<&str> = steps.iter().map(|s| s.command.as_str()).collect();
        assert_eq!(commands, vec!["lint", "unit", "e2e", "report"]);
        assert_eq!(steps[2].origin, "test");
        assert_eq!(steps[2].to_string(), "e2e [agent: qa]");
    }

    #[test]
    fn expand_errors() {
        let b = book(json!({"chains": {
            "a": {"steps": [{"chain": "b"}]},
            "b": {"steps": [{"chain": "a"}]},
            "c": {"steps": [{"chain": "ghost"}]}
        }}));
        assert_eq!(b.expand("a").unwrap_err().to_string(), "chain cycle: a -> b -> a");
        assert_eq!(
            b.expand("c").unwrap_err().to_string(),
            "chain 'c' references unknown chain 'ghost'"
        );
        assert!(matches!(b.expand("zzz"), Err(ChainError::Unknown(_))));
    }
}

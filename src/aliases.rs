//! Command aliases stored in `aliases.json`.
//!
//! The file is `{"aliases": {"<name>": "<command>"}}`. A flat object of
//! name/command pairs is accepted on read; writes always use the nested
//! shape.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::{json, Map, Value};

use crate::jsonfile::{self, JsonFileError};

/// Maximum number of alias expansions while resolving one name.
pub const MAX_DEPTH: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum AliasError {
    #[error(transparent)]
    File(#[from] JsonFileError),
    #[error("aliases file must be a JSON object")]
    NotAnObject,
    #[error("alias '{name}' must map to a string")]
    NotAString { name: String },
    #[error("invalid alias name '{0}': names must be non-empty and contain no whitespace")]
    InvalidName(String),
    #[error("alias '{0}' already exists (use --force to overwrite)")]
    Exists(String),
    #[error("unknown alias '{0}'")]
    Unknown(String),
    #[error("alias cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
    #[error("alias '{name}' expands more than {max} levels deep", max = MAX_DEPTH)]
    TooDeep { name: String },
}

/// Name to command table, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<String, String>,
}

fn validate_name(name: &str) -> Result<(), AliasError> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(AliasError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Split off the first whitespace-delimited word.
fn split_first_word(command: &str) -> (&str, &str) {
    let trimmed = command.trim_start();
    match trimmed.find(char::is_whitespace) {
        Some(idx) => (&trimmed[..idx], trimmed[idx..].trim_start()),
        None => (trimmed, ""),
    }
}

fn join_words(head: &str, rest: &str) -> String {
    if rest.is_empty() {
        head.to_string()
    } else {
        format!("{head} {rest}")
    }
}

impl AliasTable {
    /// Build a table from a parsed document, accepting both shapes.
    pub fn from_value(value: &Value) -> Result<Self, AliasError> {
        let root = value.as_object().ok_or(AliasError::NotAnObject)?;
        let map: &Map<String, Value> = match root.get("aliases") {
            Some(Value::Object(nested)) => nested,
            Some(_) => return Err(AliasError::NotAnObject),
            None => root,
        };

        let mut table = AliasTable::default();
        for (name, command) in map {
            validate_name(name)?;
            let command = command.as_str().ok_or_else(|| AliasError::NotAString {
                name: name.clone(),
            })?;
            table.entries.insert(name.clone(), command.to_string());
        }
        Ok(table)
    }

    /// Load from disk. A missing file is an empty table.
    pub fn load(path: &Path) -> Result<Self, AliasError> {
        Self::from_value(&jsonfile::read_or_empty_object(path)?)
    }

    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        json!({ "aliases": map })
    }

    pub fn save(&self, path: &Path) -> Result<(), AliasError> {
        Ok(jsonfile::write_atomic(path, &self.to_value())?)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add an alias. Refuses to replace an existing one unless `force`.
    pub fn insert(&mut self, name: &str, command: &str, force: bool) -> Result<(), AliasError> {
        validate_name(name)?;
        if !force && self.entries.contains_key(name) {
            return Err(AliasError::Exists(name.to_string()));
        }
        self.entries.insert(name.to_string(), command.to_string());
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<String, AliasError> {
        self.entries
            .remove(name)
            .ok_or_else(|| AliasError::Unknown(name.to_string()))
    }

    /// Entries sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Expand `name` into a full command line.
    ///
    /// When an expansion starts with another alias, that alias is expanded
    /// too. `extra_args` are appended to the final command.
    pub fn resolve(&self, name: &str, extra_args: &[String]) -> Result<String, AliasError> {
        let mut command = self
            .get(name)
            .ok_or_else(|| AliasError::Unknown(name.to_string()))?
            .to_string();
        let mut chain = vec![name.to_string()];

        loop {
            let (head, rest) = split_first_word(&command);
            let Some(next) = self.get(head) else {
                break;
            };
            if let Some(start) = chain.iter().position(|seen| seen == head) {
                let mut cycle = chain[start..].to_vec();
                cycle.push(head.to_string());
                return Err(AliasError::Cycle(cycle));
            }
            if chain.len() >= MAX_DEPTH {
                return Err(AliasError::TooDeep {
                    name: name.to_string(),
                });
            }
            chain.push(head.to_string());
            command = join_words(next, rest);
        }

        tracing::debug!(alias = name, via = ?chain, "alias resolved");
        Ok(extra_args
            .iter()
            .fold(command, |acc, arg| join_words(&acc, arg)))
    }

    /// Resolve a command whose first word may be an alias; other commands
    /// are returned unchanged.
    pub fn expand_command(&self, command: &str) -> Result<String, AliasError> {
        let (head, rest) = split_first_word(command);
        if self.get(head).is_none() {
            return Ok(command.to_string());
        }
        let resolved = self.resolve(head, &[])?;
        Ok(join_words(&resolved, rest))
    }
}

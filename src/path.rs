//! Logical path handling for file-targeting checks.
//!
//! Nothing here touches the filesystem: paths are normalized textually so a
//! hook decision never depends on whether the target exists yet.

use globset::{Glob, GlobSet, GlobSetBuilder};

/// Error from path normalization or pattern expansion.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// `$HOME` is required to expand `~` or `<home>` but is not set.
    #[error("$HOME not set, cannot expand home directory in: {0}")]
    HomeNotSet(String),
}

fn home_dir(context: &str) -> Result<String, PathError> {
    std::env::var("HOME").map_err(|_| PathError::HomeNotSet(context.to_string()))
}

/// Normalize a path to a clean absolute form.
///
/// Expands a leading `~`, resolves relative paths against `cwd`, then
/// collapses `.`, `..`, duplicate and trailing separators.
pub fn normalize(raw: &str, cwd: &str) -> Result<String, PathError> {
    let path = if let Some(rest) = raw.strip_prefix('~') {
        format!("{}{rest}", home_dir(raw)?)
    } else {
        raw.to_string()
    };

    let path = if path.starts_with('/') {
        path
    } else {
        format!("{cwd}/{path}")
    };

    let mut components: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                components.pop();
            }
            other => components.push(other),
        }
    }

    if components.is_empty() {
        Ok("/".to_string())
    } else {
        Ok(format!("/{}", components.join("/")))
    }
}

/// Expand `<cwd>`, `<home>` and a leading `~` in a config pattern.
///
/// Only touches `$HOME` when the pattern actually references it.
pub fn expand_pattern(pattern: &str, cwd: &str) -> Result<String, PathError> {
    let mut expanded = pattern.replace("<cwd>", cwd);
    if expanded.contains("<home>") || expanded.starts_with('~') {
        let home = home_dir(pattern)?;
        expanded = expanded.replace("<home>", &home);
        if let Some(rest) = expanded.strip_prefix('~') {
            expanded = format!("{home}{rest}");
        }
    }
    Ok(expanded)
}

/// Whether an expanded glob pattern matches a normalized path.
///
/// Case-sensitive, `**` crosses separators (globset default).
pub fn matches(path: &str, expanded_pattern: &str) -> Result<bool, globset::Error> {
    Ok(Glob::new(expanded_pattern)?.compile_matcher().is_match(path))
}

/// A compiled list of globs matched as one set.
#[derive(Debug, Clone)]
pub struct GlobList {
    set: GlobSet,
}

impl GlobList {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, globset::Error> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(Glob::new(pattern.as_ref())?);
        }
        Ok(GlobList { set: builder.build()? })
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.set.is_match(path)
    }
}

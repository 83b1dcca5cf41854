//! Reading and atomically rewriting the JSON files Claude Code consumes.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

/// Error reading or writing a JSON config file.
#[derive(Debug, thiserror::Error)]
pub enum JsonFileError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Read and parse a JSON file that must exist.
pub fn read(path: &Path) -> Result<Value, JsonFileError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            JsonFileError::NotFound(path.to_path_buf())
        } else {
            JsonFileError::Read {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    serde_json::from_str(&contents).map_err(|source| JsonFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Like [`read`], but a missing or blank file is an empty object.
pub fn read_or_empty_object(path: &Path) -> Result<Value, JsonFileError> {
    match std::fs::read_to_string(path) {
        Ok(contents) if !contents.trim().is_empty() => {
            serde_json::from_str(&contents).map_err(|source| JsonFileError::Parse {
                path: path.to_path_buf(),
                source,
            })
        }
        Ok(_) => Ok(Value::Object(Map::new())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Value::Object(Map::new())),
        Err(e) => Err(JsonFileError::Read {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Pretty-print `value` and replace `path` atomically.
///
/// The temp file lives in the target directory so the final rename never
/// crosses filesystems. Missing parent directories are created.
pub fn write_atomic(path: &Path, value: &Value) -> Result<(), JsonFileError> {
    let write_err = |source| JsonFileError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut contents = serde_json::to_string_pretty(value)
        .map_err(|e| write_err(std::io::Error::from(e)))?;
    contents.push('\n');

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    tracing::info!(path = %path.display(), "wrote json file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn missing_and_blank_files_read_as_empty_object() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("settings.json");
        assert_eq!(read_or_empty_object(&missing).unwrap(), json!({}));

        let blank = dir.path().join("blank.json");
        std::fs::write(&blank, "  \n").unwrap();
        assert_eq!(read_or_empty_object(&blank).unwrap(), json!({}));
    }

    #[test]
    fn strict_read_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read(&dir.path().join("chains.json")).unwrap_err();
        assert!(matches!(err, JsonFileError::NotFound(_)));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{\"hooks\": ").unwrap();
        let err = read_or_empty_object(&path).unwrap_err();
        assert!(matches!(err, JsonFileError::Parse { .. }));
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn atomic_write_creates_parents_and_keeps_key_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".claude/settings.json");
        let value = json!({"zeta": 1, "alpha": {"b": 2, "a": 1}});
        write_atomic(&path, &value).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.find("zeta").unwrap() < text.find("alpha").unwrap());
        assert_eq!(read(&path).unwrap(), value);

        // Only the target file remains; the temp file was renamed.
        let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }
}

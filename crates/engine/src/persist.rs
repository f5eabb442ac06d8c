//! JSON document IO shared by the tile map and the collision blocks.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("failed to encode json: {0}")]
    Encode(#[source] serde_json::Error),
}

impl PersistError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PersistError::Read { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Decodes `raw` with the failing field path in the error message.
pub fn parse_json<T: DeserializeOwned>(raw: &str, path: &Path) -> Result<T, PersistError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, T>(&mut deserializer).map_err(|error| {
        let field = error.path().to_string();
        let source = error.into_inner();
        let message = if field.is_empty() || field == "." {
            source.to_string()
        } else {
            format!("at {field}: {source}")
        };
        PersistError::Parse {
            path: path.to_path_buf(),
            message,
        }
    })
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PersistError> {
    let raw = fs::read_to_string(path).map_err(|source| PersistError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_json(&raw, path)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistError> {
    let json = serde_json::to_string_pretty(value).map_err(PersistError::Encode)?;
    write_text_atomic(path, &json).map_err(|source| PersistError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes through a sibling temp file so readers never see a partial file.
pub(crate) fn write_text_atomic(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, text.as_bytes())?;
    if let Err(error) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("document.json");
    path.with_file_name(format!("{file_name}.tmp"))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use tempfile::TempDir;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        items: Vec<Item>,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        name: String,
        size: u32,
    }

    #[test]
    fn write_then_read_creates_parent_dirs() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("nested").join("doc.json");
        let doc = Doc {
            items: vec![Item {
                name: "a".to_string(),
                size: 3,
            }],
        };

        write_json(&path, &doc).expect("write");
        let back: Doc = read_json(&path).expect("read");
        assert_eq!(back, doc);
        assert!(!temp.path().join("nested").join("doc.json.tmp").exists());
    }

    #[test]
    fn parse_error_names_failing_field() {
        let error = parse_json::<Doc>(
            r#"{"items":[{"name":"a","size":1},{"name":"b","size":"big"}]}"#,
            Path::new("doc.json"),
        )
        .expect_err("should fail");
        let message = error.to_string();
        assert!(message.contains("items[1].size"), "message={message}");
    }

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let temp = TempDir::new().expect("temp");
        let error = read_json::<Doc>(&temp.path().join("absent.json")).expect_err("missing");
        assert!(error.is_not_found());
    }
}

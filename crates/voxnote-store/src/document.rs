//! Shared whole-document JSON persistence.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Local store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed document {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Load a document, treating a missing file as the default document.
pub(crate) fn load_document<T>(path: &Path) -> Result<T, StoreError>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Save the full document, creating parent directories as needed.
pub(crate) fn save_document<T: Serialize>(path: &Path, document: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }

    let contents =
        serde_json::to_string_pretty(document).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    std::fs::write(path, contents).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!("Saved document: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Doc {
        entries: Vec<String>,
    }

    #[test]
    fn test_missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let doc: Doc = load_document(&dir.path().join("absent.json")).unwrap();
        assert_eq!(doc, Doc::default());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("doc.json");

        let doc = Doc {
            entries: vec!["a".to_string(), "b".to_string()],
        };
        save_document(&path, &doc).unwrap();

        let loaded: Doc = load_document(&path).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_malformed_document_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result: Result<Doc, StoreError> = load_document(&path);
        assert!(matches!(result, Err(StoreError::Parse { .. })));
    }
}

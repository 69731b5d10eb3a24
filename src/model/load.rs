//! Loading document payloads from disk.

use super::document::Document;
use std::path::{Path, PathBuf};

/// Errors raised while reading a payload or config file
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Document {
    /// Parse a `{ blocks, toc }` payload
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read and parse a payload file
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let document = Self::from_json_str(&contents).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            "loaded {:?}: {} blocks, {} toc entries",
            path,
            document.len(),
            document.toc.len()
        );
        Ok(document)
    }
}

//! Storage error types.

use std::path::{Path, PathBuf};

use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("file i/o failed for {path}: {source}")]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to (de)serialize collection {collection}: {source}")]
    Json {
        collection: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    pub fn file_io(path: &Path, source: std::io::Error) -> Self {
        Self::FileIo {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn json(collection: &str, source: serde_json::Error) -> Self {
        Self::Json {
            collection: collection.to_string(),
            source,
        }
    }
}

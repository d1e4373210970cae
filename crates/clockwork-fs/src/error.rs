use std::path::PathBuf;

use thiserror::Error;

/// Errors from directory and file access.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("{path} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("{path} is read-only; read/write access is required")]
    ReadOnly { path: PathBuf },

    #[error("failed to read directory {path}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON in {path}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize JSON for {path}")]
    SerializeJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

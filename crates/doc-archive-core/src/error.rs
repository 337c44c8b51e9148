use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while loading or building a document repository.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("duplicate document id '{id}'")]
    DuplicateId { id: String },
    #[error("failed to read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse document table {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("malformed document table: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document table must be a JSON object keyed by id or an array of records")]
    InvalidShape,
    #[error("invalid document record '{key}': {source}")]
    InvalidRecord {
        key: String,
        source: serde_json::Error,
    },
    #[error("document '{key}' declares id '{id}'")]
    MismatchedId { key: String, id: String },
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;

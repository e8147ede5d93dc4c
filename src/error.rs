use rescue_document::PathError;
use thiserror::Error;

use crate::blob::BlobError;
use crate::client::WriteError;

#[derive(Error, Debug)]
pub enum RescueError {
    #[error("invalid document path: {0}")]
    InvalidPath(#[from] PathError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("write failed: {0}")]
    Write(#[from] WriteError),

    #[error("blob error: {0}")]
    Blob(#[from] BlobError),

    #[error("file watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, RescueError>;

//! Blob storage for gallery images.
//!
//! Downloads are one-shot and bounded: a blob larger than the caller's
//! ceiling is an error, never a truncated read.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;

/// Ceiling passed by the gallery when downloading a photo.
pub const DEFAULT_MAX_BLOB_SIZE: u64 = 1024 * 1024 * 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlobError {
    #[error("blob '{0}' not found")]
    NotFound(String),

    #[error("blob '{path}' is {size} bytes, above the {max_size} byte limit")]
    TooLarge { path: String, size: u64, max_size: u64 },

    #[error("invalid blob path '{0}'")]
    InvalidPath(String),

    #[error("failed to read blob '{path}': {message}")]
    Io { path: String, message: String },
}

#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// Read the blob at `path`, failing with [`BlobError::TooLarge`] rather
    /// than returning more than `max_size` bytes.
    async fn get_data(&self, path: &str, max_size: u64) -> Result<Vec<u8>, BlobError>;
}

fn check_size(path: &str, size: u64, max_size: u64) -> Result<(), BlobError> {
    if size > max_size {
        return Err(BlobError::TooLarge {
            path: path.to_string(),
            size,
            max_size,
        });
    }
    Ok(())
}

/// Download a blob, enforcing `max_size` even if the store does not.
pub async fn fetch_blob(
    store: &dyn BlobStore,
    path: &str,
    max_size: u64,
) -> Result<Vec<u8>, BlobError> {
    let data = store.get_data(path, max_size).await?;
    check_size(path, data.len() as u64, max_size)?;
    tracing::debug!("Fetched blob {path} ({} bytes)", data.len());
    Ok(data)
}

/// Blobs held in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<DashMap<String, Arc<Vec<u8>>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<String>, data: Vec<u8>) {
        self.blobs.insert(path.into(), Arc::new(data));
    }
}

#[async_trait::async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get_data(&self, path: &str, max_size: u64) -> Result<Vec<u8>, BlobError> {
        let data = self
            .blobs
            .get(path)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| BlobError::NotFound(path.to_string()))?;
        check_size(path, data.len() as u64, max_size)?;
        Ok(data.as_ref().clone())
    }
}

/// Blobs stored as files below a directory.
#[derive(Debug, Clone)]
pub struct DirBlobStore {
    root: PathBuf,
}

impl DirBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve `path` below the root. Absolute paths and `..` are refused.
    fn resolve(&self, path: &str) -> Result<PathBuf, BlobError> {
        let relative = Path::new(path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if path.trim().is_empty() || escapes {
            return Err(BlobError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait::async_trait]
impl BlobStore for DirBlobStore {
    async fn get_data(&self, path: &str, max_size: u64) -> Result<Vec<u8>, BlobError> {
        let file = self.resolve(path)?;
        let io_err = |e: std::io::Error| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BlobError::NotFound(path.to_string())
            } else {
                BlobError::Io {
                    path: path.to_string(),
                    message: e.to_string(),
                }
            }
        };

        let metadata = tokio::fs::metadata(&file).await.map_err(io_err)?;
        check_size(path, metadata.len(), max_size)?;
        tokio::fs::read(&file).await.map_err(io_err)
    }
}

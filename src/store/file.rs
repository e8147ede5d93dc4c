//! Document store persisted to a single JSON file.
//!
//! Serves as a local stand-in for the hosted backend. Writes are persisted
//! atomically (temp file + rename) before observers see them. With
//! [`FileStore::watch`] enabled, edits made to the file by other processes are
//! picked up and published to observers as well.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use notify::{EventKind, RecursiveMode, Watcher};
use parking_lot::Mutex;
use rescue_document::{DocPath, DocumentMap, RemoteDocument};

use super::MemoryStore;
use crate::client::{ClientError, RemoteDocumentClient, Subscription, WriteError};
use crate::error::Result;

pub struct FileStore {
    path: PathBuf,
    memory: MemoryStore,
    /// Serializes read-modify-persist cycles.
    write_lock: Mutex<()>,
    /// Must be kept alive: dropping it stops the OS file watch.
    _watcher: Option<notify::RecommendedWatcher>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty tree.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let root = read_document(&path)?;
        Ok(Self {
            path,
            memory: MemoryStore::with_root(root),
            write_lock: Mutex::new(()),
            _watcher: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the whole tree.
    pub fn snapshot(&self) -> RemoteDocument {
        self.memory.snapshot()
    }

    /// Start watching the file for outside edits.
    ///
    /// The parent directory is watched (non-recursively) so that editors that
    /// replace the file by renaming are still seen. A file that fails to
    /// parse, typically caught mid-write, is skipped until the next event.
    pub fn watch(&mut self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = self.path.file_name().map(|n| n.to_os_string());
        let path = self.path.clone();
        let memory = self.memory.clone();

        let mut watcher = notify::RecommendedWatcher::new(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                        return;
                    }
                    let ours = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if !ours {
                        return;
                    }
                    match read_document(&path) {
                        Ok(root) => {
                            if memory.replace_root(root) {
                                tracing::debug!("Reloaded {}", path.display());
                            }
                        }
                        Err(e) => {
                            tracing::warn!("Failed to reload {}: {e}", path.display());
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("File watcher error: {e}");
                }
            },
            notify::Config::default(),
        )?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        self._watcher = Some(watcher);
        Ok(())
    }

    fn persist(&self, root: &RemoteDocument) -> std::result::Result<(), WriteError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let persist_err = |e: &dyn std::fmt::Display| {
            WriteError::Persist(format!("{}: {e}", self.path.display()))
        };

        fs::create_dir_all(&dir).map_err(|e| persist_err(&e))?;
        let json = serde_json::to_string_pretty(root).map_err(|e| persist_err(&e))?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| persist_err(&e))?;
        tmp.write_all(json.as_bytes()).map_err(|e| persist_err(&e))?;
        tmp.persist(&self.path).map_err(|e| persist_err(&e.error))?;
        Ok(())
    }
}

fn read_document(path: &Path) -> Result<RemoteDocument> {
    if !path.exists() {
        return Ok(RemoteDocument::empty());
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(RemoteDocument::empty());
    }
    Ok(serde_json::from_str(&content)?)
}

#[async_trait::async_trait]
impl RemoteDocumentClient for FileStore {
    async fn fetch_once(&self, path: &DocPath) -> std::result::Result<RemoteDocument, ClientError> {
        self.memory.fetch_once(path).await
    }

    fn observe(&self, path: &DocPath) -> std::result::Result<Subscription, ClientError> {
        self.memory.observe(path)
    }

    /// The file is re-read before every write, so outside edits not yet
    /// seen by the watcher are kept. An unreadable file falls back to the
    /// in-memory tree and is overwritten.
    async fn write(
        &self,
        path: &DocPath,
        child_key: &str,
        value: DocumentMap,
    ) -> std::result::Result<(), WriteError> {
        let target = path.child(child_key)?;
        let value = RemoteDocument::Map(value);

        let _guard = self.write_lock.lock();
        let mut root = match read_document(&self.path) {
            Ok(disk) => {
                self.memory.replace_root(disk.clone());
                disk
            }
            Err(e) => {
                tracing::warn!("Failed to re-read {} before write: {e}", self.path.display());
                self.memory.snapshot()
            }
        };
        root.set_at(&target, value.clone());
        self.persist(&root)?;
        self.memory.set(&target, value);
        Ok(())
    }
}

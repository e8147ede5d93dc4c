//! In-process remote document store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use parking_lot::RwLock;
use rescue_document::{DocPath, DocumentMap, RemoteDocument};
use tokio::sync::mpsc;

use crate::client::{
    ClientError, RemoteDocumentClient, Subscription, SubscriptionHandle, WriteError,
};

struct Observer {
    path: DocPath,
    sender: mpsc::UnboundedSender<RemoteDocument>,
}

struct Inner {
    root: RwLock<RemoteDocument>,
    observers: DashMap<u64, Observer>,
    next_id: AtomicU64,
}

impl Inner {
    /// Send the current value to every observer whose path overlaps `changed`.
    ///
    /// Called with the root lock held so that deliveries follow write order.
    fn notify(&self, root: &RemoteDocument, changed: &DocPath) {
        let mut dead = Vec::new();
        for entry in self.observers.iter() {
            let observer = entry.value();
            if !observer.path.overlaps(changed) {
                continue;
            }
            if observer.sender.send(root.at_or_empty(&observer.path)).is_err() {
                dead.push(*entry.key());
            }
        }
        for id in dead {
            self.observers.remove(&id);
        }
    }
}

/// Document tree held in memory, with change notification.
///
/// Every write notifies the observers of the written path, of its ancestors
/// and of its descendants. Each observer receives snapshots in write order.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_root(RemoteDocument::empty())
    }

    pub fn with_root(root: RemoteDocument) -> Self {
        Self {
            inner: Arc::new(Inner {
                root: RwLock::new(root),
                observers: DashMap::new(),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Copy of the whole tree.
    pub fn snapshot(&self) -> RemoteDocument {
        self.inner.root.read().clone()
    }

    /// Copy of the node at `path`.
    pub fn get(&self, path: &DocPath) -> RemoteDocument {
        self.inner.root.read().at_or_empty(path)
    }

    /// Replace the node at `path` and notify affected observers.
    pub fn set(&self, path: &DocPath, value: RemoteDocument) {
        let mut root = self.inner.root.write();
        root.set_at(path, value);
        self.inner.notify(&root, path);
    }

    /// Replace the whole tree. Observers are notified only if it changed.
    pub fn replace_root(&self, value: RemoteDocument) -> bool {
        let mut root = self.inner.root.write();
        if *root == value {
            return false;
        }
        *root = value;
        self.inner.notify(&root, &DocPath::root());
        true
    }

    /// Number of live observations.
    pub fn observer_count(&self) -> usize {
        self.inner.observers.len()
    }

    fn register(&self, path: &DocPath) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        // registering under the read lock keeps the initial value ahead of
        // any concurrent write's notification
        {
            let root = self.inner.root.read();
            let _ = sender.send(root.at_or_empty(path));
            self.inner.observers.insert(
                id,
                Observer {
                    path: path.clone(),
                    sender,
                },
            );
        }

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let handle = SubscriptionHandle::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.observers.remove(&id);
            }
        });
        Subscription::new(path.clone(), receiver, handle)
    }
}

#[async_trait::async_trait]
impl RemoteDocumentClient for MemoryStore {
    async fn fetch_once(&self, path: &DocPath) -> Result<RemoteDocument, ClientError> {
        Ok(self.get(path))
    }

    fn observe(&self, path: &DocPath) -> Result<Subscription, ClientError> {
        Ok(self.register(path))
    }

    async fn write(
        &self,
        path: &DocPath,
        child_key: &str,
        value: DocumentMap,
    ) -> Result<(), WriteError> {
        let target = path.child(child_key)?;
        self.set(&target, RemoteDocument::Map(value));
        Ok(())
    }
}

//! Contract for the remote document store.
//!
//! The backend is a key-path-addressable tree that can be read once, observed
//! continuously, and written child-by-child. Observation is modelled as a
//! [`Subscription`]: a stream of whole-node snapshots that can be cancelled
//! synchronously from any thread.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use futures::Stream;
use parking_lot::Mutex;
use rescue_document::{DocPath, DocumentMap, PathError, RemoteDocument};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("remote store unavailable: {0}")]
    Unavailable(String),

    #[error("permission denied at '{0}'")]
    PermissionDenied(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WriteError {
    #[error("write to '{path}' rejected: {reason}")]
    Rejected { path: String, reason: String },

    #[error("remote store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid child key: {0}")]
    InvalidKey(#[from] PathError),

    #[error("failed to persist write: {0}")]
    Persist(String),
}

/// Common interface for remote document stores.
#[async_trait::async_trait]
pub trait RemoteDocumentClient: Send + Sync {
    /// Read the node at `path` once. A missing node reads as the empty document.
    async fn fetch_once(&self, path: &DocPath) -> Result<RemoteDocument, ClientError>;

    /// Observe the node at `path`.
    ///
    /// The current value is delivered first, then one snapshot per change,
    /// in order. Registration is immediate; only delivery is asynchronous.
    fn observe(&self, path: &DocPath) -> Result<Subscription, ClientError>;

    /// Replace the child `child_key` of the node at `path` with `value`,
    /// leaving the node's other children untouched.
    async fn write(
        &self,
        path: &DocPath,
        child_key: &str,
        value: DocumentMap,
    ) -> Result<(), WriteError>;
}

/// Stand-in for a store that could not be reached or opened.
///
/// Reads and observation fail with [`ClientError::Unavailable`], so sessions
/// fall back to their bundled resource; writes fail with
/// [`WriteError::Unavailable`].
#[derive(Debug, Clone)]
pub struct UnavailableClient {
    reason: String,
}

impl UnavailableClient {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait::async_trait]
impl RemoteDocumentClient for UnavailableClient {
    async fn fetch_once(&self, _path: &DocPath) -> Result<RemoteDocument, ClientError> {
        Err(ClientError::Unavailable(self.reason.clone()))
    }

    fn observe(&self, _path: &DocPath) -> Result<Subscription, ClientError> {
        Err(ClientError::Unavailable(self.reason.clone()))
    }

    async fn write(
        &self,
        _path: &DocPath,
        _child_key: &str,
        _value: DocumentMap,
    ) -> Result<(), WriteError> {
        Err(WriteError::Unavailable(self.reason.clone()))
    }
}

type CancelFn = Box<dyn FnOnce() + Send>;

struct HandleInner {
    cancelled: AtomicBool,
    on_cancel: Mutex<Option<CancelFn>>,
}

/// Cancellation side of a [`Subscription`]. Cloneable and idempotent.
#[derive(Clone)]
pub struct SubscriptionHandle {
    inner: Arc<HandleInner>,
}

impl SubscriptionHandle {
    /// Handle that runs `on_cancel` exactly once, on the first cancellation.
    pub fn new(on_cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                cancelled: AtomicBool::new(false),
                on_cancel: Mutex::new(Some(Box::new(on_cancel))),
            }),
        }
    }

    /// Cancel the subscription. Returns `true` only for the call that
    /// actually cancelled it.
    pub fn cancel(&self) -> bool {
        if self.inner.cancelled.swap(true, Ordering::AcqRel) {
            return false;
        }
        if let Some(on_cancel) = self.inner.on_cancel.lock().take() {
            on_cancel();
        }
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Stream of snapshots for one observed path.
///
/// The stream ends once the subscription is cancelled, even if snapshots
/// are still buffered. Dropping the subscription cancels it.
pub struct Subscription {
    path: DocPath,
    receiver: mpsc::UnboundedReceiver<RemoteDocument>,
    handle: SubscriptionHandle,
}

impl Subscription {
    pub fn new(
        path: DocPath,
        receiver: mpsc::UnboundedReceiver<RemoteDocument>,
        handle: SubscriptionHandle,
    ) -> Self {
        Self {
            path,
            receiver,
            handle,
        }
    }

    pub fn path(&self) -> &DocPath {
        &self.path
    }

    pub fn handle(&self) -> SubscriptionHandle {
        self.handle.clone()
    }

    pub fn cancel(&self) -> bool {
        self.handle.cancel()
    }
}

impl Stream for Subscription {
    type Item = RemoteDocument;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.handle.is_cancelled() {
            return Poll::Ready(None);
        }
        self.receiver.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("path", &self.path.to_string())
            .field("handle", &self.handle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_cancel_runs_callback_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handle = SubscriptionHandle::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(handle.cancel());
        assert!(!handle.cancel());
        assert!(!handle.clone().cancel());
        assert!(handle.is_cancelled());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stream_yields_in_order_then_ends_on_cancel() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut sub = Subscription::new(DocPath::root(), rx, SubscriptionHandle::new(|| {}));

        tx.send(RemoteDocument::from("one")).unwrap();
        tx.send(RemoteDocument::from("two")).unwrap();
        assert_eq!(sub.next().await, Some(RemoteDocument::from("one")));
        assert_eq!(sub.next().await, Some(RemoteDocument::from("two")));

        sub.cancel();
        tx.send(RemoteDocument::from("three")).unwrap();
        assert_eq!(sub.next().await, None);
    }

    #[test]
    fn test_drop_cancels() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let handle = SubscriptionHandle::new(|| {});
        let sub = Subscription::new(DocPath::root(), rx, handle.clone());
        drop(sub);
        assert!(handle.is_cancelled());
    }

    #[tokio::test]
    async fn test_unavailable_client_fails_every_call() {
        let client = UnavailableClient::new("database unreadable");
        let path = DocPath::parse("contacts").unwrap();

        assert_eq!(
            client.fetch_once(&path).await,
            Err(ClientError::Unavailable("database unreadable".into()))
        );
        assert!(matches!(client.observe(&path), Err(ClientError::Unavailable(_))));
        assert_eq!(
            client.write(&path, "k", DocumentMap::new()).await,
            Err(WriteError::Unavailable("database unreadable".into()))
        );
    }
}

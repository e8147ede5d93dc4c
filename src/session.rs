//! Sync sessions: one screen's live view of a remote (or bundled) document.
//!
//! A session picks its source once, when it is opened. With a remote source it
//! drains the subscription on a tokio task, decodes every snapshot and hands
//! the result to the registered `on_change` callback, one call per snapshot.
//! With the bundled source it publishes exactly once, synchronously.
//!
//! `on_change` runs on whichever thread delivers the snapshot; callers that
//! own a UI thread must marshal onto it themselves.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::StreamExt;
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use rescue_document::{DocPath, RemoteDocument};
use tokio::task::JoinHandle;

use crate::busy::BusyIndicator;
use crate::client::{RemoteDocumentClient, Subscription, SubscriptionHandle};
use crate::decode::SnapshotDecoder;
use crate::fallback::{Connectivity, LocalFallbackLoader};

/// Collaborators a session is built from.
#[derive(Clone)]
pub struct SessionDeps {
    pub client: Arc<dyn RemoteDocumentClient>,
    pub connectivity: Arc<dyn Connectivity>,
    pub fallback: Arc<dyn LocalFallbackLoader>,
    pub busy: Arc<dyn BusyIndicator>,
}

/// Where a session should read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub remote_path: DocPath,
    /// Bundled resource used when the remote store is unreachable. Without
    /// one, the session observes the remote path unconditionally.
    pub fallback_resource: Option<String>,
    /// Show the busy indicator until the first remote snapshot arrives.
    pub show_busy: bool,
}

impl SourceSpec {
    pub fn remote(remote_path: DocPath) -> Self {
        Self {
            remote_path,
            fallback_resource: None,
            show_busy: true,
        }
    }

    pub fn with_fallback(remote_path: DocPath, resource: impl Into<String>) -> Self {
        Self {
            remote_path,
            fallback_resource: Some(resource.into()),
            show_busy: true,
        }
    }

    /// Load in the background, leaving the busy indicator alone.
    pub fn quiet(mut self) -> Self {
        self.show_busy = false;
        self
    }
}

/// The source a session settled on when it was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSource {
    Remote(DocPath),
    Fallback(String),
    /// Observation failed and there was nothing bundled to fall back to.
    Detached,
}

impl fmt::Display for SessionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionSource::Remote(path) => write!(f, "remote:{path}"),
            SessionSource::Fallback(name) => write!(f, "bundled:{name}"),
            SessionSource::Detached => write!(f, "detached"),
        }
    }
}

type OnChange<T> = Box<dyn Fn(&T) + Send + Sync>;

struct Shared<S: SnapshotDecoder> {
    decoder: S,
    on_change: OnChange<S::Snapshot>,
    snapshot: RwLock<S::Snapshot>,
    closed: AtomicBool,
    /// Held while publishing and while closing. Re-entrant so that
    /// `on_change` may close its own session.
    gate: ReentrantMutex<()>,
    busy: Arc<dyn BusyIndicator>,
    awaiting_first: AtomicBool,
}

impl<S: SnapshotDecoder> Shared<S> {
    /// Decode and publish one snapshot. Returns `false` once closed.
    fn publish(&self, raw: &RemoteDocument) -> bool {
        let _gate = self.gate.lock();
        if self.closed.load(Ordering::Acquire) {
            return false;
        }
        self.settle_busy();

        let snapshot = self.decoder.decode(raw);
        *self.snapshot.write() = snapshot.clone();
        (self.on_change)(&snapshot);
        true
    }

    fn settle_busy(&self) {
        if self.awaiting_first.swap(false, Ordering::AcqRel) {
            self.busy.hide();
        }
    }
}

/// A screen's subscription to one list document.
///
/// Closing (or dropping) the session cancels the subscription; no `on_change`
/// call starts after `close` returns.
pub struct SyncSession<S: SnapshotDecoder> {
    shared: Arc<Shared<S>>,
    source: SessionSource,
    subscription: Option<SubscriptionHandle>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<S: SnapshotDecoder> SyncSession<S> {
    /// Open a session and establish its source immediately.
    ///
    /// Must be called from within a tokio runtime when the source may be
    /// remote.
    pub fn open<F>(deps: &SessionDeps, spec: SourceSpec, decoder: S, on_change: F) -> Self
    where
        F: Fn(&S::Snapshot) + Send + Sync + 'static,
    {
        let shared = Arc::new(Shared {
            decoder,
            on_change: Box::new(on_change),
            snapshot: RwLock::new(S::Snapshot::default()),
            closed: AtomicBool::new(false),
            gate: ReentrantMutex::new(()),
            busy: Arc::clone(&deps.busy),
            awaiting_first: AtomicBool::new(false),
        });

        let use_remote = match &spec.fallback_resource {
            None => true,
            Some(_) => deps.connectivity.is_available(),
        };

        if use_remote {
            match deps.client.observe(&spec.remote_path) {
                Ok(subscription) => {
                    tracing::debug!("Observing {}", spec.remote_path);
                    return Self::attach(shared, spec.remote_path, subscription, spec.show_busy);
                }
                Err(e) => {
                    tracing::warn!("Failed to observe '{}': {e}", spec.remote_path);
                }
            }
        }

        let source = match spec.fallback_resource {
            Some(resource) => {
                tracing::debug!("Loading bundled resource '{resource}'");
                let raw = deps.fallback.load_bundled(&resource);
                shared.publish(&raw);
                SessionSource::Fallback(resource)
            }
            None => {
                shared.publish(&RemoteDocument::empty());
                SessionSource::Detached
            }
        };

        Self {
            shared,
            source,
            subscription: None,
            task: Mutex::new(None),
        }
    }

    fn attach(
        shared: Arc<Shared<S>>,
        path: DocPath,
        subscription: Subscription,
        show_busy: bool,
    ) -> Self {
        if show_busy {
            shared.awaiting_first.store(true, Ordering::Release);
            shared.busy.show();
        }

        let handle = subscription.handle();
        let task = tokio::spawn(drain(Arc::clone(&shared), subscription));

        Self {
            shared,
            source: SessionSource::Remote(path),
            subscription: Some(handle),
            task: Mutex::new(Some(task)),
        }
    }

    /// Last published snapshot (the default value before the first one).
    pub fn snapshot(&self) -> S::Snapshot {
        self.shared.snapshot.read().clone()
    }

    pub fn source(&self) -> &SessionSource {
        &self.source
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Cancel the subscription. Idempotent; a no-op for bundled sources
    /// beyond marking the session closed.
    pub fn close(&self) {
        let _gate = self.shared.gate.lock();
        if self.shared.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(handle) = &self.subscription {
            handle.cancel();
        }
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
        self.shared.settle_busy();
        tracing::debug!("Closed session on {}", self.source);
    }
}

impl<S: SnapshotDecoder> Drop for SyncSession<S> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<S: SnapshotDecoder> fmt::Debug for SyncSession<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncSession")
            .field("source", &self.source)
            .field("closed", &self.is_closed())
            .finish()
    }
}

async fn drain<S: SnapshotDecoder>(shared: Arc<Shared<S>>, mut subscription: Subscription) {
    while let Some(raw) = subscription.next().await {
        if !shared.publish(&raw) {
            break;
        }
    }
}

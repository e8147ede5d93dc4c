pub mod blob;
pub mod busy;
pub mod client;
pub mod commands;
pub mod comments;
pub mod config;
pub mod decode;
pub mod error;
pub mod fallback;
pub mod model;
pub mod screens;
pub mod session;
pub mod store;

pub use blob::{BlobError, BlobStore, DEFAULT_MAX_BLOB_SIZE, DirBlobStore, MemoryBlobStore, fetch_blob};
pub use busy::{BusyCounter, BusyIndicator, NoopBusyIndicator};
pub use client::{
    ClientError, RemoteDocumentClient, Subscription, SubscriptionHandle, UnavailableClient, WriteError,
};
pub use comments::{CommentComposer, SendOutcome, comment_entry, submit_comment};
pub use config::Config;
pub use decode::{
    FlatDecoder, GroupedDecoder, GroupedList, ItemDecoder, SectionRegistry, SnapshotDecoder,
    Validated, decode_flat, decode_grouped,
};
pub use error::{RescueError, Result};
pub use fallback::{BundledResources, Connectivity, FixedConnectivity, LocalFallbackLoader};
pub use model::{CommentDecoder, Contact, ContactDecoder, Photo, PhotoComment};
pub use rescue_document::{DocPath, DocumentMap, PathError, RemoteDocument};
pub use session::{SessionDeps, SessionSource, SourceSpec, SyncSession};
pub use store::{FileStore, MemoryStore};

//! Session wiring for the app's list screens.
//!
//! Each screen opens one [`SyncSession`] when it becomes active and drops it
//! when it goes away. The UI layer passes an `on_change` callback and renders
//! whatever snapshot it receives.

use std::sync::Arc;

use rescue_document::DocPath;

use crate::blob::{BlobError, BlobStore, fetch_blob};
use crate::busy::BusyIndicator;
use crate::comments::CommentComposer;
use crate::decode::{FlatDecoder, GroupedDecoder, GroupedList};
use crate::error::Result;
use crate::model::{CommentDecoder, Contact, ContactDecoder, Photo, PhotoComment};
use crate::session::{SessionDeps, SourceSpec, SyncSession};

/// Remote root of the contacts directory.
pub const CONTACTS_ROOT: &str = "contacts";

/// Name of the bundled contacts resource used offline.
pub const CONTACTS_RESOURCE: &str = "contacts";

/// Remote root of the photo comment threads.
pub const COMMENTS_ROOT: &str = "heros_of_India_comments";

pub type ContactsSession = SyncSession<GroupedDecoder<ContactDecoder>>;
pub type CommentsSession = SyncSession<FlatDecoder<CommentDecoder>>;

/// Open the emergency contacts directory.
///
/// Reads `contacts_root` remotely when connected, the bundled contacts
/// resource otherwise.
pub fn open_contacts<F>(deps: &SessionDeps, contacts_root: &DocPath, on_change: F) -> ContactsSession
where
    F: Fn(&GroupedList<Contact>) + Send + Sync + 'static,
{
    let spec = SourceSpec::with_fallback(contacts_root.clone(), CONTACTS_RESOURCE);
    SyncSession::open(deps, spec, GroupedDecoder(ContactDecoder), on_change)
}

/// Open the validated comment thread of `photo`.
///
/// Returns `Ok(None)` for a photo without an id. Comment threads load in the
/// background without the busy indicator.
pub fn open_comments<F>(
    deps: &SessionDeps,
    comments_root: &DocPath,
    photo: &Photo,
    on_change: F,
) -> Result<Option<CommentsSession>>
where
    F: Fn(&Vec<PhotoComment>) + Send + Sync + 'static,
{
    let Some(id) = photo.id.as_deref() else {
        return Ok(None);
    };
    let spec = SourceSpec::remote(comments_root.child(id)?).quiet();
    Ok(Some(SyncSession::open(deps, spec, FlatDecoder(CommentDecoder), on_change)))
}

/// Comment input for `photo`, writing through the session's client.
pub fn comment_composer(
    deps: &SessionDeps,
    comments_root: &DocPath,
    photo: &Photo,
) -> Result<CommentComposer> {
    CommentComposer::new(Arc::clone(&deps.client), Arc::clone(&deps.busy), comments_root, photo)
}

/// Download the image of `photo`, with the busy indicator up meanwhile.
///
/// Returns `None` for a photo without an image path.
pub async fn download_photo(
    blobs: &dyn BlobStore,
    busy: &dyn BusyIndicator,
    photo: &Photo,
    max_size: u64,
) -> Option<std::result::Result<Vec<u8>, BlobError>> {
    let url = photo.url.as_deref()?;
    busy.show();
    let result = fetch_blob(blobs, url, max_size).await;
    busy.hide();
    if let Err(e) = &result {
        tracing::warn!("Failed to download photo {url}: {e}");
    }
    Some(result)
}

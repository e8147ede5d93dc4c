//! Append-only comment submission.
//!
//! A comment is written under `<comments_root>/<photo_id>/<unix-seconds>`.
//! Two submissions in the same second share a key and the later one wins;
//! nothing here deduplicates them. New comments are always stored
//! unvalidated and stay hidden until moderation flips the flag.

use std::sync::Arc;

use jiff::Timestamp;
use parking_lot::Mutex;
use rescue_document::{DocPath, DocumentMap, RemoteDocument};

use crate::busy::BusyIndicator;
use crate::client::{RemoteDocumentClient, WriteError};
use crate::error::Result;
use crate::model::{Photo, comment_fields};

/// Child key and stored value for a comment submitted at `now`.
pub fn comment_entry(content: &str, now: Timestamp) -> (String, DocumentMap) {
    let key = now.as_second().to_string();
    let mut value = DocumentMap::new();
    value.insert(comment_fields::CONTENT.to_string(), RemoteDocument::from(content));
    value.insert(comment_fields::TIMESTAMP.to_string(), RemoteDocument::from(key.as_str()));
    value.insert(comment_fields::VALIDATED.to_string(), RemoteDocument::Bool(false));
    (key, value)
}

/// Write one comment below `thread`. No retry on failure.
pub async fn submit_comment(
    client: &dyn RemoteDocumentClient,
    thread: &DocPath,
    content: &str,
    now: Timestamp,
) -> std::result::Result<(), WriteError> {
    let (key, value) = comment_entry(content, now);
    client.write(thread, &key, value).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// The photo has no id, so there is no thread to post to.
    Skipped,
}

/// The comment input of a photo preview.
///
/// Holds the text being typed and posts it on [`send`](Self::send). The
/// input is cleared once the write completes, whether it succeeded or not.
pub struct CommentComposer {
    client: Arc<dyn RemoteDocumentClient>,
    busy: Arc<dyn BusyIndicator>,
    thread: Option<DocPath>,
    input: Mutex<String>,
}

impl CommentComposer {
    pub fn new(
        client: Arc<dyn RemoteDocumentClient>,
        busy: Arc<dyn BusyIndicator>,
        comments_root: &DocPath,
        photo: &Photo,
    ) -> Result<Self> {
        let thread = match photo.id.as_deref() {
            Some(id) => Some(comments_root.child(id)?),
            None => None,
        };
        Ok(Self {
            client,
            busy,
            thread,
            input: Mutex::new(String::new()),
        })
    }

    /// Path the comments are written under, if the photo has an id.
    pub fn thread(&self) -> Option<&DocPath> {
        self.thread.as_ref()
    }

    pub fn set_input(&self, text: impl Into<String>) {
        *self.input.lock() = text.into();
    }

    pub fn input(&self) -> String {
        self.input.lock().clone()
    }

    /// Post the current input as a comment stamped `now`.
    ///
    /// Failures are logged here and returned so callers can react; the input
    /// is cleared either way.
    pub async fn send(&self, now: Timestamp) -> std::result::Result<SendOutcome, WriteError> {
        let Some(thread) = &self.thread else {
            return Ok(SendOutcome::Skipped);
        };
        let content = self.input();

        self.busy.show();
        let result = submit_comment(self.client.as_ref(), thread, &content, now).await;
        self.busy.hide();
        self.input.lock().clear();

        match result {
            Ok(()) => {
                tracing::info!("Posted comment to {thread}");
                Ok(SendOutcome::Sent)
            }
            Err(e) => {
                tracing::warn!("Failed to post comment to {thread}: {e}");
                Err(e)
            }
        }
    }
}

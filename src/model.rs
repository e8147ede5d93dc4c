//! Domain items decoded from remote documents.

use jiff::Timestamp;
use rescue_document::RemoteDocument;
use serde::{Deserialize, Serialize};

use crate::decode::{ItemDecoder, Validated};

/// Field names of a stored photo comment.
pub mod comment_fields {
    pub const CONTENT: &str = "comment";
    pub const TIMESTAMP: &str = "timestamp";
    pub const AUTHOR: &str = "author";
    pub const VALIDATED: &str = "isValidated";
}

/// One entry of the emergency contacts directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub phones: Vec<String>,
}

impl Validated for Contact {}

/// Decodes `name: phone`, `name: [phones]` and `name: {label: phone}` entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactDecoder;

impl ItemDecoder for ContactDecoder {
    type Item = Contact;

    fn decode_item(&self, key: &str, value: &RemoteDocument) -> Option<Contact> {
        let phones = match value {
            RemoteDocument::String(s) if s.trim().is_empty() => Vec::new(),
            RemoteDocument::String(_) | RemoteDocument::Number(_) => {
                value.scalar_text().into_iter().collect()
            }
            RemoteDocument::List(items) => {
                items.iter().filter_map(RemoteDocument::scalar_text).collect()
            }
            RemoteDocument::Map(map) => map.values().filter_map(RemoteDocument::scalar_text).collect(),
            RemoteDocument::Bool(_) => return None,
        };
        Some(Contact {
            name: key.to_string(),
            phones,
        })
    }
}

/// A user comment on a gallery photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoComment {
    /// Child key the comment is stored under.
    pub key: String,
    pub content: String,
    pub timestamp: String,
    pub author: String,
    pub validated: bool,
}

impl PhotoComment {
    /// The timestamp as `YYYY-MM-DD HH:MM` (UTC), or the raw text when it is
    /// not a count of seconds.
    pub fn formatted_date(&self) -> String {
        self.timestamp
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|secs| Timestamp::from_second(secs).ok())
            .map(|ts| ts.strftime("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| self.timestamp.clone())
    }
}

impl Validated for PhotoComment {
    fn is_validated(&self) -> bool {
        self.validated
    }
}

/// Decodes `{comment, timestamp, author?, isValidated?}` maps.
///
/// A missing `isValidated` counts as validated.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentDecoder;

impl ItemDecoder for CommentDecoder {
    type Item = PhotoComment;

    fn decode_item(&self, key: &str, value: &RemoteDocument) -> Option<PhotoComment> {
        let map = value.as_map()?;
        let text = |field: &str| map.get(field).and_then(RemoteDocument::scalar_text);

        Some(PhotoComment {
            key: key.to_string(),
            content: text(comment_fields::CONTENT).unwrap_or_default(),
            timestamp: text(comment_fields::TIMESTAMP).unwrap_or_else(|| key.to_string()),
            author: text(comment_fields::AUTHOR).unwrap_or_default(),
            validated: map
                .get(comment_fields::VALIDATED)
                .and_then(RemoteDocument::as_bool)
                .unwrap_or(true),
        })
    }
}

/// A gallery photo as handed to the preview screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: Option<String>,
    /// Blob store path of the image.
    pub url: Option<String>,
    #[serde(default)]
    pub story: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_flat;
    use serde_json::json;

    fn contact(value: serde_json::Value) -> Option<Contact> {
        ContactDecoder.decode_item("Control Room", &RemoteDocument::from(value))
    }

    #[test]
    fn test_contact_shapes() {
        assert_eq!(contact(json!("101")).unwrap().phones, vec!["101"]);
        assert_eq!(contact(json!(1077)).unwrap().phones, vec!["1077"]);
        assert_eq!(
            contact(json!(["0471 2331639", 112, true])).unwrap().phones,
            vec!["0471 2331639", "112"]
        );
        assert_eq!(
            contact(json!({"mobile": "9447", "office": "0471"})).unwrap().phones,
            vec!["9447", "0471"]
        );
        assert_eq!(contact(json!("Control Room")).unwrap().name, "Control Room");
    }

    #[test]
    fn test_contact_missing_phone_defaults_to_empty() {
        assert!(contact(json!("")).unwrap().phones.is_empty());
        assert!(contact(json!("  ")).unwrap().phones.is_empty());
        assert!(contact(json!({})).unwrap().phones.is_empty());
        assert!(contact(json!([])).unwrap().phones.is_empty());
    }

    #[test]
    fn test_contact_bool_dropped() {
        assert_eq!(contact(json!(false)), None);
    }

    #[test]
    fn test_comment_defaults() {
        let comment = CommentDecoder
            .decode_item("1535000000", &RemoteDocument::from(json!({})))
            .unwrap();
        assert_eq!(comment.content, "");
        assert_eq!(comment.timestamp, "1535000000");
        assert_eq!(comment.author, "");
        assert!(comment.validated);
    }

    #[test]
    fn test_comment_non_bool_flag_counts_as_absent() {
        let comment = CommentDecoder
            .decode_item("k", &RemoteDocument::from(json!({"isValidated": "false"})))
            .unwrap();
        assert!(comment.validated);
    }

    #[test]
    fn test_comment_non_map_dropped() {
        assert_eq!(CommentDecoder.decode_item("k", &RemoteDocument::from("text")), None);
    }

    #[test]
    fn test_comment_validation_examples() {
        let included = RemoteDocument::from(json!({"t1": {"comment": "ok", "timestamp": "t1"}}));
        let comments = decode_flat(&included, &CommentDecoder);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].content, "ok");

        let excluded = RemoteDocument::from(
            json!({"t2": {"comment": "bad", "timestamp": "t2", "isValidated": false}}),
        );
        assert!(decode_flat(&excluded, &CommentDecoder).is_empty());
    }

    #[test]
    fn test_formatted_date() {
        let mut comment = CommentDecoder
            .decode_item("k", &RemoteDocument::from(json!({"timestamp": 1535000000})))
            .unwrap();
        assert_eq!(comment.timestamp, "1535000000");
        assert_eq!(comment.formatted_date(), "2018-08-23 04:53");

        comment.timestamp = "yesterday".to_string();
        assert_eq!(comment.formatted_date(), "yesterday");
    }
}

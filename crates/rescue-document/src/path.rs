use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Characters the backend refuses inside a key.
const FORBIDDEN_KEY_CHARS: &[char] = &['.', '#', '$', '[', ']'];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("invalid path segment '{segment}': keys cannot contain '.', '#', '$', '[' or ']'")]
    InvalidSegment { segment: String },

    #[error("empty child key")]
    EmptyKey,
}

/// Slash-delimited address of a node inside a remote document.
///
/// Empty segments are ignored, so `"/contacts//sections/"` and
/// `"contacts/sections"` are the same path. The empty path is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocPath {
    segments: Vec<String>,
}

impl DocPath {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a slash-delimited path.
    pub fn parse(s: &str) -> Result<Self, PathError> {
        let mut segments = Vec::new();
        for segment in s.split('/').filter(|seg| !seg.is_empty()) {
            validate_segment(segment)?;
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// Append a single child key.
    pub fn child(&self, key: &str) -> Result<Self, PathError> {
        if key.is_empty() {
            return Err(PathError::EmptyKey);
        }
        if key.contains('/') {
            return Err(PathError::InvalidSegment {
                segment: key.to_string(),
            });
        }
        validate_segment(key)?;
        let mut segments = self.segments.clone();
        segments.push(key.to_string());
        Ok(Self { segments })
    }

    /// Append every segment of `other`.
    pub fn join(&self, other: &DocPath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment, if any.
    pub fn key(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// True when `self` equals `other` or is one of its ancestors.
    pub fn contains(&self, other: &DocPath) -> bool {
        other.segments.starts_with(&self.segments)
    }

    /// True when a change at one path can alter the value seen at the other.
    pub fn overlaps(&self, other: &DocPath) -> bool {
        self.contains(other) || other.contains(self)
    }
}

fn validate_segment(segment: &str) -> Result<(), PathError> {
    if segment.contains(FORBIDDEN_KEY_CHARS) {
        return Err(PathError::InvalidSegment {
            segment: segment.to_string(),
        });
    }
    Ok(())
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl FromStr for DocPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocPath::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_empty_segments() {
        let a = DocPath::parse("/contacts//sections/").unwrap();
        let b = DocPath::parse("contacts/sections").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "contacts/sections");
        assert_eq!(a.segments().len(), 2);
    }

    #[test]
    fn test_root() {
        let root = DocPath::parse("").unwrap();
        assert!(root.is_root());
        assert_eq!(root, DocPath::root());
        assert_eq!(root.parent(), None);
        assert_eq!(root.key(), None);
    }

    #[test]
    fn test_rejects_forbidden_characters() {
        assert!(DocPath::parse("contacts/fire.dept").is_err());
        assert!(DocPath::parse("a/b#c").is_err());
        assert!(DocPath::root().child("x$").is_err());
    }

    #[test]
    fn test_child_rejects_slash_and_empty() {
        let root = DocPath::root();
        assert_eq!(root.child(""), Err(PathError::EmptyKey));
        assert!(root.child("a/b").is_err());
    }

    #[test]
    fn test_child_and_parent() {
        let base = DocPath::parse("heros_of_India_comments").unwrap();
        let photo = base.child("p1").unwrap();
        let comment = photo.child("1700000000").unwrap();
        assert_eq!(comment.to_string(), "heros_of_India_comments/p1/1700000000");
        assert_eq!(comment.key(), Some("1700000000"));
        assert_eq!(comment.parent(), Some(photo));
    }

    #[test]
    fn test_overlaps() {
        let contacts = DocPath::parse("contacts").unwrap();
        let sections = DocPath::parse("contacts/sections").unwrap();
        let comments = DocPath::parse("comments").unwrap();

        assert!(contacts.contains(&sections));
        assert!(!sections.contains(&contacts));
        assert!(contacts.overlaps(&sections));
        assert!(sections.overlaps(&contacts));
        assert!(!contacts.overlaps(&comments));
        assert!(DocPath::root().overlaps(&comments));
    }

    #[test]
    fn test_join() {
        let a = DocPath::parse("a/b").unwrap();
        let b = DocPath::parse("c").unwrap();
        assert_eq!(a.join(&b).to_string(), "a/b/c");
    }
}

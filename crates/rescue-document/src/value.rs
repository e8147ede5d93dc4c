use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::path::DocPath;

/// Children of a map node, ordered by key.
pub type DocumentMap = BTreeMap<String, RemoteDocument>;

/// A value stored in, or read from, the remote document store.
///
/// The store has no null: absent values are simply missing keys. Converting
/// from JSON drops `null` entries, and a bare `null` reads as the empty map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum RemoteDocument {
    String(String),
    Number(Number),
    Bool(bool),
    Map(DocumentMap),
    List(Vec<RemoteDocument>),
}

impl Default for RemoteDocument {
    fn default() -> Self {
        Self::empty()
    }
}

impl RemoteDocument {
    /// The empty document: a map with no children.
    pub fn empty() -> Self {
        RemoteDocument::Map(DocumentMap::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RemoteDocument::Map(map) if map.is_empty())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RemoteDocument::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RemoteDocument::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            RemoteDocument::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&DocumentMap> {
        match self {
            RemoteDocument::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[RemoteDocument]> {
        match self {
            RemoteDocument::List(items) => Some(items),
            _ => None,
        }
    }

    /// Direct child of a map node.
    pub fn get(&self, key: &str) -> Option<&RemoteDocument> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Node at `path`, or `None` if any step is missing or not a map.
    pub fn at(&self, path: &DocPath) -> Option<&RemoteDocument> {
        let mut node = self;
        for segment in path.segments() {
            node = node.get(segment)?;
        }
        Some(node)
    }

    /// Owned copy of the node at `path`, degrading to the empty document.
    pub fn at_or_empty(&self, path: &DocPath) -> RemoteDocument {
        self.at(path).cloned().unwrap_or_default()
    }

    /// Replace the node at `path` with `value`, creating intermediate maps.
    ///
    /// Any non-map node met on the way is replaced by a map, matching how the
    /// backend treats a write beneath a leaf.
    pub fn set_at(&mut self, path: &DocPath, value: RemoteDocument) {
        let Some((first, rest)) = path.segments().split_first() else {
            *self = value;
            return;
        };
        set_in(self, first, rest, value);
    }

    /// Render a scalar as display text. Integral numbers lose their fraction.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            RemoteDocument::String(s) => Some(s.clone()),
            RemoteDocument::Number(n) => Some(number_text(n)),
            _ => None,
        }
    }
}

/// Set `key/rest..` below `node`, replacing non-map nodes on the way.
fn set_in(node: &mut RemoteDocument, key: &str, rest: &[String], value: RemoteDocument) {
    if !matches!(node, RemoteDocument::Map(_)) {
        *node = RemoteDocument::empty();
    }
    if let RemoteDocument::Map(map) = node {
        let child = map.entry(key.to_string()).or_insert_with(RemoteDocument::empty);
        match rest.split_first() {
            Some((next, rest)) => set_in(child, next, rest, value),
            None => *child = value,
        }
    }
}

fn number_text(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

impl From<Value> for RemoteDocument {
    fn from(value: Value) -> Self {
        from_json(value).unwrap_or_default()
    }
}

fn from_json(value: Value) -> Option<RemoteDocument> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(RemoteDocument::Bool(b)),
        Value::Number(n) => Some(RemoteDocument::Number(n)),
        Value::String(s) => Some(RemoteDocument::String(s)),
        Value::Array(items) => Some(RemoteDocument::List(
            items.into_iter().filter_map(from_json).collect(),
        )),
        Value::Object(entries) => Some(RemoteDocument::Map(
            entries
                .into_iter()
                .filter_map(|(key, value)| from_json(value).map(|v| (key, v)))
                .collect(),
        )),
    }
}

impl From<RemoteDocument> for Value {
    fn from(doc: RemoteDocument) -> Self {
        match doc {
            RemoteDocument::String(s) => Value::String(s),
            RemoteDocument::Number(n) => Value::Number(n),
            RemoteDocument::Bool(b) => Value::Bool(b),
            RemoteDocument::List(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            RemoteDocument::Map(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for RemoteDocument {
    fn from(s: &str) -> Self {
        RemoteDocument::String(s.to_string())
    }
}

impl From<String> for RemoteDocument {
    fn from(s: String) -> Self {
        RemoteDocument::String(s)
    }
}

impl From<bool> for RemoteDocument {
    fn from(b: bool) -> Self {
        RemoteDocument::Bool(b)
    }
}

impl From<i64> for RemoteDocument {
    fn from(n: i64) -> Self {
        RemoteDocument::Number(Number::from(n))
    }
}

impl From<DocumentMap> for RemoteDocument {
    fn from(map: DocumentMap) -> Self {
        RemoteDocument::Map(map)
    }
}

//! Decoding raw remote documents into list snapshots.
//!
//! Decoding is total: a malformed entry is dropped, a malformed container
//! reads as empty, and nothing here returns an error.

use std::collections::BTreeMap;

use rescue_document::RemoteDocument;

/// Key of the section label map in a grouped document.
pub const SECTIONS_KEY: &str = "sections";

/// Key of the per-section item maps in a grouped document.
pub const SECTION_DETAILS_KEY: &str = "section_details";

/// Decodes one raw child entry into a domain item.
pub trait ItemDecoder: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    /// Returns `None` when `value` lacks the item's minimal required shape.
    fn decode_item(&self, key: &str, value: &RemoteDocument) -> Option<Self::Item>;
}

/// Moderation gate for user-submitted items.
pub trait Validated {
    fn is_validated(&self) -> bool {
        true
    }
}

/// Ordered `section key -> display label` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionRegistry {
    entries: Vec<(String, String)>,
}

impl SectionRegistry {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.label(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Section key to its decoded items.
pub type SectionDetailMap<T> = BTreeMap<String, Vec<T>>;

/// Decoded form of a grouped document.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedList<T> {
    pub registry: SectionRegistry,
    pub details: SectionDetailMap<T>,
}

impl<T> Default for GroupedList<T> {
    fn default() -> Self {
        Self {
            registry: SectionRegistry::default(),
            details: SectionDetailMap::new(),
        }
    }
}

impl<T> GroupedList<T> {
    /// Registered section keys, in registry order.
    pub fn section_keys(&self) -> impl Iterator<Item = &str> {
        self.registry.keys()
    }

    /// Every key with a detail entry, including sections missing from the registry.
    pub fn detail_keys(&self) -> impl Iterator<Item = &str> {
        self.details.keys().map(String::as_str)
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.registry.label(key)
    }

    pub fn items(&self, key: &str) -> &[T] {
        self.details.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty() && self.details.is_empty()
    }
}

/// Decode `{sections: {..}, section_details: {..}}` into a grouped list.
pub fn decode_grouped<D: ItemDecoder>(raw: &RemoteDocument, decoder: &D) -> GroupedList<D::Item> {
    let mut list = GroupedList::default();

    if let Some(sections) = raw.get(SECTIONS_KEY).and_then(RemoteDocument::as_map) {
        for (key, value) in sections {
            if let Some(label) = value.as_str() {
                list.registry.entries.push((key.clone(), label.to_string()));
            }
        }
    }

    if let Some(details) = raw.get(SECTION_DETAILS_KEY).and_then(RemoteDocument::as_map) {
        for (section, value) in details {
            let Some(children) = value.as_map() else {
                continue;
            };
            let items = children
                .iter()
                .filter_map(|(key, child)| decoder.decode_item(key, child))
                .collect();
            list.details.insert(section.clone(), items);
        }
    }

    for (key, _) in &list.registry.entries {
        list.details.entry(key.clone()).or_default();
    }

    list
}

/// Decode every child of `raw` and keep the validated ones.
///
/// Items report their own validation; an item without a flag counts as validated.
pub fn decode_flat<D>(raw: &RemoteDocument, decoder: &D) -> Vec<D::Item>
where
    D: ItemDecoder,
    D::Item: Validated,
{
    let Some(children) = raw.as_map() else {
        return Vec::new();
    };
    children
        .iter()
        .filter_map(|(key, child)| decoder.decode_item(key, child))
        .filter(|item| item.is_validated())
        .collect()
}

/// Turns a raw snapshot into the value a session publishes.
pub trait SnapshotDecoder: Send + Sync + 'static {
    type Snapshot: Clone + Default + Send + Sync + 'static;

    fn decode(&self, raw: &RemoteDocument) -> Self::Snapshot;
}

/// Publishes a [`GroupedList`] built with the wrapped item decoder.
#[derive(Debug, Clone, Default)]
pub struct GroupedDecoder<D>(pub D);

impl<D: ItemDecoder> SnapshotDecoder for GroupedDecoder<D> {
    type Snapshot = GroupedList<D::Item>;

    fn decode(&self, raw: &RemoteDocument) -> Self::Snapshot {
        decode_grouped(raw, &self.0)
    }
}

/// Publishes the validated flat list built with the wrapped item decoder.
#[derive(Debug, Clone, Default)]
pub struct FlatDecoder<D>(pub D);

impl<D> SnapshotDecoder for FlatDecoder<D>
where
    D: ItemDecoder,
    D::Item: Validated,
{
    type Snapshot = Vec<D::Item>;

    fn decode(&self, raw: &RemoteDocument) -> Self::Snapshot {
        decode_flat(raw, &self.0)
    }
}

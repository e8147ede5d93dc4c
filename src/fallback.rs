//! Source selection and the bundled offline data.
//!
//! The bundle is a JSON object keyed by resource name. Each value is either
//! the document itself or a string holding the document as JSON text, which
//! is how the shipped bundle stores the contacts directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rescue_document::RemoteDocument;
use serde_json::Value;

/// Point-in-time check for whether the remote store is reachable.
pub trait Connectivity: Send + Sync {
    fn is_available(&self) -> bool;
}

impl<F> Connectivity for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_available(&self) -> bool {
        self()
    }
}

/// Connectivity fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedConnectivity(pub bool);

impl Connectivity for FixedConnectivity {
    fn is_available(&self) -> bool {
        self.0
    }
}

/// Loads bundled documents used when the remote store is unreachable.
///
/// Never fails: a missing or unreadable resource is the empty document.
pub trait LocalFallbackLoader: Send + Sync {
    fn load_bundled(&self, resource_name: &str) -> RemoteDocument;
}

#[derive(Debug, Clone)]
enum BundleSource {
    File(PathBuf),
    Inline(BTreeMap<String, RemoteDocument>),
}

/// Bundle of fallback documents, read from a JSON file or held in memory.
#[derive(Debug, Clone)]
pub struct BundledResources {
    source: BundleSource,
}

impl BundledResources {
    /// Bundle backed by a JSON file. The file is read on every load.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: BundleSource::File(path.into()),
        }
    }

    pub fn from_documents(documents: BTreeMap<String, RemoteDocument>) -> Self {
        Self {
            source: BundleSource::Inline(documents),
        }
    }

    /// A bundle with no resources.
    pub fn empty() -> Self {
        Self::from_documents(BTreeMap::new())
    }
}

impl LocalFallbackLoader for BundledResources {
    fn load_bundled(&self, resource_name: &str) -> RemoteDocument {
        match &self.source {
            BundleSource::Inline(documents) => {
                documents.get(resource_name).cloned().unwrap_or_default()
            }
            BundleSource::File(path) => load_from_file(path, resource_name),
        }
    }
}

fn load_from_file(path: &Path, resource_name: &str) -> RemoteDocument {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Failed to read bundle {}: {e}", path.display());
            return RemoteDocument::empty();
        }
    };
    let bundle: Value = match serde_json::from_str(&content) {
        Ok(bundle) => bundle,
        Err(e) => {
            tracing::warn!("Failed to parse bundle {}: {e}", path.display());
            return RemoteDocument::empty();
        }
    };

    match bundle.get(resource_name) {
        Some(Value::String(embedded)) => match serde_json::from_str::<Value>(embedded) {
            Ok(value) => RemoteDocument::from(value),
            Err(e) => {
                tracing::warn!("Bundled resource '{resource_name}' is not valid JSON: {e}");
                RemoteDocument::empty()
            }
        },
        Some(value) => RemoteDocument::from(value.clone()),
        None => {
            tracing::debug!("Bundle {} has no resource '{resource_name}'", path.display());
            RemoteDocument::empty()
        }
    }
}

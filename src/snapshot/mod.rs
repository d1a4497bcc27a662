//! Page snapshot extraction
//!
//! A snapshot maps a path for every qualifying node under the extraction root
//! to the node's attribute record:
//! - path: assigns `//html[1]/body[1]/div[2]` style keys and resolves XPaths
//! - attributes: per-node records (tag, text, form state, raw attributes, styles)
//! - style: computed style sampling against the parent
//! - geometry: absolute and parent-relative boxes
//! - viewport: document width measurement and reference-width scaling
//! - walker: the recursive walk tying them together

pub mod attributes;
pub mod config;
pub mod geometry;
pub mod path;
pub mod style;
pub mod viewport;
pub mod walker;

pub use attributes::{AttributeExtractor, AttributeRecord, AttributeValue, DisabledState};
pub use config::{HtmlAttributes, SnapshotConfig};
pub use path::{PathKey, TagCounter, element_xpath};
pub use viewport::ViewportScale;
pub use walker::TreeWalker;

use crate::dom::{NodeId, PageDocument};
use crate::error::{BrowserError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Path-keyed attribute records of one extraction
///
/// Records are kept in document order, though callers should not rely on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    records: IndexMap<PathKey, AttributeRecord>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: PathKey, record: AttributeRecord) {
        self.records.insert(path, record);
    }

    pub fn get(&self, path: &str) -> Option<&AttributeRecord> {
        self.records.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.records.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &PathKey> {
        self.records.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathKey, &AttributeRecord)> {
        self.records.iter()
    }

    pub fn into_inner(self) -> IndexMap<PathKey, AttributeRecord> {
        self.records
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| BrowserError::DomParseFailed(format!("Failed to serialize snapshot to JSON: {}", e)))
    }
}

/// Extract a snapshot rooted at the document's selected node, or at its root element
pub fn extract_snapshot(doc: &PageDocument, config: &SnapshotConfig) -> Result<Snapshot> {
    extract_snapshot_from(doc, config, doc.selected())
}

/// Extract a snapshot rooted at `root`, or at `<html>` when `root` is `None`
///
/// The `<html>` root is keyed `//html[1]`; any other root is keyed by its
/// XPath.
pub fn extract_snapshot_from(doc: &PageDocument, config: &SnapshotConfig, root: Option<NodeId>) -> Result<Snapshot> {
    config.validate()?;
    let scale = ViewportScale::measure(doc.metrics(), config.reference_width)?;

    let (root, root_path) = match root {
        Some(root) => {
            let xpath = element_xpath(doc, root).ok_or(BrowserError::UnresolvableRoot)?;
            (root, PathKey::new(xpath))
        }
        None => {
            let html = doc
                .document_element()
                .ok_or_else(|| BrowserError::ElementNotFound("Document has no root element".to_string()))?;
            (html, PathKey::document_root())
        }
    };
    log::debug!("Extracting snapshot rooted at {}", root_path);

    let extractor = AttributeExtractor::new(doc, config, scale);
    let mut snapshot = Snapshot::new();
    TreeWalker::new(doc, extractor).walk_root(root, root_path, &mut snapshot);

    log::debug!("Snapshot holds {} records", snapshot.len());
    Ok(snapshot)
}

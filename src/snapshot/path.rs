use crate::dom::{NodeId, NodeKind, PageDocument};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

/// Path of the document's `<html>` element
pub const DOCUMENT_ROOT_PATH: &str = "//html[1]";

/// Tag used in paths for qualifying text nodes
pub const TEXT_NODE_TAG: &str = "textnode";

/// Position of a node relative to the extraction root, e.g. `//html[1]/body[1]/div[2]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathKey(String);

impl PathKey {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn document_root() -> Self {
        Self::new(DOCUMENT_ROOT_PATH)
    }

    /// Append a `/<tag>[<index>]` segment
    pub fn child(&self, tag: &str, index: usize) -> Self {
        Self(format!("{}/{}[{}]", self.0, tag, index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PathKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Per-parent occurrence counter, one per child list walk
#[derive(Debug, Default)]
pub struct TagCounter {
    counts: HashMap<String, usize>,
}

impl TagCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more occurrence of `tag` and return its 1-based index
    pub fn increase(&mut self, tag: &str) -> usize {
        let count = self.counts.entry(tag.to_string()).or_insert(0);
        *count += 1;
        *count
    }
}

/// Canonical XPath of an element, walking up to the document
///
/// Each segment is indexed among preceding siblings with the same node name,
/// doctype nodes excluded. Returns `None` when `node` is not an element.
pub fn element_xpath(doc: &PageDocument, node: NodeId) -> Option<String> {
    let mut segments = Vec::new();
    let mut current = Some(node);

    while let Some(id) = current.filter(|&id| doc.kind(id) == NodeKind::Element) {
        let name = &doc.node(id).node_name;
        let mut index = 1;
        let mut sibling = doc.previous_sibling(id);
        while let Some(prev) = sibling {
            if doc.kind(prev) != NodeKind::DocumentType && doc.node(prev).node_name == *name {
                index += 1;
            }
            sibling = doc.previous_sibling(prev);
        }
        segments.push(format!("{}[{}]", name.to_ascii_lowercase(), index));
        current = doc.parent(id);
    }

    if segments.is_empty() {
        return None;
    }
    segments.reverse();
    Some(format!("/{}", segments.join("/")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{CapturedNode, CapturedPage, ViewportMetrics};

    fn create_test_document() -> PageDocument {
        let body = CapturedNode::element("body")
            .with_child(CapturedNode::element("div"))
            .with_child(CapturedNode::text("x"))
            .with_child(CapturedNode::element("p"))
            .with_child(CapturedNode::element("div").with_attribute("id", "second"));
        let html = CapturedNode::element("html")
            .with_child(CapturedNode::element("head"))
            .with_child(body);

        PageDocument::new(CapturedPage {
            metrics: ViewportMetrics::uniform(800.0),
            document: CapturedNode::document()
                .with_child(CapturedNode::doctype())
                .with_child(html),
        })
    }

    #[test]
    fn test_path_key_child() {
        let root = PathKey::document_root();
        let child = root.child("body", 1).child(TEXT_NODE_TAG, 2);
        assert_eq!(child.as_str(), "//html[1]/body[1]/textnode[2]");
        assert_eq!(child.to_string(), child.as_str());
    }

    #[test]
    fn test_tag_counter() {
        let mut counter = TagCounter::new();
        assert_eq!(counter.increase("div"), 1);
        assert_eq!(counter.increase("span"), 1);
        assert_eq!(counter.increase("div"), 2);
        assert_eq!(counter.increase("div"), 3);
    }

    #[test]
    fn test_element_xpath() {
        let doc = create_test_document();
        let second = doc.find_by_attribute("id", "second").unwrap();
        assert_eq!(element_xpath(&doc, second).as_deref(), Some("/html[1]/body[1]/div[2]"));

        let html = doc.document_element().unwrap();
        assert_eq!(element_xpath(&doc, html).as_deref(), Some("/html[1]"));
    }

    #[test]
    fn test_xpath_of_non_element() {
        let doc = create_test_document();
        assert_eq!(element_xpath(&doc, doc.document()), None);

        let text = doc.ids().find(|&id| doc.kind(id) == NodeKind::Text).unwrap();
        assert_eq!(element_xpath(&doc, text), None);
    }
}

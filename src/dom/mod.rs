//! Captured DOM representation
//!
//! The browser tab is read once by a capture script that records raw node
//! facts (attributes, DOM properties, layout boxes, requested computed
//! styles). This module holds those facts:
//! - CapturedNode: serde form of one node, with builders for whole subtrees
//! - FlatPage: the capture payload, nodes in pre-order with parent indices
//! - PageDocument: the capture as an arena with DOM-like navigation

pub mod document;
pub mod node;

pub use document::{NodeId, PageDocument};
pub use node::{BoundingBox, CapturedNode, CapturedPage, FlatNode, FlatPage, NodeKind, NodeProperties, ViewportMetrics};

use crate::error::Result;
use headless_chrome::Tab;
use std::sync::Arc;

/// Capture the whole document of a browser tab
pub fn capture_document(tab: &Arc<Tab>, css_properties: &[String]) -> Result<PageDocument> {
    PageDocument::from_tab(tab, css_properties, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captured_node_export() {
        let element = CapturedNode::element("div");
        assert_eq!(element.tag_name.as_deref(), Some("DIV"));
    }

    #[test]
    fn test_page_document_export() {
        let page = CapturedPage {
            metrics: ViewportMetrics::uniform(800.0),
            document: CapturedNode::document().with_child(CapturedNode::element("html")),
        };
        let doc = PageDocument::new(page);
        assert!(doc.document_element().is_some());
    }
}

use crate::dom::{NodeId, NodeKind, PageDocument};
use crate::snapshot::Snapshot;
use crate::snapshot::attributes::AttributeExtractor;
use crate::snapshot::path::{PathKey, TEXT_NODE_TAG, TagCounter};
use std::collections::HashMap;

/// Non-whitespace text
fn is_non_empty_text(doc: &PageDocument, node: NodeId) -> bool {
    doc.kind(node) == NodeKind::Text
        && doc
            .node(node)
            .node_value
            .as_deref()
            .is_some_and(|value| !value.trim().is_empty())
}

/// Walks a subtree, assigning paths and extracting a record per qualifying node
///
/// Text nodes have no tag; the synthetic one they are counted under is kept
/// in a side map instead of on the node.
pub struct TreeWalker<'a> {
    doc: &'a PageDocument,
    extractor: AttributeExtractor<'a>,
    synthetic_tags: HashMap<NodeId, &'static str>,
}

impl<'a> TreeWalker<'a> {
    pub fn new(doc: &'a PageDocument, extractor: AttributeExtractor<'a>) -> Self {
        Self {
            doc,
            extractor,
            synthetic_tags: HashMap::new(),
        }
    }

    /// Path tag of `child` if it qualifies for the snapshot
    ///
    /// Elements always qualify. Text qualifies when it is not blank and sits
    /// next to element siblings.
    fn qualifying_tag(&mut self, parent: NodeId, child: NodeId) -> Option<String> {
        let doc = self.doc;
        match doc.kind(child) {
            NodeKind::Element => {
                let data = doc.node(child);
                Some(data.tag_name.as_deref().unwrap_or(&data.node_name).to_ascii_lowercase())
            }
            NodeKind::Text if is_non_empty_text(doc, child) && doc.has_element_children(parent) => {
                self.synthetic_tags.insert(child, TEXT_NODE_TAG);
                Some(TEXT_NODE_TAG.to_string())
            }
            _ => None,
        }
    }

    /// Record `root` under `root_path`, then walk its descendants
    pub fn walk_root(&mut self, root: NodeId, root_path: PathKey, snapshot: &mut Snapshot) {
        let record = self.extractor.extract(root, None);
        snapshot.insert(root_path.clone(), record);
        self.walk(root, &root_path, snapshot);
    }

    /// Walk the children of `node`, whose own path is `path`
    pub fn walk(&mut self, node: NodeId, path: &PathKey, snapshot: &mut Snapshot) {
        let doc = self.doc;
        let Some(children) = doc.children(node) else {
            return;
        };

        let mut counter = TagCounter::new();
        for &child in children {
            let Some(tag) = self.qualifying_tag(node, child) else {
                continue;
            };

            let index = counter.increase(&tag);
            let child_path = path.child(&tag, index);
            let synthetic_tag = self.synthetic_tags.get(&child).copied();
            snapshot.insert(child_path.clone(), self.extractor.extract(child, synthetic_tag));

            self.walk(child, &child_path, snapshot);
        }
    }
}

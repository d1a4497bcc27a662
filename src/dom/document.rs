use crate::dom::node::{CapturedNode, CapturedPage, FlatNode, FlatPage, NodeKind, ViewportMetrics};
use crate::error::{BrowserError, Result};
use headless_chrome::Tab;
use std::sync::Arc;

/// Index of a node inside a [`PageDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct NodeEntry {
    node: CapturedNode,
    parent: Option<NodeId>,
    /// Index within the parent's child list
    position: usize,
    children: Option<Vec<NodeId>>,
}

/// A captured page flattened into an arena, in document order
///
/// Node 0 is always the document node. Navigation mirrors the DOM
/// (`parentNode`, `childNodes`, `previousSibling`), and a node that had no
/// child list in the page has none here either.
#[derive(Debug, Clone)]
pub struct PageDocument {
    nodes: Vec<NodeEntry>,
    metrics: ViewportMetrics,
    selected: Option<NodeId>,
}

impl PageDocument {
    /// Build from a document tree
    pub fn new(page: CapturedPage) -> Self {
        Self::assemble(page.into_flat())
    }

    /// Build from the capture script's node list
    ///
    /// The list must be in pre-order: the document first, and every other
    /// node pointing at an earlier node that has a child list.
    pub fn from_flat(page: FlatPage) -> Result<Self> {
        check_pre_order(&page.nodes)?;
        Ok(Self::assemble(page))
    }

    fn assemble(page: FlatPage) -> Self {
        let mut doc = Self {
            nodes: Vec::with_capacity(page.nodes.len()),
            metrics: page.metrics,
            selected: None,
        };
        for entry in page.nodes {
            doc.push(entry);
        }
        doc
    }

    fn push(&mut self, entry: FlatNode) {
        let id = NodeId(self.nodes.len());
        if entry.node.selected && self.selected.is_none() {
            self.selected = Some(id);
        }

        let parent = entry.parent.map(NodeId);
        let mut position = 0;
        if let Some(siblings) = parent
            .and_then(|parent| self.nodes.get_mut(parent.0))
            .and_then(|parent| parent.children.as_mut())
        {
            position = siblings.len();
            siblings.push(id);
        }

        self.nodes.push(NodeEntry {
            node: entry.node,
            parent,
            position,
            children: entry.has_child_list.then(Vec::new),
        });
    }

    /// Parse the JSON produced by the capture script
    pub fn from_json(json: &str) -> Result<Self> {
        let page: FlatPage = serde_json::from_str(json)
            .map_err(|e| BrowserError::DomParseFailed(format!("Failed to parse captured page JSON: {}", e)))?;
        Self::from_flat(page)
    }

    /// Capture the live document of a browser tab
    ///
    /// Only the listed computed style properties are recorded. When
    /// `root_selector` is given, the first matching element is marked as the
    /// extraction root; no match is an error.
    pub fn from_tab(tab: &Arc<Tab>, css_properties: &[String], root_selector: Option<&str>) -> Result<Self> {
        let js_code = Self::capture_script(css_properties, root_selector)?;

        let result = tab
            .evaluate(&js_code, false)
            .map_err(|e| BrowserError::EvaluationFailed(format!("Failed to execute DOM capture script: {}", e)))?;

        let json_value = result
            .value
            .ok_or_else(|| BrowserError::DomParseFailed("No value returned from DOM capture".to_string()))?;

        // The script returns a JSON string rather than an object graph
        let json_str: String = serde_json::from_value(json_value)
            .map_err(|e| BrowserError::DomParseFailed(format!("Failed to get JSON string: {}", e)))?;

        let doc = Self::from_json(&json_str)?;

        if let Some(selector) = root_selector
            && doc.selected().is_none()
        {
            return Err(BrowserError::ElementNotFound(format!(
                "Root element '{}' not found",
                selector
            )));
        }

        log::debug!("Captured {} DOM nodes", doc.len());
        Ok(doc)
    }

    fn capture_script(css_properties: &[String], root_selector: Option<&str>) -> Result<String> {
        let css = serde_json::to_string(css_properties)
            .map_err(|e| BrowserError::InvalidArgument(format!("Invalid CSS property list: {}", e)))?;
        let selector = serde_json::to_string(&root_selector)
            .map_err(|e| BrowserError::InvalidArgument(format!("Invalid root selector: {}", e)))?;
        Ok(format!("{}({}, {})", include_str!("capture_dom.js").trim_end(), css, selector))
    }

    /// The document node
    pub fn document(&self) -> NodeId {
        NodeId(0)
    }

    /// The document's root element (`document.documentElement`)
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.document())?
            .iter()
            .copied()
            .find(|&child| self.kind(child) == NodeKind::Element)
    }

    /// The node marked by the root selector, if any
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn metrics(&self) -> &ViewportMetrics {
        &self.metrics
    }

    pub fn node(&self, id: NodeId) -> &CapturedNode {
        &self.nodes[id.0].node
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Child nodes in document order, or `None` when the node has no child list
    pub fn children(&self, id: NodeId) -> Option<&[NodeId]> {
        self.nodes[id.0].children.as_deref()
    }

    /// The first child node, whatever its kind
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).and_then(|children| children.first().copied())
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let position = self.nodes[id.0].position.checked_sub(1)?;
        self.children(self.parent(id)?)?.get(position).copied()
    }

    /// Whether any child is an element (DOM `children.length > 0`)
    pub fn has_element_children(&self, id: NodeId) -> bool {
        self.children(id)
            .is_some_and(|children| children.iter().any(|&child| self.kind(child) == NodeKind::Element))
    }

    /// Find the first element carrying `name="value"`
    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<NodeId> {
        self.ids().find(|&id| {
            self.kind(id) == NodeKind::Element
                && self.node(id).attributes.get(name).is_some_and(|v| v == value)
        })
    }

    /// All node ids in document order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn check_pre_order(nodes: &[FlatNode]) -> Result<()> {
    let document = nodes
        .first()
        .ok_or_else(|| BrowserError::DomParseFailed("Captured page has no nodes".to_string()))?;
    if document.parent.is_some() || document.node.kind != NodeKind::Document {
        return Err(BrowserError::DomParseFailed(
            "Captured page does not start with the document node".to_string(),
        ));
    }

    for (index, entry) in nodes.iter().enumerate().skip(1) {
        let parent = entry
            .parent
            .filter(|&parent| parent < index)
            .ok_or_else(|| BrowserError::DomParseFailed(format!("Node {} has no preceding parent", index)))?;
        if !nodes[parent].has_child_list {
            return Err(BrowserError::DomParseFailed(format!(
                "Node {} is attached to node {}, which has no child list",
                index, parent
            )));
        }
    }
    Ok(())
}

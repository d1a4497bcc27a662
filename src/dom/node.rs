use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// DOM node types recorded by the capture script
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Document,
    DocumentType,
    Element,
    Text,
    Comment,
    Other,
}

/// Bounding box coordinates for a node, as reported by `getBoundingClientRect()`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Create a new BoundingBox
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }
}

/// Live DOM properties, recorded raw (no coercion happens in the page)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeProperties {
    /// `node.value`; a string for form controls, a number for `<li>`/`<progress>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_index: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,

    /// `node.disabled` exactly as the page exposes it (bool, string or missing)
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub disabled: serde_json::Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
}

/// Document-level width readings and scroll offsets
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewportMetrics {
    pub root_client_width: f64,
    pub root_scroll_width: f64,
    pub root_offset_width: f64,

    /// Missing when the document has no body
    #[serde(default)]
    pub body_scroll_width: Option<f64>,
    #[serde(default)]
    pub body_offset_width: Option<f64>,

    #[serde(default)]
    pub scroll_x: f64,
    #[serde(default)]
    pub scroll_y: f64,
}

impl ViewportMetrics {
    /// Metrics for a page whose root element and body are all `width` wide
    pub fn uniform(width: f64) -> Self {
        Self {
            root_client_width: width,
            root_scroll_width: width,
            root_offset_width: width,
            body_scroll_width: Some(width),
            body_offset_width: Some(width),
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    /// Builder method: set scroll offsets
    pub fn with_scroll(mut self, scroll_x: f64, scroll_y: f64) -> Self {
        self.scroll_x = scroll_x;
        self.scroll_y = scroll_y;
        self
    }
}

/// A single node of the captured page
///
/// Capabilities a DOM node may lack stay optional: text nodes carry no
/// bounding box and no child list, and `style` is `None` whenever
/// `getComputedStyle` threw for the node. `children` only exists for building
/// documents in Rust; on the wire, nodes travel flat (see [`FlatPage`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CapturedNode {
    pub kind: NodeKind,

    /// DOM `nodeName` (e.g. "DIV", "#text", "html")
    pub node_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_value: Option<String>,

    /// Raw HTML attributes in document order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,

    #[serde(default)]
    pub properties: NodeProperties,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,

    #[serde(default)]
    pub offset_width: f64,

    #[serde(default)]
    pub offset_height: f64,

    #[serde(default)]
    pub client_rects: usize,

    /// Requested computed style properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<IndexMap<String, String>>,

    #[serde(skip)]
    pub children: Option<Vec<CapturedNode>>,

    /// Marks the node matched by the caller's root selector
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
}

impl CapturedNode {
    fn bare(kind: NodeKind, node_name: impl Into<String>) -> Self {
        Self {
            kind,
            node_name: node_name.into(),
            tag_name: None,
            node_value: None,
            attributes: IndexMap::new(),
            properties: NodeProperties::default(),
            bounding_box: None,
            offset_width: 0.0,
            offset_height: 0.0,
            client_rects: 0,
            style: None,
            children: None,
            selected: false,
        }
    }

    /// The document node: child list, no geometry, no computed style
    pub fn document() -> Self {
        let mut node = Self::bare(NodeKind::Document, "#document");
        node.children = Some(Vec::new());
        node
    }

    /// `<!DOCTYPE html>`
    pub fn doctype() -> Self {
        Self::bare(NodeKind::DocumentType, "html")
    }

    /// An HTML element; `nodeName` is upper-cased like the DOM reports it
    pub fn element(tag_name: impl Into<String>) -> Self {
        let tag_name = tag_name.into();
        let mut node = Self::bare(NodeKind::Element, tag_name.to_ascii_uppercase());
        node.tag_name = Some(tag_name.to_ascii_uppercase());
        node.properties.tab_index = Some(-1);
        node.bounding_box = Some(BoundingBox::default());
        node.style = Some(IndexMap::new());
        node.children = Some(Vec::new());
        node
    }

    /// A text node
    pub fn text(value: impl Into<String>) -> Self {
        let mut node = Self::bare(NodeKind::Text, "#text");
        node.node_value = Some(value.into());
        node
    }

    /// A comment node
    pub fn comment(value: impl Into<String>) -> Self {
        let mut node = Self::bare(NodeKind::Comment, "#comment");
        node.node_value = Some(value.into());
        node
    }

    /// Builder method: add a raw HTML attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Builder method: set the bounding box, offset size and a single client rect
    pub fn with_layout(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.bounding_box = Some(BoundingBox::new(x, y, width, height));
        self.offset_width = width;
        self.offset_height = height;
        self.client_rects = 1;
        self
    }

    /// Builder method: set the bounding box only
    pub fn with_bounding_box(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.bounding_box = Some(BoundingBox::new(x, y, width, height));
        self
    }

    /// Builder method: set the client rect count
    pub fn with_client_rects(mut self, count: usize) -> Self {
        self.client_rects = count;
        self
    }

    /// Builder method: record a computed style property
    pub fn with_style(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.style
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Builder method: mark computed style as unreadable for this node
    pub fn without_style(mut self) -> Self {
        self.style = None;
        self
    }

    /// Builder method: set the live DOM properties
    pub fn with_properties(mut self, properties: NodeProperties) -> Self {
        self.properties = properties;
        self
    }

    /// Builder method: set the raw `disabled` property
    pub fn with_disabled(mut self, disabled: serde_json::Value) -> Self {
        self.properties.disabled = disabled;
        self
    }

    /// Builder method: append a child
    pub fn with_child(mut self, child: CapturedNode) -> Self {
        self.add_child(child);
        self
    }

    /// Builder method: mark as the caller-selected extraction root
    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    /// Add a child node, creating the child list if the node had none
    pub fn add_child(&mut self, child: CapturedNode) {
        self.children.get_or_insert_with(Vec::new).push(child);
    }

    /// Check if the node is an element with the given tag
    pub fn is_tag(&self, tag: &str) -> bool {
        self.kind == NodeKind::Element
            && self
                .tag_name
                .as_deref()
                .is_some_and(|name| name.eq_ignore_ascii_case(tag))
    }
}

/// A page as a tree of [`CapturedNode`]s, for building documents in Rust
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedPage {
    pub metrics: ViewportMetrics,
    pub document: CapturedNode,
}

impl CapturedPage {
    /// Flatten the tree into pre-order, the layout the capture script produces
    pub fn into_flat(self) -> FlatPage {
        let mut nodes = Vec::new();
        let mut pending = vec![(self.document, None)];

        while let Some((mut node, parent)) = pending.pop() {
            let index = nodes.len();
            let children = node.children.take();
            nodes.push(FlatNode {
                parent,
                has_child_list: children.is_some(),
                node,
            });
            if let Some(children) = children {
                pending.extend(children.into_iter().rev().map(|child| (child, Some(index))));
            }
        }

        FlatPage { metrics: self.metrics, nodes }
    }
}

/// One node of the capture payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlatNode {
    /// Index of the parent in [`FlatPage::nodes`]; `None` for the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,

    /// Whether the DOM node exposes a child list
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_child_list: bool,

    #[serde(flatten)]
    pub node: CapturedNode,
}

/// Everything the capture script returns for one page
///
/// Nodes are listed in pre-order with parent indices rather than nested, so
/// the payload's JSON depth does not grow with the page's DOM depth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlatPage {
    pub metrics: ViewportMetrics,
    pub nodes: Vec<FlatNode>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_element_defaults() {
        let div = CapturedNode::element("div");

        assert_eq!(div.kind, NodeKind::Element);
        assert_eq!(div.node_name, "DIV");
        assert!(div.is_tag("div"));
        assert!(div.children.is_some());
        assert!(div.style.is_some());
        assert_eq!(div.properties.tab_index, Some(-1));
    }

    #[test]
    fn test_text_has_no_capabilities() {
        let text = CapturedNode::text("Hi");

        assert_eq!(text.node_value.as_deref(), Some("Hi"));
        assert!(text.children.is_none());
        assert!(text.bounding_box.is_none());
        assert!(text.style.is_none());
        assert!(!text.is_tag("textnode"));
    }

    #[test]
    fn test_with_layout() {
        let div = CapturedNode::element("div").with_layout(1.0, 2.0, 30.0, 40.0);

        assert_eq!(div.bounding_box, Some(BoundingBox::new(1.0, 2.0, 30.0, 40.0)));
        assert_eq!(div.offset_width, 30.0);
        assert_eq!(div.offset_height, 40.0);
        assert_eq!(div.client_rects, 1);
    }

    #[test]
    fn test_deserialize_capture_payload() {
        let payload = json!({
            "metrics": {
                "rootClientWidth": 1024.0,
                "rootScrollWidth": 1024.0,
                "rootOffsetWidth": 1024.0,
                "bodyScrollWidth": 1000.0,
                "scrollY": 12.0
            },
            "nodes": [
                { "kind": "document", "nodeName": "#document", "hasChildList": true },
                { "parent": 0, "kind": "documentType", "nodeName": "html" },
                {
                    "parent": 0,
                    "hasChildList": true,
                    "kind": "element",
                    "nodeName": "HTML",
                    "tagName": "HTML",
                    "attributes": { "lang": "en" },
                    "properties": { "tabIndex": -1, "disabled": "" },
                    "boundingBox": { "x": 0, "y": 0, "width": 1024, "height": 768.5 },
                    "offsetWidth": 1024,
                    "clientRects": 1,
                    "style": { "color": "rgb(0, 0, 0)" },
                    "selected": true
                }
            ]
        });

        let page: FlatPage = serde_json::from_value(payload).unwrap();
        assert_eq!(page.metrics.body_offset_width, None);
        assert_eq!(page.metrics.scroll_y, 12.0);
        assert_eq!(page.nodes.len(), 3);

        assert!(page.nodes[0].has_child_list);
        assert_eq!(page.nodes[0].parent, None);
        assert_eq!(page.nodes[1].node.kind, NodeKind::DocumentType);
        assert!(!page.nodes[1].has_child_list);

        let html = &page.nodes[2];
        assert_eq!(html.parent, Some(0));
        assert!(html.node.is_tag("html"));
        assert!(html.node.selected);
        assert_eq!(html.node.attributes.get("lang").map(String::as_str), Some("en"));
        assert_eq!(html.node.properties.disabled, json!(""));
        assert_eq!(html.node.bounding_box, Some(BoundingBox::new(0.0, 0.0, 1024.0, 768.5)));
        assert_eq!(html.node.offset_width, 1024.0);
        assert_eq!(html.node.offset_height, 0.0);
    }

    #[test]
    fn test_into_flat_is_pre_order() {
        let page = CapturedPage {
            metrics: ViewportMetrics::uniform(800.0),
            document: CapturedNode::document().with_child(
                CapturedNode::element("html")
                    .with_child(CapturedNode::element("head"))
                    .with_child(CapturedNode::element("body").with_child(CapturedNode::text("x"))),
            ),
        };

        let flat = page.into_flat();
        let names: Vec<&str> = flat.nodes.iter().map(|entry| entry.node.node_name.as_str()).collect();
        assert_eq!(names, vec!["#document", "HTML", "HEAD", "BODY", "#text"]);

        let parents: Vec<Option<usize>> = flat.nodes.iter().map(|entry| entry.parent).collect();
        assert_eq!(parents, vec![None, Some(0), Some(1), Some(1), Some(3)]);

        assert!(flat.nodes[2].has_child_list);
        assert!(!flat.nodes[4].has_child_list);
        assert!(flat.nodes.iter().all(|entry| entry.node.children.is_none()));
    }
}

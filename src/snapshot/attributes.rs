use crate::dom::{NodeId, NodeKind, PageDocument};
use crate::snapshot::config::SnapshotConfig;
use crate::snapshot::geometry::Geometry;
use crate::snapshot::style::changed_properties;
use crate::snapshot::viewport::ViewportScale;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single extracted value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Convert a raw DOM property; `null`, arrays and objects carry no value
    fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(AttributeValue::Bool(*b)),
            serde_json::Value::Number(n) => Some(AttributeValue::Number(n.clone())),
            serde_json::Value::String(s) => Some(AttributeValue::Text(s.clone())),
            _ => None,
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Number(value.into())
    }
}

impl From<f64> for AttributeValue {
    /// Integral values stay integers so `10.0` serializes as `10`
    fn from(value: f64) -> Self {
        if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            return AttributeValue::Number((value as i64).into());
        }
        match serde_json::Number::from_f64(value) {
            Some(n) => AttributeValue::Number(n),
            None => AttributeValue::Text(value.to_string()),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

/// Every extracted fact about one node, keyed by attribute name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeRecord(IndexMap<String, AttributeValue>);

impl AttributeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttributeValue::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(AttributeValue::as_bool)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(AttributeValue::as_f64)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeValue)> {
        self.0.iter()
    }
}

/// The shapes a DOM `disabled` property takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisabledState {
    /// Property missing or `null`
    Absent,
    /// Empty string
    Empty,
    /// The literal string `"disabled"`
    ExplicitlyDisabled,
    /// Anything else, reduced to its truthiness
    Other(bool),
}

impl DisabledState {
    pub fn from_property(raw: &serde_json::Value) -> Self {
        match raw {
            serde_json::Value::Null => DisabledState::Absent,
            serde_json::Value::String(s) if s.is_empty() => DisabledState::Empty,
            serde_json::Value::String(s) if s == "disabled" => DisabledState::ExplicitlyDisabled,
            serde_json::Value::String(_) => DisabledState::Other(true),
            serde_json::Value::Bool(b) => DisabledState::Other(*b),
            serde_json::Value::Number(n) => DisabledState::Other(n.as_f64().is_some_and(|v| v != 0.0)),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => DisabledState::Other(true),
        }
    }

    pub fn is_disabled(self) -> bool {
        match self {
            DisabledState::Absent | DisabledState::Empty => false,
            DisabledState::ExplicitlyDisabled => true,
            DisabledState::Other(truthy) => truthy,
        }
    }
}

/// Text of a node: its first child's value if that child is text, its own
/// value if it is text itself, otherwise empty
pub fn node_text(doc: &PageDocument, node: NodeId) -> String {
    if let Some(first) = doc.first_child(node)
        && doc.kind(first) == NodeKind::Text
    {
        return doc.node(first).node_value.clone().unwrap_or_default();
    }
    if doc.kind(node) == NodeKind::Text {
        return doc.node(node).node_value.clone().unwrap_or_default();
    }
    String::new()
}

/// Visible when the node (for text, its parent) has any offset size or client rect
pub fn is_shown(doc: &PageDocument, node: NodeId) -> bool {
    if doc.kind(node) == NodeKind::Text {
        return doc.parent(node).is_some_and(|parent| is_shown(doc, parent));
    }
    let data = doc.node(node);
    data.offset_width != 0.0 || data.offset_height != 0.0 || data.client_rects > 0
}

/// Builds the [`AttributeRecord`] of a single node
pub struct AttributeExtractor<'a> {
    doc: &'a PageDocument,
    config: &'a SnapshotConfig,
    scale: ViewportScale,
}

impl<'a> AttributeExtractor<'a> {
    pub fn new(doc: &'a PageDocument, config: &'a SnapshotConfig, scale: ViewportScale) -> Self {
        Self { doc, config, scale }
    }

    /// Extract the record of `node`
    ///
    /// `synthetic_tag` replaces the DOM tag name, which text nodes lack.
    pub fn extract(&self, node: NodeId, synthetic_tag: Option<&str>) -> AttributeRecord {
        let doc = self.doc;
        let data = doc.node(node);
        let mut record = AttributeRecord::new();

        let tag_name = match synthetic_tag {
            Some(tag) => tag.to_string(),
            None => data.tag_name.as_deref().unwrap_or(&data.node_name).to_ascii_lowercase(),
        };
        record.insert("tagName", tag_name);
        record.insert("text", node_text(doc, node));
        if let Some(value) = data.properties.value.as_ref().and_then(AttributeValue::from_json) {
            record.insert("value", value);
        }
        if let Some(tab_index) = data.properties.tab_index {
            record.insert("tab-index", tab_index);
        }
        record.insert("shown", is_shown(doc, node));

        if data.kind == NodeKind::Text {
            // Text has no box of its own; report the enclosing element's
            if let Some(parent) = doc.parent(node) {
                Geometry::compute(doc, parent, &self.scale).write_into(&mut record);
            }
            return record;
        }

        for (name, value) in &data.attributes {
            if self.config.html_attributes.includes(name) {
                record.insert(name.as_str(), value.as_str());
            }
        }

        // Raw attribute values are unreliable for these, use live state
        record.insert("checked", data.properties.checked.unwrap_or(false));
        record.insert(
            "disabled",
            DisabledState::from_property(&data.properties.disabled).is_disabled(),
        );
        record.insert("read-only", data.properties.read_only.unwrap_or(false));

        for (name, value) in changed_properties(doc, node, &self.config.css_properties) {
            if !record.contains_key(name) {
                record.insert(name, value);
            }
        }

        Geometry::compute(doc, node, &self.scale).write_into(&mut record);
        record
    }
}

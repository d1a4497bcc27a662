use crate::dom::{NodeId, PageDocument};
use indexmap::IndexMap;

/// Computed style of one node; empty when the page could not provide it
#[derive(Debug, Clone, Copy)]
pub struct ComputedStyle<'a> {
    properties: Option<&'a IndexMap<String, String>>,
}

impl<'a> ComputedStyle<'a> {
    /// Read the style of `node`, substituting an empty style on failure
    pub fn of(doc: &'a PageDocument, node: NodeId) -> Self {
        let properties = doc.node(node).style.as_ref();
        if properties.is_none() {
            log::debug!("No computed style for node {}, using empty style", node.index());
        }
        Self { properties }
    }

    pub fn empty() -> Self {
        Self { properties: None }
    }

    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.properties.and_then(|props| props.get(name)).map(String::as_str)
    }
}

/// Requested properties whose value on `node` differs from its parent's
pub fn changed_properties<'a>(
    doc: &'a PageDocument,
    node: NodeId,
    requested: &'a [String],
) -> Vec<(&'a str, &'a str)> {
    let style = ComputedStyle::of(doc, node);
    let parent_style = doc
        .parent(node)
        .map(|parent| ComputedStyle::of(doc, parent))
        .unwrap_or_else(ComputedStyle::empty);

    requested
        .iter()
        .filter_map(|name| {
            let value = style.get(name)?;
            (parent_style.get(name) != Some(value)).then_some((name.as_str(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{CapturedNode, CapturedPage, ViewportMetrics};

    fn create_test_document() -> PageDocument {
        let span = CapturedNode::element("span")
            .with_attribute("id", "span")
            .with_style("color", "black")
            .with_style("font-size", "12px");
        let broken = CapturedNode::element("i").with_attribute("id", "broken").without_style();
        let div = CapturedNode::element("div")
            .with_attribute("id", "div")
            .with_style("color", "black")
            .with_style("font-size", "16px")
            .with_child(span)
            .with_child(broken);
        let html = CapturedNode::element("html")
            .with_style("color", "black")
            .with_child(div);

        PageDocument::new(CapturedPage {
            metrics: ViewportMetrics::uniform(800.0),
            document: CapturedNode::document().with_child(html),
        })
    }

    fn props(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_only_differing_properties() {
        let doc = create_test_document();
        let span = doc.find_by_attribute("id", "span").unwrap();
        let requested = props(&["color", "font-size", "display"]);

        let changed = changed_properties(&doc, span, &requested);
        assert_eq!(changed, vec![("font-size", "12px")]);
    }

    #[test]
    fn test_property_missing_on_parent() {
        let doc = create_test_document();
        let div = doc.find_by_attribute("id", "div").unwrap();
        let requested = props(&["color", "font-size"]);

        let changed = changed_properties(&doc, div, &requested);
        assert_eq!(changed, vec![("font-size", "16px")]);
    }

    #[test]
    fn test_document_parent_has_empty_style() {
        let doc = create_test_document();
        let html = doc.document_element().unwrap();
        let requested = props(&["color"]);

        assert_eq!(changed_properties(&doc, html, &requested), vec![("color", "black")]);
    }

    #[test]
    fn test_unreadable_style_is_empty() {
        let doc = create_test_document();
        let broken = doc.find_by_attribute("id", "broken").unwrap();
        let requested = props(&["color", "font-size"]);

        assert!(ComputedStyle::of(&doc, broken).get("color").is_none());
        assert!(changed_properties(&doc, broken, &requested).is_empty());
    }
}

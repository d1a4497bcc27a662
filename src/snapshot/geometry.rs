use crate::dom::{BoundingBox, NodeId, PageDocument};
use crate::snapshot::attributes::AttributeRecord;
use crate::snapshot::viewport::ViewportScale;

/// Absolute (scaled) and parent-relative (unscaled) geometry of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub absolute_x: f64,
    pub absolute_y: f64,
    pub absolute_width: f64,
    pub absolute_height: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

fn page_x(doc: &PageDocument, rect: &BoundingBox) -> f64 {
    rect.x + doc.metrics().scroll_x
}

fn page_y(doc: &PageDocument, rect: &BoundingBox) -> f64 {
    rect.y + doc.metrics().scroll_y
}

impl Geometry {
    /// Compute the geometry of `node`
    ///
    /// Relative values are deltas against the parent's box, or the node's own
    /// page coordinates and size when the parent has no box (the document).
    /// Only the absolute values are multiplied by the viewport scale.
    pub fn compute(doc: &PageDocument, node: NodeId, scale: &ViewportScale) -> Self {
        let rect = doc.node(node).bounding_box.unwrap_or_default();
        let (abs_x, abs_y) = (page_x(doc, &rect), page_y(doc, &rect));

        let parent_rect = doc.parent(node).and_then(|parent| doc.node(parent).bounding_box);
        let (x, y, width, height) = match parent_rect {
            Some(parent) => (
                abs_x - page_x(doc, &parent),
                abs_y - page_y(doc, &parent),
                rect.width - parent.width,
                rect.height - parent.height,
            ),
            None => (abs_x, abs_y, rect.width, rect.height),
        };

        Self {
            absolute_x: scale.apply(abs_x),
            absolute_y: scale.apply(abs_y),
            absolute_width: scale.apply(rect.width),
            absolute_height: scale.apply(rect.height),
            x,
            y,
            width,
            height,
        }
    }

    pub fn write_into(&self, record: &mut AttributeRecord) {
        record.insert("absolute-x", self.absolute_x);
        record.insert("absolute-y", self.absolute_y);
        record.insert("absolute-width", self.absolute_width);
        record.insert("absolute-height", self.absolute_height);
        record.insert("x", self.x);
        record.insert("y", self.y);
        record.insert("width", self.width);
        record.insert("height", self.height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{CapturedNode, CapturedPage, ViewportMetrics};

    fn create_test_document(width: f64) -> PageDocument {
        let div = CapturedNode::element("div")
            .with_attribute("id", "box")
            .with_layout(30.0, 40.0, 200.0, 50.0);
        let body = CapturedNode::element("body")
            .with_layout(10.0, 10.0, 780.0, 500.0)
            .with_child(div);
        let html = CapturedNode::element("html")
            .with_layout(0.0, 0.0, 800.0, 600.0)
            .with_child(body);

        PageDocument::new(CapturedPage {
            metrics: ViewportMetrics::uniform(width).with_scroll(0.0, 100.0),
            document: CapturedNode::document().with_child(html),
        })
    }

    #[test]
    fn test_relative_to_parent() {
        let doc = create_test_document(800.0);
        let scale = ViewportScale::measure(doc.metrics(), 800.0).unwrap();
        let div = doc.find_by_attribute("id", "box").unwrap();

        let geometry = Geometry::compute(&doc, div, &scale);
        assert_eq!(geometry.absolute_x, 30.0);
        assert_eq!(geometry.absolute_y, 140.0);
        assert_eq!(geometry.absolute_width, 200.0);
        assert_eq!(geometry.x, 20.0);
        assert_eq!(geometry.y, 30.0);
        assert_eq!(geometry.width, -580.0);
        assert_eq!(geometry.height, -450.0);
    }

    #[test]
    fn test_document_parent_falls_back_to_own_box() {
        let doc = create_test_document(1600.0);
        let scale = ViewportScale::measure(doc.metrics(), 800.0).unwrap();
        let html = doc.document_element().unwrap();

        let geometry = Geometry::compute(&doc, html, &scale);
        assert_eq!(geometry.x, 0.0);
        assert_eq!(geometry.y, 100.0);
        assert_eq!(geometry.width, 800.0);
        assert_eq!(geometry.height, 600.0);
        assert_eq!(geometry.absolute_y, 50.0);
        assert_eq!(geometry.absolute_width, 400.0);
    }

    #[test]
    fn test_relative_values_ignore_scale() {
        let narrow = create_test_document(800.0);
        let wide = create_test_document(1600.0);
        let div = narrow.find_by_attribute("id", "box").unwrap();

        let a = Geometry::compute(&narrow, div, &ViewportScale::measure(narrow.metrics(), 800.0).unwrap());
        let b = Geometry::compute(&wide, div, &ViewportScale::measure(wide.metrics(), 800.0).unwrap());

        assert_eq!((a.x, a.y, a.width, a.height), (b.x, b.y, b.width, b.height));
        assert_eq!(a.absolute_x / 2.0, b.absolute_x);
        assert_eq!(a.absolute_height / 2.0, b.absolute_height);
    }
}

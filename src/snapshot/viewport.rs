use crate::dom::ViewportMetrics;
use crate::error::{BrowserError, Result};

/// Widest of the document width readings; a missing body counts as 0
pub fn full_width(metrics: &ViewportMetrics) -> f64 {
    [
        metrics.root_client_width,
        metrics.body_scroll_width.unwrap_or(0.0),
        metrics.root_scroll_width,
        metrics.body_offset_width.unwrap_or(0.0),
        metrics.root_offset_width,
    ]
    .into_iter()
    .fold(0.0, f64::max)
}

/// Ratio between the reference width and the measured document width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportScale {
    full_width: f64,
    factor: f64,
}

impl ViewportScale {
    /// Measure the document and derive the scale factor
    ///
    /// A document reporting no width yields `UnmeasurableDocument`
    /// instead of an infinite factor.
    pub fn measure(metrics: &ViewportMetrics, reference_width: f64) -> Result<Self> {
        let full_width = full_width(metrics);
        if !full_width.is_finite() || full_width <= 0.0 {
            return Err(BrowserError::UnmeasurableDocument { full_width });
        }

        let factor = reference_width / full_width;
        log::debug!("Document width {} scaled by {}", full_width, factor);
        Ok(Self { full_width, factor })
    }

    pub fn full_width(&self) -> f64 {
        self.full_width
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn apply(&self, value: f64) -> f64 {
        value * self.factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_width_takes_maximum() {
        let metrics = ViewportMetrics {
            root_client_width: 1000.0,
            root_scroll_width: 1200.0,
            root_offset_width: 1000.0,
            body_scroll_width: Some(1600.0),
            body_offset_width: Some(984.0),
            ..Default::default()
        };
        assert_eq!(full_width(&metrics), 1600.0);
    }

    #[test]
    fn test_full_width_without_body() {
        let metrics = ViewportMetrics {
            root_client_width: 640.0,
            root_scroll_width: 600.0,
            root_offset_width: 0.0,
            body_scroll_width: None,
            body_offset_width: None,
            ..Default::default()
        };
        assert_eq!(full_width(&metrics), 640.0);
    }

    #[test]
    fn test_scale_factor() {
        let scale = ViewportScale::measure(&ViewportMetrics::uniform(1600.0), 800.0).unwrap();
        assert_eq!(scale.full_width(), 1600.0);
        assert_eq!(scale.factor(), 0.5);
        assert_eq!(scale.apply(100.0), 50.0);
    }

    #[test]
    fn test_zero_width_is_unmeasurable() {
        let err = ViewportScale::measure(&ViewportMetrics::default(), 800.0).unwrap_err();
        assert!(matches!(err, BrowserError::UnmeasurableDocument { full_width } if full_width == 0.0));
    }
}

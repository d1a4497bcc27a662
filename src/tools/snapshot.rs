use crate::browser::{Screenshot, ScreenshotMode};
use crate::error::{BrowserError, Result};
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the snapshot tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SnapshotParams {
    /// Computed style properties to sample (default: the context's configured list)
    #[serde(default)]
    pub css_properties: Vec<String>,

    /// CSS selector of the element to root the snapshot at (default: `<html>`)
    #[serde(default)]
    pub root_selector: Option<String>,

    /// Width absolute geometry is normalized to (default: the context's configured width)
    #[serde(default)]
    pub reference_width: Option<f64>,

    /// Also capture a screenshot at the reference width (the root element only when a root is given)
    #[serde(default)]
    pub screenshot: Option<ScreenshotMode>,
}

/// Screenshot as it appears in tool output
pub fn screenshot_json(screenshot: &Screenshot) -> serde_json::Value {
    serde_json::json!({
        "width": screenshot.width(),
        "height": screenshot.height(),
        "mimeType": "image/png",
        "data": screenshot.to_base64()
    })
}

/// Tool producing the path-keyed snapshot of the current page
#[derive(Default)]
pub struct SnapshotTool;

impl Tool for SnapshotTool {
    type Params = SnapshotParams;

    fn name(&self) -> &str {
        "snapshot"
    }

    fn execute_typed(&self, params: SnapshotParams, context: &mut ToolContext) -> Result<ToolResult> {
        let mut config = context.config.clone();
        if !params.css_properties.is_empty() {
            config.css_properties = params.css_properties;
        }
        if let Some(width) = params.reference_width {
            config.reference_width = width;
        }

        let root_selector = params.root_selector.as_deref();
        let (snapshot, screenshot) = match params.screenshot {
            Some(mode) => context.session.snapshot_with_screenshot(&config, root_selector, mode),
            None => context.session.snapshot(&config, root_selector).map(|snapshot| (snapshot, None)),
        }
        .map_err(|e| match e {
            BrowserError::ElementNotFound(_) | BrowserError::Config(_) => e,
            other => BrowserError::ToolExecutionFailed {
                tool: "snapshot".to_string(),
                reason: other.to_string(),
            },
        })?;

        let root = snapshot.paths().next().map(|path| path.to_string());
        let mut data = serde_json::json!({
            "root": root,
            "count": snapshot.len(),
            "snapshot": snapshot
        });
        if let Some(screenshot) = screenshot {
            data["screenshot"] = screenshot_json(&screenshot);
        }
        Ok(ToolResult::success_with(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_params_defaults() {
        let params: SnapshotParams = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(params.css_properties.is_empty());
        assert!(params.root_selector.is_none());
        assert!(params.reference_width.is_none());
        assert!(params.screenshot.is_none());
    }

    #[test]
    fn test_snapshot_params_full() {
        let params: SnapshotParams = serde_json::from_value(serde_json::json!({
            "css_properties": ["color", "display"],
            "root_selector": "#main",
            "reference_width": 1024.0,
            "screenshot": "viewport"
        }))
        .unwrap();

        assert_eq!(params.css_properties, vec!["color", "display"]);
        assert_eq!(params.root_selector.as_deref(), Some("#main"));
        assert_eq!(params.reference_width, Some(1024.0));
        assert_eq!(params.screenshot, Some(ScreenshotMode::Viewport));
    }

    #[test]
    fn test_screenshot_json() {
        let mut png = Vec::new();
        image::DynamicImage::new_rgb8(40, 20)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageOutputFormat::Png)
            .unwrap();
        let screenshot = Screenshot::from_png(&png, 80.0).unwrap();

        let json = screenshot_json(&screenshot);
        assert_eq!(json["width"], 80);
        assert_eq!(json["height"], 40);
        assert_eq!(json["mimeType"], "image/png");
        assert_eq!(json["data"], screenshot.to_base64());
    }

    #[test]
    fn test_snapshot_tool_metadata() {
        let tool = SnapshotTool;
        assert_eq!(tool.name(), "snapshot");
        assert!(tool.parameters_schema().is_object());
    }
}

//! MCP (Model Context Protocol) server implementation
//!
//! This module provides rmcp-compatible tools by wrapping the tool registry.

pub mod handler;
pub use handler::BrowserServer;

use crate::browser::ScreenshotMode;
use crate::tools::{ToolContext, ToolResult as InternalToolResult};
use rmcp::{
    tool_router, tool,
    ErrorData as McpError,
    model::{CallToolResult, Content},
    handler::server::wrapper::Parameters,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Navigate tool parameters
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NavigateParams {
    /// URL, host or local file path to open
    pub url: String,
    /// Wait for navigation to complete (default: true)
    #[serde(default = "default_true")]
    pub wait_for_load: bool,
    /// Extra milliseconds to let the page settle
    #[serde(default)]
    pub settle_ms: u64,
}

/// Snapshot tool parameters
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageSnapshotParams {
    /// Computed style properties to sample, e.g. ["color", "font-size", "display"]
    #[serde(default)]
    pub css_properties: Vec<String>,
    /// CSS selector of the snapshot root (default: the <html> element)
    #[serde(default)]
    pub root_selector: Option<String>,
    /// Width absolute geometry is normalized to (default: 800)
    #[serde(default)]
    pub reference_width: Option<f64>,
    /// Attach a PNG resized to the reference width: "full-page" or "viewport" (the root element when a root is given)
    #[serde(default)]
    pub screenshot: Option<ScreenshotMode>,
}

fn default_true() -> bool {
    true
}

/// Convert internal ToolResult to MCP CallToolResult
///
/// A `screenshot` in the tool data becomes image content next to the JSON text.
fn convert_result(result: InternalToolResult) -> Result<CallToolResult, McpError> {
    if result.success {
        let mut contents = Vec::new();
        let text = if let Some(mut data) = result.data {
            let screenshot = data.as_object_mut().and_then(|fields| fields.remove("screenshot"));
            if let Some(screenshot) = screenshot {
                let image = screenshot["data"].as_str().unwrap_or_default().to_string();
                let mime_type = screenshot["mimeType"].as_str().unwrap_or("image/png").to_string();
                contents.push(Content::image(image, mime_type));
            }
            serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string())
        } else {
            "Success".to_string()
        };
        contents.insert(0, Content::text(text));
        Ok(CallToolResult::success(contents))
    } else {
        let error_msg = result.error.unwrap_or_else(|| "Unknown error".to_string());
        Err(McpError::internal_error(error_msg, None))
    }
}

impl BrowserServer {
    fn run_tool(&self, name: &str, params: serde_json::Value) -> Result<CallToolResult, McpError> {
        let session = self.session();
        let mut context = ToolContext::with_config(&session, self.config().clone());

        let result = session
            .tool_registry()
            .execute(name, params, &mut context)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        convert_result(result)
    }
}

#[tool_router]
impl BrowserServer {
    /// Navigate to a URL
    #[tool(description = "Open a URL, host or local HTML file in the browser")]
    fn browser_navigate(
        &self,
        params: Parameters<NavigateParams>,
    ) -> Result<CallToolResult, McpError> {
        let tool_params = serde_json::to_value(&params.0)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
        self.run_tool("navigate", tool_params)
    }

    /// Snapshot the current page
    #[tool(description = "Extract a structural snapshot of the current page: element paths mapped to tag, text, form state, HTML attributes, CSS properties differing from the parent, and viewport-normalized geometry")]
    fn page_snapshot(
        &self,
        params: Parameters<PageSnapshotParams>,
    ) -> Result<CallToolResult, McpError> {
        if params.0.reference_width.is_some_and(|width| width <= 0.0) {
            return Err(McpError::invalid_params("reference_width must be positive", None));
        }
        let tool_params = serde_json::to_value(&params.0)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
        self.run_tool("snapshot", tool_params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_success() {
        let result = convert_result(InternalToolResult::success_with(serde_json::json!({ "count": 2 })));
        assert!(result.is_ok());
    }

    #[test]
    fn test_convert_failure() {
        let result = convert_result(InternalToolResult::failure("no page"));
        assert!(result.is_err());
    }

    #[test]
    fn test_snapshot_params_match_tool_params() {
        let params = PageSnapshotParams {
            css_properties: vec!["color".to_string()],
            root_selector: Some("#main".to_string()),
            reference_width: None,
            screenshot: Some(ScreenshotMode::FullPage),
        };
        let value = serde_json::to_value(&params).unwrap();
        let tool_params: crate::tools::SnapshotParams = serde_json::from_value(value).unwrap();

        assert_eq!(tool_params.css_properties, vec!["color"]);
        assert_eq!(tool_params.root_selector.as_deref(), Some("#main"));
        assert_eq!(tool_params.screenshot, Some(ScreenshotMode::FullPage));
    }

    #[test]
    fn test_convert_moves_screenshot_to_image_content() {
        let result = convert_result(InternalToolResult::success_with(serde_json::json!({
            "count": 1,
            "screenshot": { "width": 800, "height": 600, "mimeType": "image/png", "data": "iVBORw0KGgo=" }
        })))
        .unwrap();

        let value = serde_json::to_value(&result).unwrap();
        let content = value["content"].as_array().unwrap();
        assert_eq!(content.len(), 2);

        let text = content[0]["text"].as_str().unwrap();
        assert!(text.contains("\"count\": 1"));
        assert!(!text.contains("iVBORw0KGgo"));

        assert_eq!(content[1]["type"], "image");
        assert_eq!(content[1]["data"], "iVBORw0KGgo=");
        assert_eq!(content[1]["mimeType"], "image/png");
    }
}

use crate::error::Result;
use crate::tools::utils::normalize_url;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters for the navigate tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NavigateParams {
    /// URL, host or local file path to open
    pub url: String,

    /// Wait for navigation to complete (default: true)
    #[serde(default = "default_wait")]
    pub wait_for_load: bool,

    /// Extra time in milliseconds for the page to settle before snapshotting
    #[serde(default)]
    pub settle_ms: u64,
}

fn default_wait() -> bool {
    true
}

/// Tool for opening the page to snapshot
#[derive(Default)]
pub struct NavigateTool;

impl Tool for NavigateTool {
    type Params = NavigateParams;

    fn name(&self) -> &str {
        "navigate"
    }

    fn execute_typed(&self, params: NavigateParams, context: &mut ToolContext) -> Result<ToolResult> {
        let target = normalize_url(&params.url);
        context.session.navigate(&target)?;

        if params.wait_for_load {
            context.session.wait_for_navigation()?;
        }

        if params.settle_ms > 0 {
            std::thread::sleep(Duration::from_millis(params.settle_ms));
        }

        // Redirects change what is actually captured
        let loaded = context.session.tab()?.get_url();
        log::debug!("Opened {} (requested {})", loaded, params.url);

        Ok(ToolResult::success_with(serde_json::json!({
            "requested_url": params.url,
            "target_url": target,
            "url": loaded,
            "settle_ms": params.settle_ms
        })))
    }
}

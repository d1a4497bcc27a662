//! Browser tools
//!
//! Each tool takes typed, JSON-schema-described parameters and runs against
//! a [`ToolContext`]. Tools are looked up by name in a [`ToolRegistry`], which
//! is how the CLI and the MCP server drive a session.

pub mod navigate;
pub mod snapshot;
pub mod utils;

pub use navigate::{NavigateParams, NavigateTool};
pub use snapshot::{SnapshotParams, SnapshotTool};

use crate::browser::BrowserSession;
use crate::error::{BrowserError, Result};
use crate::snapshot::SnapshotConfig;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of a tool execution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success() -> Self {
        Self { success: true, data: None, error: None }
    }

    pub fn success_with(data: serde_json::Value) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(error.into()) }
    }
}

/// Session and defaults a tool runs with
pub struct ToolContext<'a> {
    pub session: &'a BrowserSession,

    /// Base snapshot config; tool parameters override parts of it
    pub config: SnapshotConfig,
}

impl<'a> ToolContext<'a> {
    pub fn new(session: &'a BrowserSession) -> Self {
        Self::with_config(session, SnapshotConfig::default())
    }

    pub fn with_config(session: &'a BrowserSession, config: SnapshotConfig) -> Self {
        Self { session, config }
    }
}

/// A browser tool with typed parameters
pub trait Tool: Send + Sync {
    type Params: DeserializeOwned + JsonSchema;

    fn name(&self) -> &str;

    fn execute_typed(&self, params: Self::Params, context: &mut ToolContext) -> Result<ToolResult>;

    /// JSON schema of the parameters
    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(Self::Params)).unwrap_or_default()
    }

    /// Deserialize raw parameters and execute
    fn execute(&self, params: serde_json::Value, context: &mut ToolContext) -> Result<ToolResult> {
        let params: Self::Params = serde_json::from_value(params).map_err(|e| BrowserError::InvalidArgument(
            format!("Invalid parameters for tool '{}': {}", self.name(), e),
        ))?;
        self.execute_typed(params, context)
    }
}

/// Object-safe view of [`Tool`] used by the registry
pub trait DynTool: Send + Sync {
    fn name(&self) -> &str;
    fn parameters_schema(&self) -> serde_json::Value;
    fn execute(&self, params: serde_json::Value, context: &mut ToolContext) -> Result<ToolResult>;
}

impl<T: Tool> DynTool for T {
    fn name(&self) -> &str {
        Tool::name(self)
    }

    fn parameters_schema(&self) -> serde_json::Value {
        Tool::parameters_schema(self)
    }

    fn execute(&self, params: serde_json::Value, context: &mut ToolContext) -> Result<ToolResult> {
        Tool::execute(self, params, context)
    }
}

/// Tools addressable by name
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn DynTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in tool
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(NavigateTool);
        registry.register(SnapshotTool);
        registry
    }

    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(Tool::name(&tool).to_string(), Box::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&dyn DynTool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered tool names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn execute(&self, name: &str, params: serde_json::Value, context: &mut ToolContext) -> Result<ToolResult> {
        let tool = self.get(name).ok_or_else(|| BrowserError::ToolExecutionFailed {
            tool: name.to_string(),
            reason: "Unknown tool".to_string(),
        })?;
        log::debug!("Executing tool '{}'", name);
        tool.execute(params, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_defaults() {
        let registry = ToolRegistry::with_defaults();
        assert_eq!(registry.names(), vec!["navigate", "snapshot"]);
        assert!(registry.contains("snapshot"));
        assert!(registry.get("click").is_none());
    }

    #[test]
    fn test_registry_schemas() {
        let registry = ToolRegistry::with_defaults();
        for name in registry.names() {
            assert!(registry.get(name).unwrap().parameters_schema().is_object());
        }
    }

    #[test]
    fn test_tool_result() {
        let ok = ToolResult::success_with(serde_json::json!({ "count": 3 }));
        assert!(ok.success);
        assert_eq!(ok.data.unwrap()["count"], 3);

        let failed = ToolResult::failure("boom");
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("boom"));

        let json = serde_json::to_string(&ToolResult::success()).unwrap();
        assert_eq!(json, r#"{"success":true}"#);
    }
}

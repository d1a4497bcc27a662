use thiserror::Error;

/// Errors raised while driving the browser or extracting a page snapshot
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("JavaScript evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Failed to parse captured DOM: {0}")]
    DomParseFailed(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Tool '{tool}' failed: {reason}")]
    ToolExecutionFailed { tool: String, reason: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Screenshot failed: {0}")]
    ScreenshotFailed(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The document reported no usable width, so no viewport scale exists
    #[error("Document width {full_width} cannot be used to compute a viewport scale")]
    UnmeasurableDocument { full_width: f64 },

    /// The explicit extraction root has no element ancestry to build an XPath from
    #[error("Extraction root has no resolvable XPath")]
    UnresolvableRoot,
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, BrowserError>;

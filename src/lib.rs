//! # page-snapshot
//!
//! A Rust library for extracting structural snapshots of rendered web pages via Chrome DevTools
//! Protocol (CDP), designed for visual-regression and UI-state comparison.
//!
//! A snapshot maps a path for every element (and every meaningful text node) to a record of its
//! tag, text, form state, raw HTML attributes, the requested CSS properties that differ from its
//! parent, and its geometry. Absolute geometry is rescaled to a fixed reference width so that
//! pages captured at different window sizes stay comparable.
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use page_snapshot::{BrowserSession, LaunchOptions, SnapshotConfig};
//!
//! # fn main() -> page_snapshot::Result<()> {
//! let session = BrowserSession::launch(LaunchOptions::default())?;
//! session.navigate("https://example.com")?;
//! session.wait_for_navigation()?;
//!
//! let config = SnapshotConfig::new(["color", "font-size", "display"]);
//! let snapshot = session.snapshot(&config, None)?;
//!
//! let body = snapshot.get("//html[1]/body[1]").expect("body is always captured");
//! println!("body is {:?} wide at the reference width", body.get_f64("absolute-width"));
//! # Ok(())
//! # }
//! ```
//!
//! ### Snapshotting a subtree
//!
//! ```rust,no_run
//! # use page_snapshot::{BrowserSession, LaunchOptions, SnapshotConfig};
//! # fn main() -> page_snapshot::Result<()> {
//! # let session = BrowserSession::launch(LaunchOptions::default())?;
//! // Keys start at the root's XPath, e.g. "/html[1]/body[1]/main[1]"
//! let snapshot = session.snapshot(&SnapshotConfig::default(), Some("main"))?;
//! # Ok(())
//! # }
//! ```
//!
//! ### With a screenshot
//!
//! ```rust,no_run
//! # use page_snapshot::{BrowserSession, LaunchOptions, ScreenshotMode, SnapshotConfig};
//! # fn main() -> page_snapshot::Result<()> {
//! # let session = BrowserSession::launch(LaunchOptions::default())?;
//! // The image is resized to the reference width, matching the `absolute-*` geometry
//! let (snapshot, screenshot) = session.snapshot_with_screenshot(&SnapshotConfig::default(), None, ScreenshotMode::FullPage)?;
//! println!("{} records", snapshot.len());
//! if let Some(screenshot) = screenshot {
//!     screenshot.save("page.png")?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Without a browser
//!
//! Captured pages are plain serde data, so a [`PageDocument`] can be built from stored JSON or
//! with the [`CapturedNode`] builders and passed to [`extract_snapshot`].
//!
//! ## Module Overview
//!
//! - [`browser`]: Browser session management, configuration and screenshots
//! - [`dom`]: Page capture and the captured document model
//! - [`snapshot`]: Path indexing, attribute extraction and viewport normalization
//! - [`tools`]: Named tools (navigate, snapshot) used by the CLI and MCP server
//! - [`error`]: Error types and result aliases
//! - [`mcp`]: Model Context Protocol server (requires `mcp-handler` feature)

pub mod browser;
pub mod dom;
pub mod error;
pub mod snapshot;
pub mod tools;

#[cfg(feature = "mcp-handler")]
pub mod mcp;

pub use browser::{BrowserSession, ConnectionOptions, LaunchOptions, Screenshot, ScreenshotMode};
pub use dom::{BoundingBox, CapturedNode, CapturedPage, NodeId, PageDocument};
pub use error::{BrowserError, Result};
pub use snapshot::{AttributeRecord, AttributeValue, PathKey, Snapshot, SnapshotConfig, extract_snapshot, extract_snapshot_from};
pub use tools::{Tool, ToolContext, ToolRegistry, ToolResult};

#[cfg(feature = "mcp-handler")]
pub use mcp::BrowserServer;
#[cfg(feature = "mcp-handler")]
pub use rmcp::ServiceExt;

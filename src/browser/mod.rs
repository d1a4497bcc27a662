//! Browser session management
//!
//! Launching or connecting to Chrome via headless_chrome, and capturing
//! snapshots and matching screenshots from the active tab.

pub mod config;
pub mod screenshot;
pub mod session;

pub use config::{ConnectionOptions, LaunchOptions};
pub use screenshot::{Screenshot, ScreenshotMode, ScreenshotTarget};
pub use session::BrowserSession;

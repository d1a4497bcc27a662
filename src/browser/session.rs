use crate::{browser::config::{ConnectionOptions, LaunchOptions},
            browser::screenshot::{Screenshot, ScreenshotMode, ScreenshotTarget},
            dom::PageDocument,
            error::{BrowserError, Result},
            snapshot::{Snapshot, SnapshotConfig, extract_snapshot},
            tools::{ToolContext, ToolRegistry, ToolResult}};
use headless_chrome::{Browser, Tab};
use std::{ffi::OsStr, sync::Arc, time::Duration};

/// Snapshots are usually taken in batches from one long-lived browser
const IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

const VISIBLE_TAB_CHECK: &str = "document.visibilityState === 'visible'";

/// A Chrome instance plus the tools that drive it
pub struct BrowserSession {
    browser: Browser,
    tool_registry: ToolRegistry,
}

fn chrome_options(options: &LaunchOptions) -> headless_chrome::LaunchOptions<'static> {
    let mut chrome = headless_chrome::LaunchOptions::default();
    chrome.headless = options.headless;
    chrome.sandbox = options.sandbox;
    chrome.window_size = Some((options.window_width, options.window_height));
    chrome.path = options.chrome_path.clone();
    chrome.user_data_dir = options.user_data_dir.clone();
    chrome.idle_browser_timeout = IDLE_TIMEOUT;

    chrome.ignore_default_args.push(OsStr::new("--enable-automation"));
    chrome.args.extend([
        OsStr::new("--disable-blink-features=AutomationControlled"),
        // Scrollbars would eat into the measured document width
        OsStr::new("--hide-scrollbars"),
    ]);
    chrome
}

impl BrowserSession {
    /// Start Chrome with one blank tab
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let browser = Browser::new(chrome_options(&options)).map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;
        browser
            .new_tab()
            .map_err(|e| BrowserError::LaunchFailed(format!("Could not open initial tab: {}", e)))?;

        log::debug!(
            "Launched browser ({}x{}, headless: {})",
            options.window_width,
            options.window_height,
            options.headless
        );
        Ok(Self::from_browser(browser))
    }

    /// Attach to a running Chrome through its DevTools WebSocket
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser = Browser::connect_with_timeout(options.ws_url.clone(), Duration::from_millis(options.timeout))
            .map_err(|e| BrowserError::ConnectionFailed(format!("{}: {}", options.ws_url, e)))?;

        log::debug!("Connected to {}", options.ws_url);
        Ok(Self::from_browser(browser))
    }

    /// Headless Chrome with [`LaunchOptions::default`]
    pub fn new() -> Result<Self> {
        Self::launch(LaunchOptions::default())
    }

    fn from_browser(browser: Browser) -> Self {
        Self { browser, tool_registry: ToolRegistry::with_defaults() }
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    pub fn get_tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| BrowserError::TabOperationFailed(format!("Tab list unavailable: {}", e)))?;
        Ok(tabs.clone())
    }

    /// The tab snapshots are taken from
    ///
    /// Prefers a tab whose document reports itself visible. Headless tabs may
    /// all report hidden, in which case the most recently opened tab wins.
    pub fn tab(&self) -> Result<Arc<Tab>> {
        let tabs = self.get_tabs()?;

        let visible = tabs.iter().find(|tab| match tab.evaluate(VISIBLE_TAB_CHECK, false) {
            Ok(result) => result.value.and_then(|v| v.as_bool()).unwrap_or(false),
            Err(e) => {
                log::debug!("Skipping tab {}: {}", tab.get_target_id(), e);
                false
            }
        });

        visible
            .or_else(|| tabs.last())
            .cloned()
            .ok_or_else(|| BrowserError::TabOperationFailed("Browser has no open tabs".to_string()))
    }

    pub fn navigate(&self, url: &str) -> Result<()> {
        self.tab()?
            .navigate_to(url)
            .map_err(|e| BrowserError::NavigationFailed(format!("{}: {}", url, e)))?;
        Ok(())
    }

    /// Block until the current navigation has finished loading
    pub fn wait_for_navigation(&self) -> Result<()> {
        self.tab()?
            .wait_until_navigated()
            .map_err(|e| BrowserError::NavigationFailed(format!("Page did not finish loading: {}", e)))?;
        Ok(())
    }

    /// Capture the current page, optionally marking a root element
    pub fn capture_document(&self, css_properties: &[String], root_selector: Option<&str>) -> Result<PageDocument> {
        PageDocument::from_tab(&self.tab()?, css_properties, root_selector)
    }

    /// Snapshot the current page
    ///
    /// The page must already be stable; nothing here waits for rendering.
    pub fn snapshot(&self, config: &SnapshotConfig, root_selector: Option<&str>) -> Result<Snapshot> {
        let doc = self.capture_document(&config.css_properties, root_selector)?;
        extract_snapshot(&doc, config)
    }

    /// Screenshot of the current page, resized to `reference_width`
    ///
    /// With a root selector only that element is captured; otherwise `mode`
    /// picks the whole page or the visible viewport.
    pub fn screenshot(&self, mode: ScreenshotMode, root_selector: Option<&str>, reference_width: f64) -> Result<Screenshot> {
        Screenshot::capture(&self.tab()?, ScreenshotTarget::resolve(mode, root_selector), reference_width)
    }

    /// Snapshot the current page and take a matching screenshot
    ///
    /// The DOM is captured first. A failed screenshot is logged and leaves
    /// the snapshot intact.
    pub fn snapshot_with_screenshot(
        &self,
        config: &SnapshotConfig,
        root_selector: Option<&str>,
        mode: ScreenshotMode,
    ) -> Result<(Snapshot, Option<Screenshot>)> {
        let snapshot = self.snapshot(config, root_selector)?;
        let screenshot = match self.screenshot(mode, root_selector, config.reference_width) {
            Ok(screenshot) => Some(screenshot),
            Err(e) => {
                log::warn!("Snapshot taken without screenshot: {}", e);
                None
            }
        };
        Ok((snapshot, screenshot))
    }

    pub fn tool_registry(&self) -> &ToolRegistry {
        &self.tool_registry
    }

    pub fn tool_registry_mut(&mut self) -> &mut ToolRegistry {
        &mut self.tool_registry
    }

    /// Run a registered tool against this session with the default snapshot config
    pub fn execute_tool(&self, name: &str, params: serde_json::Value) -> Result<ToolResult> {
        let mut context = ToolContext::new(self);
        self.tool_registry.execute(name, params, &mut context)
    }

    /// Close all tabs; the browser process exits when the session is dropped
    pub fn close(&self) -> Result<()> {
        for tab in self.get_tabs()? {
            if let Err(e) = tab.close(false) {
                log::debug!("Failed to close tab {}: {}", tab.get_target_id(), e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrome_options_follow_launch_options() {
        let chrome = chrome_options(&LaunchOptions::new().headless(false).window_size(1600, 900).sandbox(false));

        assert!(!chrome.headless);
        assert!(!chrome.sandbox);
        assert_eq!(chrome.window_size, Some((1600, 900)));
        assert_eq!(chrome.idle_browser_timeout, IDLE_TIMEOUT);
        assert!(chrome.args.contains(&OsStr::new("--hide-scrollbars")));
    }

    #[test]
    fn test_chrome_options_pass_paths_through() {
        let chrome = chrome_options(&LaunchOptions::new().chrome_path("/opt/chrome").user_data_dir("/tmp/profile"));

        assert_eq!(chrome.path.as_deref(), Some(std::path::Path::new("/opt/chrome")));
        assert_eq!(chrome.user_data_dir.as_deref(), Some(std::path::Path::new("/tmp/profile")));
    }

    #[test]
    #[ignore] // Requires Chrome; run with: cargo test -- --ignored
    fn test_new_session_has_a_tab() {
        let session = BrowserSession::new().expect("Failed to launch browser");

        assert!(!session.get_tabs().unwrap().is_empty());
        assert!(session.tab().is_ok());
    }

    #[test]
    #[ignore]
    fn test_snapshot_of_blank_page() {
        let session = BrowserSession::new().expect("Failed to launch browser");
        session.navigate("about:blank").unwrap();
        session.wait_for_navigation().unwrap();

        let snapshot = session.snapshot(&SnapshotConfig::default(), None).unwrap();
        assert!(snapshot.contains("//html[1]"));
        assert!(snapshot.contains("//html[1]/body[1]"));
    }
}

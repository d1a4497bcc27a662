use crate::browser::{BrowserSession, LaunchOptions};
use crate::error;
use crate::snapshot::SnapshotConfig;
use rmcp::{ServerHandler,
           handler::server::router::tool::ToolRouter,
           model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
           tool_handler};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// MCP server exposing page navigation and snapshot tools
#[derive(Clone)]
pub struct BrowserServer {
    session: Arc<Mutex<BrowserSession>>,
    config: SnapshotConfig,
    tool_router: ToolRouter<Self>,
}

impl BrowserServer {
    /// Launch a browser with default options
    pub fn new() -> error::Result<Self> {
        Self::with_options(LaunchOptions::default())
    }

    /// Launch a browser with the given options
    pub fn with_options(options: LaunchOptions) -> error::Result<Self> {
        Self::with_config(options, SnapshotConfig::default())
    }

    /// Launch a browser; `config` is the base for every snapshot request
    pub fn with_config(options: LaunchOptions, config: SnapshotConfig) -> error::Result<Self> {
        let session = BrowserSession::launch(options)?;
        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            config,
            tool_router: Self::tool_router(),
        })
    }

    pub(super) fn session(&self) -> MutexGuard<'_, BrowserSession> {
        // A panicked tool call leaves the session usable
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn config(&self) -> &SnapshotConfig {
        &self.config
    }
}

#[tool_handler]
impl ServerHandler for BrowserServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Open a page with browser_navigate, then call page_snapshot to get a map from \
                 element paths (e.g. //html[1]/body[1]/div[2]) to tag, text, form state, HTML \
                 attributes, changed CSS properties and geometry normalized to the reference width."
                    .to_string(),
            ),
        }
    }
}

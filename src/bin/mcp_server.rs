//! Page snapshot MCP server
//!
//! Exposes page navigation and structural snapshot tools to MCP clients over
//! stdio or streamable HTTP.

use page_snapshot::browser::LaunchOptions;
use page_snapshot::mcp::BrowserServer;
use page_snapshot::snapshot::SnapshotConfig;
use clap::{Parser, ValueEnum};
use rmcp::{ServiceExt, transport::stdio};
use rmcp::transport::streamable_http_server::{StreamableHttpService, session::local::LocalSessionManager};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Transport {
    /// Standard input/output transport (default)
    Stdio,
    /// HTTP streamable transport
    Http,
}

#[derive(Parser)]
#[command(name = "mcp-server")]
#[command(version)]
#[command(about = "Page snapshot MCP server", long_about = None)]
struct Cli {
    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    executable_path: Option<String>,

    /// Browser window width; snapshots are normalized from this width
    #[arg(long, default_value = "1280")]
    window_width: u32,

    /// Browser window height
    #[arg(long, default_value = "800")]
    window_height: u32,

    /// YAML snapshot config (defaults to $PAGE_SNAPSHOT_CONFIG)
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<String>,

    /// Transport type to use
    #[arg(long, short = 't', value_enum, default_value = "stdio")]
    transport: Transport,

    /// Port for HTTP transport (default: 3000)
    #[arg(long, short = 'p', default_value = "3000")]
    port: u16,

    /// HTTP streamable endpoint path (default: /mcp)
    #[arg(long, default_value = "/mcp")]
    http_path: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout belongs to the stdio transport
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    let mut options = LaunchOptions::new()
        .headless(!cli.headed)
        .window_size(cli.window_width, cli.window_height);
    if let Some(ref path) = cli.executable_path {
        log::info!("Browser executable: {}", path);
        options = options.chrome_path(path);
    }

    let config = match cli.config {
        Some(ref path) => SnapshotConfig::from_yaml_file(path)?,
        None => SnapshotConfig::load()?,
    };

    log::info!("Page snapshot MCP server v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Browser mode: {}", if options.headless { "headless" } else { "headed" });

    match cli.transport {
        Transport::Stdio => {
            log::info!("Ready to accept MCP connections via stdio");
            let service = BrowserServer::with_config(options, config)
                .map_err(|e| format!("Failed to create browser server: {}", e))?;
            let server = service.serve(stdio()).await?;
            let quit_reason = server.waiting().await?;
            log::info!("Server quit with reason: {:?}", quit_reason);
            // Give destructors a moment to close the browser
            tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;
        }
        Transport::Http => {
            let bind_addr = format!("127.0.0.1:{}", cli.port);

            let service_factory = move || {
                BrowserServer::with_config(options.clone(), config.clone())
                    .map_err(std::io::Error::other)
            };

            let http_service = StreamableHttpService::new(
                service_factory,
                LocalSessionManager::default().into(),
                Default::default(),
            );

            let router = axum::Router::new().nest_service(&cli.http_path, http_service);

            log::info!("Ready to accept MCP connections at http://{}{}", bind_addr, cli.http_path);

            let listener = tokio::net::TcpListener::bind(bind_addr).await?;
            axum::serve(listener, router).await?;
        }
    }

    Ok(())
}

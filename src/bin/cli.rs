//! Command-line snapshot of a single page
//!
//! Opens the page in Chrome, waits for it to settle, and prints the
//! path-keyed snapshot as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use page_snapshot::{BrowserSession, LaunchOptions, ScreenshotMode, SnapshotConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "page-snapshot")]
#[command(version)]
#[command(about = "Extract a structural snapshot of a rendered web page", long_about = None)]
struct Cli {
    /// URL, host or local HTML file to snapshot
    url: String,

    /// Computed style properties to sample (comma separated)
    #[arg(long, value_delimiter = ',')]
    css: Vec<String>,

    /// CSS selector of the snapshot root (default: the <html> element)
    #[arg(long, value_name = "SELECTOR")]
    root: Option<String>,

    /// YAML snapshot config (defaults to $PAGE_SNAPSHOT_CONFIG)
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Width absolute geometry is normalized to
    #[arg(long, value_name = "PX")]
    reference_width: Option<f64>,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Browser window width
    #[arg(long, default_value = "1280")]
    window_width: u32,

    /// Browser window height
    #[arg(long, default_value = "800")]
    window_height: u32,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    executable_path: Option<PathBuf>,

    /// Milliseconds to wait after load before capturing
    #[arg(long, default_value = "0")]
    settle_ms: u64,

    /// Write the snapshot here instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Also save a PNG screenshot scaled to the reference width
    #[arg(long, value_name = "FILE")]
    screenshot: Option<PathBuf>,

    /// Area to screenshot when no root is given: full-page or viewport
    #[arg(long, default_value = "full-page")]
    screenshot_mode: ScreenshotMode,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => SnapshotConfig::from_yaml_file(path)?,
        None => SnapshotConfig::load()?,
    };
    if !cli.css.is_empty() {
        config.css_properties = cli.css.clone();
    }
    if let Some(width) = cli.reference_width {
        config.reference_width = width;
    }
    config.validate()?;

    let mut options = LaunchOptions::new()
        .headless(!cli.headed)
        .window_size(cli.window_width, cli.window_height);
    if let Some(ref path) = cli.executable_path {
        options = options.chrome_path(path);
    }

    let session = BrowserSession::launch(options).context("Failed to start browser")?;

    let navigation = session.execute_tool(
        "navigate",
        serde_json::json!({ "url": cli.url, "settle_ms": cli.settle_ms }),
    )?;
    if let Some(data) = navigation.data {
        log::info!("Loaded {}", data["url"]);
    }

    let snapshot = match cli.screenshot {
        Some(ref path) => {
            let (snapshot, screenshot) =
                session.snapshot_with_screenshot(&config, cli.root.as_deref(), cli.screenshot_mode)?;
            match screenshot {
                Some(screenshot) => {
                    screenshot.save(path)?;
                    log::info!("Saved {}x{} screenshot to {}", screenshot.width(), screenshot.height(), path.display());
                }
                None => log::warn!("No screenshot written to {}", path.display()),
            }
            snapshot
        }
        None => session.snapshot(&config, cli.root.as_deref())?,
    };
    log::info!("Captured {} records", snapshot.len());

    let json = snapshot.to_json()?;
    match cli.output {
        Some(path) => std::fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot to {}", path.display()))?,
        None => println!("{}", json),
    }

    session.close()?;
    Ok(())
}

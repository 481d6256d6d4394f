//! page-snapshot CLI
//!
//! Opens a page in Chrome, captures it and writes the snapshot as JSON
//! (and optionally the screenshot as PNG).

use anyhow::Context;
use clap::Parser;
use page_snapshot::{BrowserSession, ConnectionOptions, LaunchOptions, SnapshotConfig, Snapshotter};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "page-snapshot")]
#[command(version)]
#[command(about = "Capture a web page into a stable, diff-friendly element snapshot", long_about = None)]
struct Cli {
    /// URL of the page to capture
    url: String,

    /// Capture only the subtree of the first element matching this CSS selector
    #[arg(long, short = 's', value_name = "CSS")]
    selector: Option<String>,

    /// YAML configuration file (default: bundled configuration)
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the snapshot JSON here instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Also write the screenshot PNG here
    #[arg(long, value_name = "FILE")]
    screenshot: Option<PathBuf>,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    executable_path: Option<PathBuf>,

    /// Browser window size in pixels
    #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"])]
    window_size: Option<Vec<u32>>,

    /// Persistent browser profile directory
    #[arg(long, value_name = "DIR")]
    user_data_dir: Option<PathBuf>,

    /// Disable the Chrome sandbox (needed in some containers)
    #[arg(long)]
    no_sandbox: bool,

    /// WebSocket endpoint URL of an already running browser
    #[arg(long, value_name = "URL")]
    ws_endpoint: Option<String>,

    /// Idle timeout of the WebSocket connection in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 30_000)]
    connect_timeout: u64,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = SnapshotConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let snapshotter = Snapshotter::new(config);

    let session = match cli.ws_endpoint {
        Some(ref endpoint) => {
            log::info!("Connecting to browser at {}", endpoint);
            BrowserSession::connect(ConnectionOptions::new(endpoint.clone()).timeout(cli.connect_timeout))?
        }
        None => {
            let mut options = LaunchOptions::new().headless(!cli.headed).sandbox(!cli.no_sandbox);
            if let Some(ref path) = cli.executable_path {
                options = options.chrome_path(path.clone());
            }
            if let Some(ref dir) = cli.user_data_dir {
                options = options.user_data_dir(dir.clone());
            }
            if let Some(&[width, height]) = cli.window_size.as_deref() {
                options = options.window_size(width, height);
            }
            BrowserSession::launch(options)?
        }
    };

    session.navigate(&cli.url)?;
    session.wait_for_navigation()?;

    let snapshots = match cli.selector {
        Some(ref selector) => session.capture_element(&snapshotter, selector)?,
        None => session.capture(&snapshotter)?,
    };

    let snapshot = snapshots.into_iter().next().context("Capture returned no snapshot")?;
    eprintln!("Captured {} elements from {}", snapshot.count_elements(), snapshot.url);

    if let Some(ref path) = cli.screenshot {
        match snapshot.screenshot {
            Some(ref screenshot) => {
                screenshot.save(path).with_context(|| format!("Failed to write {}", path.display()))?;
            }
            None => eprintln!("No screenshot available; {} not written", path.display()),
        }
    }

    let json = snapshot.to_json()?;
    match cli.output {
        Some(ref path) => {
            std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => println!("{}", json),
    }

    Ok(())
}

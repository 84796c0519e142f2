//! Terminal monitor for the live joint-angle feed
//!
//! Opens a feed for one recording, prints a status line with a sparkline for
//! every update and optionally writes the final window to CSV.

mod render;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use kinefeed_core::api::RecordingClient;
use kinefeed_core::datalog::{write_csv, ReplayConnector};
use kinefeed_core::demo::DemoConnector;
use kinefeed_core::feed::{
    open_with, Connector, FeedConfig, FeedHandle, FeedState, ReconnectPolicy, WebSocketConnector,
    LIVE_CHANNEL,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kinefeed-monitor")]
#[command(about = "Watch a live knee-angle feed in the terminal", version)]
struct Args {
    /// Telemetry endpoint (overrides config file and KINEFEED_WS_URL)
    #[arg(long)]
    url: Option<String>,

    /// Recording to follow; "live" accepts every packet
    #[arg(long, short, default_value = LIVE_CHANNEL)]
    recording: String,

    /// JSON feed configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rolling window size in samples
    #[arg(long)]
    capacity: Option<usize>,

    /// Reconnect after the endpoint drops an open connection
    #[arg(long)]
    reconnect: bool,

    /// Reconnect attempts before giving up
    #[arg(long, default_value = "5")]
    max_retries: u32,

    /// Stream simulated knee angles instead of connecting
    #[arg(long, conflicts_with = "replay")]
    demo: bool,

    /// Stream a recorded `time_s,angle_deg` file instead of connecting
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Packet interval for --demo and --replay
    #[arg(long, default_value = "100")]
    interval_ms: u64,

    /// Recording API base URL (overrides KINEFEED_API_BASE)
    #[arg(long)]
    api_base: Option<String>,

    /// Fetch the stored recording and print its chart before streaming
    #[arg(long)]
    seed: bool,

    /// Write the final window to CSV; a dated name is used when FILE is omitted
    #[arg(long, value_name = "FILE")]
    export: Option<Option<PathBuf>>,

    /// Stop after this many seconds
    #[arg(long, value_name = "SECS")]
    duration: Option<u64>,
}

impl Args {
    fn feed_config(&self) -> Result<FeedConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let mut config = FeedConfig::load(path)
                    .with_context(|| format!("Failed to load {}", path.display()))?;
                config.apply_env();
                config
            }
            None => FeedConfig::from_env(),
        };

        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if self.reconnect {
            config.reconnect = ReconnectPolicy {
                auto_reconnect: true,
                max_retries: self.max_retries,
                ..config.reconnect
            };
        }
        config.validate()?;
        Ok(config)
    }

    fn connector(&self) -> Result<Arc<dyn Connector>> {
        let interval = Duration::from_millis(self.interval_ms);
        let tag = (self.recording != LIVE_CHANNEL).then(|| self.recording.clone());

        if self.demo {
            let mut demo = DemoConnector::new(interval);
            if let Some(id) = tag {
                demo = demo.with_id(id);
            }
            return Ok(Arc::new(demo));
        }
        if let Some(path) = &self.replay {
            let mut replay = ReplayConnector::from_csv(path, interval)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            if let Some(id) = tag {
                replay = replay.with_id(id);
            }
            tracing::info!(samples = replay.len(), "Replaying {}", path.display());
            return Ok(Arc::new(replay));
        }
        Ok(Arc::new(WebSocketConnector))
    }

    fn export_path(&self) -> Option<PathBuf> {
        let path = self.export.as_ref()?;
        Some(path.clone().unwrap_or_else(|| {
            let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
            PathBuf::from(format!("kinefeed_{}_{}.csv", self.recording, stamp))
        }))
    }
}

async fn print_recording(args: &Args) -> Result<()> {
    let client = match &args.api_base {
        Some(base) => RecordingClient::new(base.as_str())?,
        None => RecordingClient::from_env()?,
    };
    let recording = client
        .fetch_recording(&args.recording)
        .await
        .with_context(|| format!("Failed to fetch recording {}", args.recording))?;

    let label = recording.label.as_deref().unwrap_or(&args.recording);
    println!("{label}: {}", render::recording_summary(&recording.chart_points()));
    Ok(())
}

async fn monitor(handle: &FeedHandle, duration: Option<Duration>) -> Result<()> {
    let mut updates = handle.updates();
    let deadline = async {
        match duration {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut stdout = std::io::stdout();
    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                result.context("Failed to listen for Ctrl-C")?;
                tracing::info!("Interrupted");
                break;
            }
            _ = &mut deadline => break,
            update = updates.next() => match update {
                Some(snapshot) => {
                    write!(stdout, "\r{}\x1b[K", render::status_line(&snapshot))?;
                    stdout.flush()?;
                }
                None => break,
            },
        }
    }
    writeln!(stdout)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.feed_config()?;
    let connector = args.connector()?;

    if args.seed && args.recording != LIVE_CHANNEL {
        // The live view still works without the stored session
        if let Err(e) = print_recording(&args).await {
            tracing::warn!("{e:#}");
        }
    }

    let handle = open_with(&args.recording, config, connector)?;
    monitor(&handle, args.duration.map(Duration::from_secs)).await?;
    handle.close();

    let snapshot = handle.snapshot();
    match (handle.state(), handle.last_error()) {
        (FeedState::Failed, Some(err)) => {
            println!("{}", render::status_line(&snapshot));
            tracing::error!("Feed failed: {err}");
        }
        (_, Some(err)) => tracing::warn!("Feed ended: {err}"),
        _ => {}
    }

    if let Some(path) = args.export_path() {
        if snapshot.is_empty() {
            tracing::warn!("Nothing to export");
        } else {
            write_csv(&path, &snapshot)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Exported {} samples to {}", snapshot.len(), path.display());
        }
    }

    Ok(())
}

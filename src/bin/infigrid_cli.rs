//! CLI tool for infigrid - replays a gesture script against a headless grid
//!
//! Usage:
//!   infigrid_cli                                # Built-in demo session, JSON to stdout
//!   infigrid_cli --script pan.json -o out.json  # Replay a script, JSON to file
//!
//! Tiles come from the in-process synthetic fetcher, so no network is needed.
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `info`).

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use infigrid::content::DEFAULT_SYNTHETIC_TILE_PIXELS;
use infigrid::{
    CellFrame, GestureEvent, GridConfig, GridViewer, LayoutReport, PumpReport, Result,
    SyntheticFetcher, ViewerStats,
};

/// Headless infinite-grid session runner.
#[derive(Parser, Debug)]
#[command(
    name = "infigrid_cli",
    version,
    about = "Replay pan/zoom gestures against a virtualized tile grid",
    long_about = "Drives a grid viewer through a JSON script of gesture events and\n\
                  prints one summary per step: the visible window, how many cells\n\
                  were kept, recycled or allocated, and how many loads completed.\n\n\
                  Example script:\n  \
                  [{\"type\": \"pan\", \"x\": -40, \"y\": 0}, {\"type\": \"pan_end\"}]"
)]
struct CliArgs {
    /// Grid configuration (JSON). Missing fields take their defaults.
    #[arg(short, long, value_name = "CONFIG.json")]
    config: Option<PathBuf>,

    /// Gesture script (JSON array of events). A short demo runs when omitted.
    #[arg(short, long, value_name = "SCRIPT.json")]
    script: Option<PathBuf>,

    /// Viewport width in pixels.
    #[arg(long, default_value_t = 800.0)]
    width: f64,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 600.0)]
    height: f64,

    /// Artificial latency of every synthetic fetch, in milliseconds.
    #[arg(long, default_value_t = 0, value_name = "MS")]
    latency_ms: u64,

    /// Edge length of generated tiles, in pixels.
    #[arg(long, default_value_t = DEFAULT_SYNTHETIC_TILE_PIXELS, value_name = "PX")]
    tile_pixels: u32,

    /// Include every cell frame in each step summary.
    #[arg(long)]
    frames: bool,

    /// Output file path. Prints to stdout when omitted.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct StepSummary {
    step: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    event: Option<GestureEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<LayoutReport>,
    completions: PumpReport,
    stats: ViewerStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    frames: Option<Vec<CellFrame>>,
}

fn demo_script() -> Vec<GestureEvent> {
    vec![
        GestureEvent::Pan { x: -40.0, y: 0.0 },
        GestureEvent::Pan { x: -260.0, y: -35.0 },
        GestureEvent::PanEnd,
        GestureEvent::Zoom { factor: 1.5 },
        GestureEvent::ZoomEnd,
        GestureEvent::CenterOn {
            column: 1_000,
            row: -1_000,
        },
        GestureEvent::Reload {
            column: 1_000,
            row: -1_000,
        },
        GestureEvent::Reset,
    ]
}

fn load_script(args: &CliArgs) -> Result<Vec<GestureEvent>> {
    match &args.script {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&json)?)
        }
        None => Ok(demo_script()),
    }
}

fn load_config(args: &CliArgs) -> Result<GridConfig> {
    match &args.config {
        Some(path) => GridConfig::from_path(path),
        None => Ok(GridConfig::default()),
    }
}

fn run(args: &CliArgs) -> Result<Vec<StepSummary>> {
    let config = load_config(args)?;
    let script = load_script(args)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let fetcher = SyntheticFetcher::new(args.tile_pixels)
        .with_latency(Duration::from_millis(args.latency_ms));
    let mut viewer = GridViewer::new(config, Arc::new(fetcher), runtime.handle().clone())?;
    viewer.resize(args.width, args.height);

    let mut steps = Vec::with_capacity(script.len() + 1);
    let mut record = |step: usize, event: Option<GestureEvent>, viewer: &mut GridViewer| {
        let layout = viewer.layout();
        let completions = runtime.block_on(viewer.settle());
        let stats = viewer.stats();
        info!(
            step,
            live = stats.live_cells,
            loads = layout.as_ref().map_or(0, |report| report.loads),
            applied = completions.applied,
            failed = completions.failed,
            "step"
        );
        steps.push(StepSummary {
            step,
            event,
            layout,
            completions,
            stats,
            frames: args.frames.then(|| viewer.frames()),
        });
    };

    record(0, None, &mut viewer);
    for (index, event) in script.into_iter().enumerate() {
        viewer.handle_event(&event);
        record(index + 1, Some(event), &mut viewer);
    }
    Ok(steps)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = CliArgs::parse();

    let steps = match run(&args) {
        Ok(steps) => steps,
        Err(e) => {
            error!(error = %e, "session failed");
            return ExitCode::FAILURE;
        }
    };

    let json = match serde_json::to_string_pretty(&steps) {
        Ok(json) => json,
        Err(e) => {
            error!(error = %e, "error serializing JSON");
            return ExitCode::FAILURE;
        }
    };

    match &args.output {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                error!(path = %path.display(), error = %e, "error writing output");
                return ExitCode::FAILURE;
            }
            info!(path = %path.display(), "written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = writeln!(stdout, "{json}") {
                error!(error = %e, "error writing to stdout");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

//! Contour CLI.
//!
//! Reads a JSON array of points, aggregates them into a density grid,
//! traces contour lines and writes the resulting line layer as JSON.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use contour_cli::{contour_points, load_points, resolve_config, write_sub_layer, Overrides};
use contour_layer::ContourLayerConfig;

#[derive(Parser, Debug)]
#[command(name = "contour-cli")]
#[command(about = "Aggregate points into a density grid and trace its contour lines")]
struct Args {
    /// JSON file holding an array of `{"position": [x, y]}` records
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Layer id
    #[arg(long, default_value = "contour-layer")]
    id: String,

    /// Cell size in meters
    #[arg(long)]
    cell_size: Option<f64>,

    /// JSON file with `thresholds` and `colors` arrays
    #[arg(long, env = "CONTOUR_THRESHOLDS_FILE")]
    thresholds: Option<PathBuf>,

    /// Aggregate on the compute pool
    #[arg(long)]
    gpu_aggregation: bool,

    /// Compute pool size (0 = one thread per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Line width multiplier
    #[arg(long)]
    width_scale: Option<f32>,

    /// Request 64-bit positions from the line layer
    #[arg(long)]
    fp64: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so stdout stays clean for the JSON output
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let overrides = Overrides {
        cell_size: args.cell_size,
        thresholds_file: args.thresholds,
        gpu_aggregation: args.gpu_aggregation,
        threads: args.threads,
        width_scale: args.width_scale,
        fp64: args.fp64,
    };
    let config = resolve_config(ContourLayerConfig::from_env(), &overrides)?;
    info!(
        cell_size = config.cell_size,
        gpu_aggregation = config.gpu_aggregation,
        thresholds = ?config.thresholds.thresholds(),
        "Loaded configuration"
    );

    let points = load_points(&args.input)?;
    let sub_layer = contour_points(&args.id, points, &config)?;
    write_sub_layer(&sub_layer, args.output.as_deref())?;

    Ok(())
}

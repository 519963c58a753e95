//! `swale`: terrain derivatives and bioswale siting over JSON grids.
//!
//! Grids travel as the JSON form of `swale_core::Grid`
//! (`{rows, cols, pixel_size, nodata, data}`, NaN written as `null`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use swale_core::terrain::derive_terrain;
use swale_core::{Grid, SitingConfig, SitingInputs, SitingPipeline};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "swale", version, about = "Terrain analysis and bioswale siting")]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show dimensions and statistics of a grid file
    Info {
        /// Input grid (JSON)
        input: PathBuf,
    },
    /// Slope, D8 flow direction, accumulation and TWI from a DEM
    Terrain {
        /// Elevation grid (JSON)
        input: PathBuf,
        /// Directory for the output grids
        #[arg(short, long)]
        out_dir: PathBuf,
    },
    /// Full siting run: terrain, impervious fraction, suitability, priority
    Run {
        /// Elevation grid (JSON)
        #[arg(long)]
        elevation: PathBuf,
        /// Ordinal soil grid, A=4 … D=1 (JSON)
        #[arg(long)]
        soil: PathBuf,
        /// Binary impervious grid (JSON)
        #[arg(long)]
        impervious: PathBuf,
        /// Siting configuration; defaults when absent
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Directory for the output grids
        #[arg(short, long)]
        out_dir: PathBuf,
    },
    /// Print the default siting configuration as JSON
    Defaults,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")
}

fn read_grid(path: &Path) -> Result<Grid> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let grid: Grid =
        serde_json::from_str(&text).with_context(|| format!("Invalid grid in {}", path.display()))?;
    info!(path = %path.display(), rows = grid.rows(), cols = grid.cols(), "loaded grid");
    Ok(grid)
}

fn write_grid(grid: &Grid, dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(format!("{name}.json"));
    let text = serde_json::to_string(grid).context("Failed to serialise grid")?;
    fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

fn load_config(path: Option<&Path>) -> Result<SitingConfig> {
    match path {
        None => Ok(SitingConfig::default()),
        Some(p) => {
            let text = fs::read_to_string(p).with_context(|| format!("Failed to read {}", p.display()))?;
            SitingConfig::from_json(&text).with_context(|| format!("Invalid configuration in {}", p.display()))
        }
    }
}

fn write_all(dir: &Path, grids: &[(&str, &Grid)]) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    for (name, grid) in grids {
        let path = write_grid(grid, dir, name)?;
        println!("{name} saved to: {}", path.display());
    }
    Ok(())
}

// ─── Commands ───────────────────────────────────────────────────────────

fn info_cmd(input: &Path) -> Result<()> {
    let grid = read_grid(input)?;
    let s = grid.summary();

    println!("File: {}", input.display());
    println!("Dimensions: {} x {} ({} cells)", grid.cols(), grid.rows(), grid.len());
    println!("Pixel size: {}", grid.pixel_size());
    if let Some(nodata) = grid.nodata() {
        println!("NoData: {nodata}");
    }
    println!("\nStatistics:");
    println!("  Min: {:.4}", s.min);
    println!("  Max: {:.4}", s.max);
    println!("  Mean: {:.4}", s.mean);
    println!("  Median: {:.4}", s.median);
    println!(
        "  Valid cells: {} ({:.1}%)",
        s.valid_cells,
        100.0 * s.valid_cells as f64 / grid.len() as f64
    );
    Ok(())
}

fn terrain_cmd(input: &Path, out_dir: &Path) -> Result<()> {
    let dem = read_grid(input)?.with_nan_nodata();
    let t = derive_terrain(&dem)?;
    println!("Sinks: {} of {} cells ({:.2}%)", t.sinks.sinks, t.sinks.cells, t.sinks.percent());

    let flow = t.directions.to_grid();
    write_all(
        out_dir,
        &[
            ("slope_deg", &t.slope_deg),
            ("slope_rad", &t.slope_rad),
            ("flow_direction", &flow),
            ("flow_accumulation", &t.accumulation),
            ("twi", &t.twi),
        ],
    )
}

fn run_cmd(inputs: SitingInputs, config: &SitingConfig, out_dir: &Path) -> Result<()> {
    let pipeline = SitingPipeline::new(config).context("Invalid siting configuration")?;
    let out = pipeline.run(&inputs)?;
    println!("Sinks: {} of {} cells ({:.2}%)", out.sinks.sinks, out.sinks.cells, out.sinks.percent());

    let flow = out.flow.to_grid();
    write_all(
        out_dir,
        &[
            ("slope_deg", &out.slope_deg),
            ("slope_rad", &out.slope_rad),
            ("flow_direction", &flow),
            ("flow_accumulation", &out.accumulation),
            ("twi", &out.twi),
            ("impervious_fraction", &out.impervious_fraction),
            ("suitability", &out.suitability),
            ("priority", &out.priority),
        ],
    )
}

fn defaults_json() -> Result<String> {
    SitingConfig::default().to_json_pretty().context("Failed to serialise defaults")
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;
    let start = Instant::now();

    match cli.command {
        Commands::Info { input } => info_cmd(&input)?,
        Commands::Terrain { input, out_dir } => terrain_cmd(&input, &out_dir)?,
        Commands::Run { elevation, soil, impervious, config, out_dir } => {
            let config = load_config(config.as_deref())?;
            let inputs = SitingInputs {
                elevation: read_grid(&elevation)?,
                soil: read_grid(&soil)?,
                impervious: read_grid(&impervious)?,
            };
            run_cmd(inputs, &config, &out_dir)?;
        }
        Commands::Defaults => {
            println!("{}", defaults_json()?);
            return Ok(());
        }
    }

    println!("  Processing time: {:.2?}", start.elapsed());
    Ok(())
}

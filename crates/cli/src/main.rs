//! Landflow CLI - steepest-descent flow routing on irregular meshes

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use landflow_algorithms::hydrology::{
    flow_accumulation, FlowDirectorSteepestDescent, FlowReport, TOPOGRAPHIC_ELEVATION,
};
use landflow_core::io::{read_mesh, write_mesh, MeshDocument, MeshLayout};
use landflow_core::{Component, Grid, ModelGrid, VoronoiDelaunayGrid};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "landflow")]
#[command(author, version, about = "Steepest-descent flow routing on irregular meshes", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a hexagonal mesh document
    Hex {
        /// Number of rows (odd, at least 3)
        #[arg(short, long)]
        rows: usize,
        /// Nodes in the first and last rows
        #[arg(short, long)]
        cols: usize,
        /// Distance between neighboring nodes
        #[arg(short, long, default_value = "1.0")]
        spacing: f64,
        /// Add the tilted surface x + round(y) as topographic__elevation
        #[arg(long)]
        tilt: bool,
        /// Output mesh file
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Route flow across a mesh and report receivers, slopes, links and sinks
    Route {
        /// Input mesh file
        input: PathBuf,
        /// Node field to route across
        #[arg(long, default_value = TOPOGRAPHIC_ELEVATION)]
        surface: String,
        /// Also accumulate drainage (one unit per node)
        #[arg(long)]
        drainage: bool,
        /// Output report file; printed to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show information about a mesh file
    Info {
        /// Input mesh file
        input: PathBuf,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn load_grid(path: &Path) -> Result<Grid> {
    let pb = spinner("Reading mesh...");
    let doc = read_mesh(path).with_context(|| format!("Failed to read mesh {}", path.display()))?;
    let grid = doc.build().context("Failed to build grid")?;
    pb.finish_and_clear();
    info!(
        "Mesh: {} grid, {} nodes, {} links",
        grid.kind(),
        grid.number_of_nodes(),
        grid.number_of_links()
    );
    Ok(grid)
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn hex_document(rows: usize, cols: usize, spacing: f64, tilt: bool) -> Result<MeshDocument> {
    let grid = VoronoiDelaunayGrid::hex(rows, cols, spacing).context("Invalid hex grid")?;
    let mut doc = MeshDocument::new(MeshLayout::Hex {
        num_rows: rows,
        base_num_cols: cols,
        spacing,
    });
    if tilt {
        let z = grid
            .node_x()
            .iter()
            .zip(grid.node_y())
            .map(|(x, y)| x + y.round())
            .collect();
        doc.fields.insert(TOPOGRAPHIC_ELEVATION.to_string(), z);
    }
    Ok(doc)
}

fn route(grid: &mut Grid, surface: &str, drainage: bool) -> Result<FlowReport> {
    let pb = spinner("Routing flow...");
    let mut fd = FlowDirectorSteepestDescent::new(grid, surface)
        .with_context(|| format!("Cannot route across {surface}"))?;
    fd.run_one_step(grid).context("Flow routing failed")?;
    pb.finish_and_clear();
    debug!(method = fd.method(), sinks = fd.sinks().len(), "routed");

    let report = FlowReport::from_grid(&*grid)?;
    if drainage {
        let totals = flow_accumulation(&report.receivers(), None)
            .context("Flow accumulation failed")?;
        return Ok(report.with_drainage(totals));
    }
    Ok(report)
}

fn print_info(path: &Path, grid: &Grid) {
    let mut by_status: BTreeMap<String, usize> = BTreeMap::new();
    for status in grid.status_at_node() {
        *by_status.entry(format!("{status:?}")).or_default() += 1;
    }

    println!("File: {}", path.display());
    println!("Kind: {}", grid.kind());
    println!("Nodes: {}", grid.number_of_nodes());
    println!(
        "Links: {} ({} active)",
        grid.number_of_links(),
        grid.active_links().len()
    );
    for (status, count) in &by_status {
        println!("  {status}: {count}");
    }
    let names: Vec<&str> = grid.at_node().names().collect();
    if names.is_empty() {
        println!("Fields: none");
    } else {
        println!("Fields: {}", names.join(", "));
    }
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Hex {
            rows,
            cols,
            spacing,
            tilt,
            output,
        } => {
            let start = Instant::now();
            let doc = hex_document(rows, cols, spacing, tilt)?;
            write_mesh(&output, &doc).context("Failed to write mesh")?;
            done("Hex mesh", &output, start.elapsed());
        }

        Commands::Route {
            input,
            surface,
            drainage,
            output,
        } => {
            let mut grid = load_grid(&input)?;
            let start = Instant::now();
            let report = route(&mut grid, &surface, drainage)?;
            let elapsed = start.elapsed();
            info!(
                "{} sinks, {} pits among {} core nodes",
                report.number_of_sinks, report.number_of_pits, report.number_of_core_nodes
            );

            let json = serde_json::to_string_pretty(&report)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json).context("Failed to write report")?;
                    done("Flow report", &path, elapsed);
                }
                None => println!("{json}"),
            }
        }

        Commands::Info { input } => {
            let grid = load_grid(&input)?;
            print_info(&input, &grid);
        }
    }

    Ok(())
}

//! Hex routing demo: route flow across a tilted hexagon and print the
//! receiver tree with drainage totals.
//!
//! Run:
//!   cargo run -p landflow-algorithms --example hex_routing

use landflow_algorithms::hydrology::{
    flow_accumulation, FlowDirectorSteepestDescent, FlowReport, TOPOGRAPHIC_ELEVATION,
};
use landflow_core::{Component, ModelGrid, VoronoiDelaunayGrid};

fn main() -> landflow_core::Result<()> {
    let mut grid = VoronoiDelaunayGrid::hex(7, 4, 10.0)?;
    let z: Vec<f64> = grid
        .node_x()
        .iter()
        .zip(grid.node_y())
        .map(|(x, y)| 0.05 * x + 0.1 * (y / 10.0).round())
        .collect();
    grid.at_node_mut().add_field(TOPOGRAPHIC_ELEVATION, z)?;

    let mut fd = FlowDirectorSteepestDescent::new(&mut grid, TOPOGRAPHIC_ELEVATION)?;
    fd.run_one_step(&mut grid)?;

    let report = FlowReport::from_grid(&grid)?;
    let drainage = flow_accumulation(&report.receivers(), None)?;

    println!("{:>5} {:>9} {:>9} {:>5} {:>9}", "node", "receiver", "slope", "link", "drainage");
    for node in 0..grid.number_of_nodes() {
        println!(
            "{:>5} {:>9} {:>9.4} {:>5} {:>9}",
            node,
            report.receiver[node],
            report.steepest_slope[node],
            report.link_to_receiver[node],
            drainage[node]
        );
    }
    println!(
        "{} nodes, {} core, {} sinks",
        report.number_of_nodes, report.number_of_core_nodes, report.number_of_sinks
    );
    Ok(())
}

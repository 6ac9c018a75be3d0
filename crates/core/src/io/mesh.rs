//! JSON mesh documents
//!
//! A document names how to build a grid (scattered points, a hexagon, or
//! a raster), optional node status overrides and float node fields:
//!
//! ```json
//! {
//!   "mesh": { "kind": "hex", "num_rows": 5, "base_num_cols": 3, "spacing": 1.0 },
//!   "node_status": { "6": "closed" },
//!   "fields": { "topographic__elevation": [0.0, 1.0, 2.0] }
//! }
//! ```

use crate::error::Result;
use crate::grid::{Grid, ModelGrid, NodeStatus, RasterModelGrid, VoronoiDelaunayGrid};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

fn default_spacing() -> f64 {
    1.0
}

/// How the grid's nodes and links are laid out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeshLayout {
    /// Delaunay triangulation of scattered points
    Voronoi { x: Vec<f64>, y: Vec<f64> },
    /// Hexagon-shaped lattice
    Hex {
        num_rows: usize,
        base_num_cols: usize,
        #[serde(default = "default_spacing")]
        spacing: f64,
    },
    /// Rectangular lattice
    Raster {
        rows: usize,
        cols: usize,
        #[serde(default = "default_spacing")]
        spacing: f64,
    },
}

/// A grid description plus the node data to load onto it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshDocument {
    #[serde(rename = "mesh")]
    pub layout: MeshLayout,
    /// Status overrides applied after the grid's default perimeter status
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_status: BTreeMap<usize, NodeStatus>,
    /// Float node fields by name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Vec<f64>>,
}

impl MeshDocument {
    /// Document for a layout with no overrides or fields
    pub fn new(layout: MeshLayout) -> Self {
        Self {
            layout,
            node_status: BTreeMap::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Build the grid, apply status overrides and load the fields
    pub fn build(&self) -> Result<Grid> {
        let mut grid: Grid = match &self.layout {
            MeshLayout::Voronoi { x, y } => VoronoiDelaunayGrid::new(x, y)?.into(),
            MeshLayout::Hex {
                num_rows,
                base_num_cols,
                spacing,
            } => VoronoiDelaunayGrid::hex(*num_rows, *base_num_cols, *spacing)?.into(),
            MeshLayout::Raster {
                rows,
                cols,
                spacing,
            } => RasterModelGrid::new(*rows, *cols, *spacing)?.into(),
        };

        for (&node, &status) in &self.node_status {
            grid.set_status_at_node(node, status)?;
        }
        for (name, values) in &self.fields {
            grid.at_node_mut().set_field(name.clone(), values.clone())?;
        }
        Ok(grid)
    }
}

/// Read a mesh document from a JSON file
pub fn read_mesh<P: AsRef<Path>>(path: P) -> Result<MeshDocument> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Write a mesh document to a JSON file
pub fn write_mesh<P: AsRef<Path>>(path: P, doc: &MeshDocument) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, doc)?;
    writer.flush()?;
    Ok(())
}

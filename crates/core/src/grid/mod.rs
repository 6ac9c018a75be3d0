//! Grid data structures and the interface flow routing works against

mod base;
mod fields;
mod hex;
mod raster;
mod voronoi;

pub use base::GridBase;
pub use fields::{Field, FieldElement, NodeFields};
pub use raster::RasterModelGrid;
pub use voronoi::VoronoiDelaunayGrid;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel stored in integer fields where no valid index exists
pub const BAD_INDEX_VALUE: i64 = -1;

/// Boundary condition status of a node.
///
/// The discriminants match the integer codes used in saved grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum NodeStatus {
    Core = 0,
    FixedValue = 1,
    FixedGradient = 2,
    Looped = 3,
    Closed = 4,
}

impl NodeStatus {
    /// Integer code of this status
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Status for an integer code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(NodeStatus::Core),
            1 => Some(NodeStatus::FixedValue),
            2 => Some(NodeStatus::FixedGradient),
            3 => Some(NodeStatus::Looped),
            4 => Some(NodeStatus::Closed),
            _ => None,
        }
    }

    /// Any status other than core
    pub fn is_boundary(self) -> bool {
        self != NodeStatus::Core
    }

    /// Fixed value and fixed gradient nodes act as base level for flow
    pub fn is_base_level(self) -> bool {
        matches!(self, NodeStatus::FixedValue | NodeStatus::FixedGradient)
    }
}

/// Status of a link, derived from the status of its two end nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum LinkStatus {
    Active = 0,
    Fixed = 2,
    Inactive = 4,
}

impl LinkStatus {
    /// Status of a link joining nodes with statuses `a` and `b`.
    ///
    /// A link is active when neither end is closed and at least one end is
    /// core. A core node joined to a fixed-gradient node gives a fixed link.
    pub fn between(a: NodeStatus, b: NodeStatus) -> Self {
        use NodeStatus::*;
        match (a, b) {
            (Closed, _) | (_, Closed) => LinkStatus::Inactive,
            (Core, FixedGradient) | (FixedGradient, Core) => LinkStatus::Fixed,
            (Core, _) | (_, Core) => LinkStatus::Active,
            _ => LinkStatus::Inactive,
        }
    }
}

/// The kind of grid, as far as components care about topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridKind {
    Raster,
    Voronoi,
    Hex,
}

impl GridKind {
    /// Whether the grid has irregular (Voronoi/Delaunay) topology
    pub fn is_irregular(self) -> bool {
        matches!(self, GridKind::Voronoi | GridKind::Hex)
    }
}

impl fmt::Display for GridKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridKind::Raster => write!(f, "raster"),
            GridKind::Voronoi => write!(f, "Voronoi"),
            GridKind::Hex => write!(f, "hex"),
        }
    }
}

/// Interface shared by all model grids.
///
/// Implementors only expose their kind and the shared [`GridBase`];
/// topology queries, boundary handling and gradients are provided.
pub trait ModelGrid {
    /// Topology kind of this grid
    fn kind(&self) -> GridKind;

    /// Shared node/link storage
    fn base(&self) -> &GridBase;

    /// Mutable access to the shared node/link storage
    fn base_mut(&mut self) -> &mut GridBase;

    // Topology

    fn number_of_nodes(&self) -> usize {
        self.base().number_of_nodes()
    }

    fn number_of_links(&self) -> usize {
        self.base().number_of_links()
    }

    fn node_x(&self) -> &[f64] {
        self.base().node_x()
    }

    fn node_y(&self) -> &[f64] {
        self.base().node_y()
    }

    fn node_at_link_tail(&self) -> &[usize] {
        self.base().node_at_link_tail()
    }

    fn node_at_link_head(&self) -> &[usize] {
        self.base().node_at_link_head()
    }

    fn length_of_link(&self) -> &[f64] {
        self.base().length_of_link()
    }

    // Boundary conditions

    fn status_at_node(&self) -> &[NodeStatus] {
        self.base().status_at_node()
    }

    /// Code identifying the current boundary configuration.
    ///
    /// Changes every time node status is set, so cached link tables can
    /// be checked against it.
    fn bc_set_code(&self) -> u64 {
        self.base().bc_set_code()
    }

    fn set_status_at_node(&mut self, node: usize, status: NodeStatus) -> Result<()> {
        self.base_mut().set_status(&[node], status)
    }

    /// Close the given nodes to flow
    fn set_closed_nodes(&mut self, nodes: &[usize]) -> Result<()> {
        self.base_mut().set_status(nodes, NodeStatus::Closed)
    }

    /// Close every node whose value equals `nodata` (or is NaN when
    /// `nodata` is NaN).
    fn set_nodata_nodes_to_closed(&mut self, values: &[f64], nodata: f64) -> Result<()> {
        check_node_array(self.number_of_nodes(), values.len(), "nodata values")?;
        let nodes: Vec<usize> = values
            .iter()
            .enumerate()
            .filter(|&(_, &v)| if nodata.is_nan() { v.is_nan() } else { v == nodata })
            .map(|(i, _)| i)
            .collect();
        self.set_closed_nodes(&nodes)
    }

    fn status_at_link(&self) -> Vec<LinkStatus> {
        let status = self.status_at_node();
        self.node_at_link_tail()
            .iter()
            .zip(self.node_at_link_head())
            .map(|(&t, &h)| LinkStatus::between(status[t], status[h]))
            .collect()
    }

    /// Ids of active links, ascending
    fn active_links(&self) -> Vec<usize> {
        self.status_at_link()
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s == LinkStatus::Active)
            .map(|(i, _)| i)
            .collect()
    }

    fn core_nodes(&self) -> Vec<usize> {
        nodes_where(self.status_at_node(), |s| s == NodeStatus::Core)
    }

    fn boundary_nodes(&self) -> Vec<usize> {
        nodes_where(self.status_at_node(), NodeStatus::is_boundary)
    }

    // Gradients

    /// Gradient of `values` along every link, head minus tail over length
    fn calc_grad_at_link(&self, values: &[f64]) -> Result<Vec<f64>> {
        let links: Vec<usize> = (0..self.number_of_links()).collect();
        self.base().grad_along(values, &links)
    }

    /// Gradient of `values` along the active links, in active-link order
    fn calc_grad_of_active_link(&self, values: &[f64]) -> Result<Vec<f64>> {
        self.base().grad_along(values, &self.active_links())
    }

    // Fields

    fn at_node(&self) -> &NodeFields {
        self.base().fields()
    }

    fn at_node_mut(&mut self) -> &mut NodeFields {
        self.base_mut().fields_mut()
    }
}

/// Any of the concrete grids, for code that picks the grid at runtime.
#[derive(Debug, Clone)]
pub enum Grid {
    Voronoi(VoronoiDelaunayGrid),
    Raster(RasterModelGrid),
}

impl ModelGrid for Grid {
    fn kind(&self) -> GridKind {
        match self {
            Grid::Voronoi(g) => g.kind(),
            Grid::Raster(g) => g.kind(),
        }
    }

    fn base(&self) -> &GridBase {
        match self {
            Grid::Voronoi(g) => g.base(),
            Grid::Raster(g) => g.base(),
        }
    }

    fn base_mut(&mut self) -> &mut GridBase {
        match self {
            Grid::Voronoi(g) => g.base_mut(),
            Grid::Raster(g) => g.base_mut(),
        }
    }
}

impl From<VoronoiDelaunayGrid> for Grid {
    fn from(grid: VoronoiDelaunayGrid) -> Self {
        Grid::Voronoi(grid)
    }
}

impl From<RasterModelGrid> for Grid {
    fn from(grid: RasterModelGrid) -> Self {
        Grid::Raster(grid)
    }
}

fn nodes_where(status: &[NodeStatus], pred: impl Fn(NodeStatus) -> bool) -> Vec<usize> {
    status
        .iter()
        .enumerate()
        .filter(|&(_, &s)| pred(s))
        .map(|(i, _)| i)
        .collect()
}

pub(crate) fn check_node_array(expected: usize, actual: usize, what: &'static str) -> Result<()> {
    if expected != actual {
        return Err(Error::SizeMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

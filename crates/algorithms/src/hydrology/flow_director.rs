//! Single-path (steepest descent) flow director for irregular grids
//!
//! Wraps a grid and a surface and, on each step, writes four node fields:
//!
//! - `flow__receiver_node`: receiver of each node, or its own id if none
//! - `topographic__steepest_slope`: downhill slope toward the receiver
//! - `flow__link_to_receiver_node`: link toward the receiver, or
//!   `BAD_INDEX_VALUE` if none
//! - `flow__sink_flag`: whether the node is a local low
//!
//! Raster grids are not supported; the director refuses them at
//! construction.

use super::flow_direction::{flow_directions, LinkNetwork};
use landflow_core::{
    Component, Error, FieldInfo, FieldRole, ModelGrid, Result, BAD_INDEX_VALUE,
};
use ndarray::Array1;
use tracing::debug;

/// Default surface field
pub const TOPOGRAPHIC_ELEVATION: &str = "topographic__elevation";
/// Receiver of each node (int)
pub const FLOW_RECEIVER_NODE: &str = "flow__receiver_node";
/// Downhill slope toward the receiver (float)
pub const TOPOGRAPHIC_STEEPEST_SLOPE: &str = "topographic__steepest_slope";
/// Link toward the receiver, `BAD_INDEX_VALUE` where none (int)
pub const FLOW_LINK_TO_RECEIVER_NODE: &str = "flow__link_to_receiver_node";
/// Local low flag (bool)
pub const FLOW_SINK_FLAG: &str = "flow__sink_flag";

static FIELD_INFO: [FieldInfo; 5] = [
    FieldInfo {
        name: TOPOGRAPHIC_ELEVATION,
        role: FieldRole::Input,
        units: "m",
        doc: "Land surface topographic elevation",
    },
    FieldInfo {
        name: FLOW_RECEIVER_NODE,
        role: FieldRole::Output,
        units: "-",
        doc: "Node array of receivers (node that receives flow from current node)",
    },
    FieldInfo {
        name: TOPOGRAPHIC_STEEPEST_SLOPE,
        role: FieldRole::Output,
        units: "-",
        doc: "Node array of steepest *downhill* slopes",
    },
    FieldInfo {
        name: FLOW_LINK_TO_RECEIVER_NODE,
        role: FieldRole::Output,
        units: "-",
        doc: "ID of link downstream of each node, which carries the discharge",
    },
    FieldInfo {
        name: FLOW_SINK_FLAG,
        role: FieldRole::Output,
        units: "-",
        doc: "Boolean array, True at local lows",
    },
];

/// The surface flow is directed across.
#[derive(Debug, Clone, PartialEq)]
pub enum Surface {
    /// A float node field on the grid, read at every step
    Field(String),
    /// Fixed values, one per node
    Values(Vec<f64>),
}

impl Default for Surface {
    fn default() -> Self {
        Surface::Field(TOPOGRAPHIC_ELEVATION.to_string())
    }
}

impl From<&str> for Surface {
    fn from(name: &str) -> Self {
        Surface::Field(name.to_string())
    }
}

impl From<String> for Surface {
    fn from(name: String) -> Self {
        Surface::Field(name)
    }
}

impl From<Vec<f64>> for Surface {
    fn from(values: Vec<f64>) -> Self {
        Surface::Values(values)
    }
}

/// Steepest-descent flow director.
///
/// # Example
///
/// ```
/// use landflow_algorithms::hydrology::{FlowDirectorSteepestDescent, FLOW_RECEIVER_NODE};
/// use landflow_core::{Component, ModelGrid, VoronoiDelaunayGrid};
///
/// let mut grid = VoronoiDelaunayGrid::hex(5, 3, 1.0)?;
/// let z: Vec<f64> = grid
///     .node_x()
///     .iter()
///     .zip(grid.node_y())
///     .map(|(x, y)| x + y.round())
///     .collect();
/// grid.at_node_mut().add_field("topographic__elevation", z)?;
///
/// let mut fd = FlowDirectorSteepestDescent::new(&mut grid, "topographic__elevation")?;
/// fd.run_one_step(&mut grid)?;
///
/// let receivers = grid.at_node().get::<i64>(FLOW_RECEIVER_NODE)?;
/// assert_eq!(receivers[4], 0);
/// # Ok::<(), landflow_core::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct FlowDirectorSteepestDescent {
    surface: Surface,
    number_of_nodes: usize,
    network: LinkNetwork,
    bc_set_code: u64,
    sink: Vec<usize>,
}

impl FlowDirectorSteepestDescent {
    pub const NAME: &'static str = "FlowDirectorSteepestDescent";

    /// Create a director for `grid` routing across `surface`.
    ///
    /// Fails with [`Error::UnsupportedGrid`] unless the grid is irregular.
    /// Creates the output fields on the grid if they are missing.
    pub fn new<G: ModelGrid>(grid: &mut G, surface: impl Into<Surface>) -> Result<Self> {
        let kind = grid.kind();
        if !kind.is_irregular() {
            return Err(Error::UnsupportedGrid {
                component: Self::NAME,
                kind,
            });
        }

        let mut director = Self {
            surface: surface.into(),
            number_of_nodes: grid.number_of_nodes(),
            network: LinkNetwork::default(),
            bc_set_code: grid.bc_set_code(),
            sink: Vec::new(),
        };
        director.elevs(&*grid)?;
        ensure_output_fields(grid)?;
        director.updated_boundary_conditions(&*grid);

        debug!(
            kind = %kind,
            nodes = director.number_of_nodes,
            active_links = director.network.active_links.len(),
            "created flow director"
        );
        Ok(director)
    }

    /// Routing method name
    pub fn method(&self) -> &'static str {
        "SteepestDescent"
    }

    /// The surface flow is directed across
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Current surface values on `grid`
    pub fn elevs<'a, G: ModelGrid>(&'a self, grid: &'a G) -> Result<&'a [f64]> {
        let values = match &self.surface {
            Surface::Values(values) => values.as_slice(),
            Surface::Field(name) => {
                let field = grid.at_node().get::<f64>(name)?;
                field
                    .as_slice()
                    .ok_or_else(|| Error::Algorithm(format!("field {name} is not contiguous")))?
            }
        };
        if values.len() != self.number_of_nodes {
            return Err(Error::SizeMismatch {
                what: "surface values",
                expected: self.number_of_nodes,
                actual: values.len(),
            });
        }
        Ok(values)
    }

    /// Sink nodes found by the most recent step, ascending
    pub fn sinks(&self) -> &[usize] {
        &self.sink
    }

    /// Re-read the active links and their end nodes from `grid`
    pub fn updated_boundary_conditions<G: ModelGrid>(&mut self, grid: &G) {
        let active = grid.active_links();
        let tail = grid.node_at_link_tail();
        let head = grid.node_at_link_head();
        self.network.tail_node = active.iter().map(|&l| tail[l]).collect();
        self.network.head_node = active.iter().map(|&l| head[l]).collect();
        self.network.active_links = active;
    }

    /// Run one step and return the receiver of every node
    pub fn direct_flow<G: ModelGrid>(&mut self, grid: &mut G) -> Result<Vec<usize>> {
        self.run_one_step(grid)?;
        Ok(grid
            .at_node()
            .get::<i64>(FLOW_RECEIVER_NODE)?
            .iter()
            .map(|&r| r as usize)
            .collect())
    }
}

impl Component for FlowDirectorSteepestDescent {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn field_info(&self) -> &'static [FieldInfo] {
        &FIELD_INFO
    }

    fn run_one_step<G: ModelGrid>(&mut self, grid: &mut G) -> Result<()> {
        if grid.number_of_nodes() != self.number_of_nodes {
            return Err(Error::SizeMismatch {
                what: "grid nodes",
                expected: self.number_of_nodes,
                actual: grid.number_of_nodes(),
            });
        }

        if self.bc_set_code != grid.bc_set_code() {
            self.updated_boundary_conditions(&*grid);
            self.bc_set_code = grid.bc_set_code();
            debug!(
                bc_set_code = self.bc_set_code,
                active_links = self.network.active_links.len(),
                "boundary conditions changed"
            );
        }

        let elevation = self.elevs(&*grid)?.to_vec();
        let link_slope = grid
            .calc_grad_of_active_link(&elevation)?
            .into_iter()
            .map(|g| -g)
            .collect();
        self.network.elevation = elevation;
        self.network.link_slope = link_slope;

        let baselevel_nodes: Vec<usize> = grid
            .status_at_node()
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s.is_base_level())
            .map(|(node, _)| node)
            .collect();

        let directions = flow_directions(&self.network, Some(baselevel_nodes.as_slice()))?;

        ensure_output_fields(grid)?;
        let fields = grid.at_node_mut();
        fields
            .get_mut::<i64>(FLOW_RECEIVER_NODE)?
            .assign(&directions.receiver.iter().map(|&r| r as i64).collect::<Array1<i64>>());
        fields
            .get_mut::<f64>(TOPOGRAPHIC_STEEPEST_SLOPE)?
            .assign(&Array1::from(directions.steepest_slope.clone()));
        fields
            .get_mut::<i64>(FLOW_LINK_TO_RECEIVER_NODE)?
            .assign(&Array1::from(directions.receiver_link_codes()));
        fields
            .get_mut::<bool>(FLOW_SINK_FLAG)?
            .assign(&Array1::from(directions.sink_flags()));

        debug!(sinks = directions.sink.len(), "directed flow");
        self.sink = directions.sink;
        Ok(())
    }
}

/// Add any missing output field with its "no flow" value
fn ensure_output_fields<G: ModelGrid>(grid: &mut G) -> Result<()> {
    let n = grid.number_of_nodes();
    let fields = grid.at_node_mut();
    if !fields.contains(FLOW_RECEIVER_NODE) {
        fields.add_field(FLOW_RECEIVER_NODE, (0..n as i64).collect::<Array1<i64>>())?;
    }
    if !fields.contains(TOPOGRAPHIC_STEEPEST_SLOPE) {
        fields.add_zeros::<f64>(TOPOGRAPHIC_STEEPEST_SLOPE)?;
    }
    if !fields.contains(FLOW_LINK_TO_RECEIVER_NODE) {
        fields.add_field(FLOW_LINK_TO_RECEIVER_NODE, Array1::from_elem(n, BAD_INDEX_VALUE))?;
    }
    if !fields.contains(FLOW_SINK_FLAG) {
        fields.add_zeros::<bool>(FLOW_SINK_FLAG)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use landflow_core::{NodeStatus, RasterModelGrid, VoronoiDelaunayGrid};

    fn tilted_hex() -> VoronoiDelaunayGrid {
        let mut grid = VoronoiDelaunayGrid::hex(5, 3, 1.0).unwrap();
        let z: Vec<f64> = grid
            .node_x()
            .iter()
            .zip(grid.node_y())
            .map(|(x, y)| x + y.round())
            .collect();
        grid.at_node_mut().add_field(TOPOGRAPHIC_ELEVATION, z).unwrap();
        grid
    }

    #[test]
    fn test_rejects_raster_grid() {
        let mut grid = RasterModelGrid::new(4, 5, 1.0).unwrap();
        grid.at_node_mut()
            .add_zeros::<f64>(TOPOGRAPHIC_ELEVATION)
            .unwrap();
        let err = FlowDirectorSteepestDescent::new(&mut grid, Surface::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedGrid {
                kind: landflow_core::GridKind::Raster,
                ..
            }
        ));
        // Nothing is written to a rejected grid
        assert!(!grid.at_node().contains(FLOW_RECEIVER_NODE));
    }

    #[test]
    fn test_creates_output_fields() {
        let mut grid = tilted_hex();
        FlowDirectorSteepestDescent::new(&mut grid, TOPOGRAPHIC_ELEVATION).unwrap();

        let fields = grid.at_node();
        let receivers = fields.get::<i64>(FLOW_RECEIVER_NODE).unwrap();
        assert_eq!(receivers[7], 7);
        let links = fields.get::<i64>(FLOW_LINK_TO_RECEIVER_NODE).unwrap();
        assert!(links.iter().all(|&l| l == BAD_INDEX_VALUE));
        assert!(fields.get::<bool>(FLOW_SINK_FLAG).unwrap().iter().all(|&f| !f));
        assert!(fields.contains(TOPOGRAPHIC_STEEPEST_SLOPE));
    }

    #[test]
    fn test_missing_surface_field() {
        let mut grid = VoronoiDelaunayGrid::hex(3, 2, 1.0).unwrap();
        let err = FlowDirectorSteepestDescent::new(&mut grid, "nope").unwrap_err();
        assert!(matches!(err, Error::FieldNotFound(ref n) if n == "nope"));
    }

    #[test]
    fn test_surface_array_wrong_length() {
        let mut grid = VoronoiDelaunayGrid::hex(3, 2, 1.0).unwrap();
        let err = FlowDirectorSteepestDescent::new(&mut grid, vec![0.0; 3]).unwrap_err();
        assert!(matches!(
            err,
            Error::SizeMismatch { expected: 7, actual: 3, .. }
        ));
    }

    #[test]
    fn test_surface_array() {
        let mut grid = VoronoiDelaunayGrid::hex(3, 2, 1.0).unwrap();
        // Core node 3 sits in the middle row; make node 0 the lowest neighbor
        let mut z = vec![10.0; 7];
        z[0] = 0.0;
        z[3] = 5.0;
        let mut fd = FlowDirectorSteepestDescent::new(&mut grid, z.clone()).unwrap();
        assert_eq!(fd.elevs(&grid).unwrap(), z.as_slice());
        assert_eq!(fd.surface(), &Surface::Values(z));

        let receivers = fd.direct_flow(&mut grid).unwrap();
        assert_eq!(receivers[3], 0);
        assert_eq!(fd.sinks(), &[0, 1, 2, 4, 5, 6]);
    }

    #[test]
    fn test_surface_field_read_each_step() {
        let mut grid = tilted_hex();
        let mut fd = FlowDirectorSteepestDescent::new(&mut grid, TOPOGRAPHIC_ELEVATION).unwrap();
        fd.run_one_step(&mut grid).unwrap();
        assert_eq!(grid.at_node().get::<i64>(FLOW_RECEIVER_NODE).unwrap()[9], 4);

        // Dig a hole at node 9; it becomes a pit
        grid.at_node_mut()
            .get_mut::<f64>(TOPOGRAPHIC_ELEVATION)
            .unwrap()[9] = -10.0;
        fd.run_one_step(&mut grid).unwrap();

        let receivers = grid.at_node().get::<i64>(FLOW_RECEIVER_NODE).unwrap();
        assert_eq!(receivers[9], 9);
        assert!(grid.at_node().get::<bool>(FLOW_SINK_FLAG).unwrap()[9]);
        assert!(fd.sinks().contains(&9));
    }

    #[test]
    fn test_boundary_change_is_picked_up() {
        let mut grid = tilted_hex();
        let mut fd = FlowDirectorSteepestDescent::new(&mut grid, TOPOGRAPHIC_ELEVATION).unwrap();
        fd.run_one_step(&mut grid).unwrap();
        assert_eq!(grid.at_node().get::<i64>(FLOW_RECEIVER_NODE).unwrap()[4], 0);

        // Close node 0: node 4 must now drain elsewhere
        grid.set_closed_nodes(&[0]).unwrap();
        fd.run_one_step(&mut grid).unwrap();

        let receivers = grid.at_node().get::<i64>(FLOW_RECEIVER_NODE).unwrap();
        assert_eq!(receivers[4], 3);
        assert_eq!(receivers[0], 0);
        let slope = grid.at_node().get::<f64>(TOPOGRAPHIC_STEEPEST_SLOPE).unwrap();
        assert!((slope[4] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_fixed_gradient_is_base_level() {
        let mut grid = tilted_hex();
        grid.set_status_at_node(8, NodeStatus::FixedGradient).unwrap();
        let mut fd = FlowDirectorSteepestDescent::new(&mut grid, TOPOGRAPHIC_ELEVATION).unwrap();
        fd.run_one_step(&mut grid).unwrap();

        let receivers = grid.at_node().get::<i64>(FLOW_RECEIVER_NODE).unwrap();
        assert_eq!(receivers[8], 8);
        let links = grid.at_node().get::<i64>(FLOW_LINK_TO_RECEIVER_NODE).unwrap();
        assert_eq!(links[8], BAD_INDEX_VALUE);
    }

    #[test]
    fn test_removed_output_field_is_rewritten() {
        let mut grid = tilted_hex();
        let mut fd = FlowDirectorSteepestDescent::new(&mut grid, TOPOGRAPHIC_ELEVATION).unwrap();
        fd.run_one_step(&mut grid).unwrap();

        grid.at_node_mut().remove(FLOW_SINK_FLAG).unwrap();
        fd.run_one_step(&mut grid).unwrap();

        let sink = grid.at_node().get::<bool>(FLOW_SINK_FLAG).unwrap();
        assert!(sink[0]);
        assert!(!sink[4]);
    }

    #[test]
    fn test_rejects_other_grid() {
        let mut grid = tilted_hex();
        let mut fd = FlowDirectorSteepestDescent::new(&mut grid, TOPOGRAPHIC_ELEVATION).unwrap();
        let mut small = VoronoiDelaunayGrid::hex(3, 2, 1.0).unwrap();
        assert!(matches!(
            fd.run_one_step(&mut small),
            Err(Error::SizeMismatch { what: "grid nodes", .. })
        ));
    }

    #[test]
    fn test_component_metadata() {
        let mut grid = tilted_hex();
        let fd = FlowDirectorSteepestDescent::new(&mut grid, TOPOGRAPHIC_ELEVATION).unwrap();
        assert_eq!(fd.name(), "FlowDirectorSteepestDescent");
        assert_eq!(fd.method(), "SteepestDescent");
        assert_eq!(fd.input_var_names(), vec![TOPOGRAPHIC_ELEVATION]);
        assert_eq!(fd.output_var_names().len(), 4);
        assert_eq!(fd.var_units(TOPOGRAPHIC_ELEVATION), Some("m"));
        assert!(fd.var_doc(FLOW_SINK_FLAG).is_some());
        assert_eq!(fd.var_units("unknown"), None);
    }
}

//! Structured (raster) model grids

use super::base::GridBase;
use super::{GridKind, ModelGrid, NodeStatus};
use crate::error::{Error, Result};

/// A grid of nodes on a regular rectangular lattice.
///
/// Node `row * cols + col` sits at `(col * spacing, row * spacing)`.
/// Links join horizontal and vertical neighbors; perimeter nodes start
/// as fixed value boundaries.
#[derive(Debug, Clone)]
pub struct RasterModelGrid {
    base: GridBase,
    shape: (usize, usize),
    spacing: f64,
}

impl RasterModelGrid {
    /// Create a raster grid with `rows` x `cols` nodes
    pub fn new(rows: usize, cols: usize, spacing: f64) -> Result<Self> {
        if rows < 2 || cols < 2 {
            return Err(Error::InvalidParameter {
                name: "shape",
                value: format!("{rows}x{cols}"),
                reason: "need at least 2 rows and 2 columns".into(),
            });
        }
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(Error::InvalidParameter {
                name: "spacing",
                value: spacing.to_string(),
                reason: "must be positive".into(),
            });
        }

        let n = rows * cols;
        let mut node_x = Vec::with_capacity(n);
        let mut node_y = Vec::with_capacity(n);
        let mut status = Vec::with_capacity(n);
        let mut edges = Vec::with_capacity(2 * n);

        for row in 0..rows {
            for col in 0..cols {
                let id = row * cols + col;
                node_x.push(col as f64 * spacing);
                node_y.push(row as f64 * spacing);
                let perimeter = row == 0 || col == 0 || row == rows - 1 || col == cols - 1;
                status.push(if perimeter {
                    NodeStatus::FixedValue
                } else {
                    NodeStatus::Core
                });
                if col + 1 < cols {
                    edges.push((id, id + 1));
                }
                if row + 1 < rows {
                    edges.push((id, id + cols));
                }
            }
        }

        Ok(Self {
            base: GridBase::from_edges(node_x, node_y, edges, status)?,
            shape: (rows, cols),
            spacing,
        })
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Distance between neighboring nodes
    pub fn spacing(&self) -> f64 {
        self.spacing
    }
}

impl ModelGrid for RasterModelGrid {
    fn kind(&self) -> GridKind {
        GridKind::Raster
    }

    fn base(&self) -> &GridBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GridBase {
        &mut self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_links() {
        let grid = RasterModelGrid::new(3, 4, 1.0).unwrap();
        assert_eq!(grid.shape(), (3, 4));
        assert_eq!(grid.number_of_nodes(), 12);
        // 3 rows of 3 horizontal links + 2 rows of 4 vertical links
        assert_eq!(grid.number_of_links(), 17);

        // Horizontal links of the bottom row come first, then the verticals above them
        assert_eq!(grid.node_at_link_tail()[..4], [0, 1, 2, 0]);
        assert_eq!(grid.node_at_link_head()[..4], [1, 2, 3, 4]);
        assert_eq!(grid.core_nodes(), vec![5, 6]);
    }

    #[test]
    fn test_raster_rejects_small_shape() {
        assert!(RasterModelGrid::new(1, 5, 1.0).is_err());
        assert!(RasterModelGrid::new(3, 3, 0.0).is_err());
    }
}

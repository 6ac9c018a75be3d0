//! Hexagonal model grids
//!
//! A hex grid is a Voronoi/Delaunay grid whose nodes sit on a regular
//! triangular lattice, so every cell is a regular hexagon. Rows run
//! horizontally; node ids go row by row from the bottom, left to right.
//!
//! ```text
//!       16  17  18
//!     12  13  14  15
//!    7   8   9  10  11
//!     3   4   5   6
//!       0   1   2
//! ```

use super::base::GridBase;
use super::voronoi::VoronoiDelaunayGrid;
use super::{GridKind, NodeStatus};
use crate::error::{Error, Result};
use tracing::debug;

impl VoronoiDelaunayGrid {
    /// Create a hexagon-shaped grid.
    ///
    /// The bottom and top rows hold `base_num_cols` nodes, each row one more
    /// toward the middle. Rows are `spacing * sqrt(3) / 2` apart and nodes
    /// within a row `spacing` apart. Perimeter nodes start as fixed value
    /// boundaries, the rest as core nodes.
    ///
    /// # Arguments
    /// * `num_rows` - Number of node rows (odd, at least 3)
    /// * `base_num_cols` - Nodes in the bottom row (at least 1)
    /// * `spacing` - Distance between neighboring nodes
    pub fn hex(num_rows: usize, base_num_cols: usize, spacing: f64) -> Result<Self> {
        if num_rows < 3 || num_rows % 2 == 0 {
            return Err(Error::InvalidParameter {
                name: "num_rows",
                value: num_rows.to_string(),
                reason: "must be odd and at least 3".into(),
            });
        }
        if base_num_cols == 0 {
            return Err(Error::InvalidParameter {
                name: "base_num_cols",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(Error::InvalidParameter {
                name: "spacing",
                value: spacing.to_string(),
                reason: "must be positive".into(),
            });
        }

        let dy = spacing * 3.0_f64.sqrt() / 2.0;
        let shift = |row: usize| row.min(num_rows - 1 - row);

        let mut row_start = Vec::with_capacity(num_rows);
        let mut node_x = Vec::new();
        let mut node_y = Vec::new();
        let mut status = Vec::new();

        for row in 0..num_rows {
            let k = shift(row);
            let len = base_num_cols + k;
            row_start.push(node_x.len());
            for col in 0..len {
                node_x.push((col as f64 - 0.5 * k as f64) * spacing);
                node_y.push(row as f64 * dy);
                let perimeter = row == 0 || row == num_rows - 1 || col == 0 || col == len - 1;
                status.push(if perimeter {
                    NodeStatus::FixedValue
                } else {
                    NodeStatus::Core
                });
            }
        }

        let row_len = |row: usize| base_num_cols + shift(row);
        let mut edges = Vec::new();
        for row in 0..num_rows {
            let start = row_start[row];
            let len = row_len(row);
            for col in 0..len.saturating_sub(1) {
                edges.push((start + col, start + col + 1));
            }
            if row + 1 == num_rows {
                continue;
            }

            let above = row_start[row + 1];
            let above_len = row_len(row + 1);
            for col in 0..len {
                if above_len > len {
                    // widening: up-left and up-right share this column and the next
                    edges.push((start + col, above + col));
                    edges.push((start + col, above + col + 1));
                } else {
                    if col >= 1 {
                        edges.push((start + col, above + col - 1));
                    }
                    if col < above_len {
                        edges.push((start + col, above + col));
                    }
                }
            }
        }

        let base = GridBase::from_edges(node_x, node_y, edges, status)?;
        debug!(
            nodes = base.number_of_nodes(),
            links = base.number_of_links(),
            "built hex grid"
        );
        Ok(Self::from_base(base, GridKind::Hex))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::ModelGrid;
    use approx::assert_relative_eq;

    #[test]
    fn test_hex_5_3_layout() {
        let grid = VoronoiDelaunayGrid::hex(5, 3, 1.0).unwrap();
        assert_eq!(grid.kind(), GridKind::Hex);
        assert_eq!(grid.number_of_nodes(), 19);
        assert_eq!(grid.number_of_links(), 42);

        let x = grid.node_x();
        assert_relative_eq!(x[3], -0.5);
        assert_relative_eq!(x[7], -1.0);
        assert_relative_eq!(x[11], 3.0);
        assert_relative_eq!(grid.node_y()[16], 2.0 * 3.0_f64.sqrt());
    }

    #[test]
    fn test_hex_5_3_core_nodes() {
        let grid = VoronoiDelaunayGrid::hex(5, 3, 1.0).unwrap();
        assert_eq!(grid.core_nodes(), vec![4, 5, 8, 9, 10, 13, 14]);
        assert_eq!(grid.boundary_nodes().len(), 12);
    }

    #[test]
    fn test_hex_link_numbering() {
        let grid = VoronoiDelaunayGrid::hex(5, 3, 1.0).unwrap();
        let tail = grid.node_at_link_tail();
        let head = grid.node_at_link_head();

        assert_eq!((tail[0], head[0]), (0, 1));
        assert_eq!((tail[3], head[3]), (0, 4));
        assert_eq!((tail[5], head[5]), (1, 5));
        assert_eq!((tail[12], head[12]), (3, 8));
        assert_eq!((tail[25], head[25]), (8, 13));
        assert_eq!((tail[41], head[41]), (17, 18));

        for &length in grid.length_of_link() {
            assert_relative_eq!(length, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_hex_node_degree() {
        let grid = VoronoiDelaunayGrid::hex(5, 3, 1.0).unwrap();
        let mut degree = vec![0; grid.number_of_nodes()];
        for (&t, &h) in grid.node_at_link_tail().iter().zip(grid.node_at_link_head()) {
            degree[t] += 1;
            degree[h] += 1;
        }
        for node in grid.core_nodes() {
            assert_eq!(degree[node], 6, "core node {node} should have 6 links");
        }
    }

    #[test]
    fn test_hex_invalid_shape() {
        assert!(VoronoiDelaunayGrid::hex(4, 3, 1.0).is_err());
        assert!(VoronoiDelaunayGrid::hex(1, 3, 1.0).is_err());
        assert!(VoronoiDelaunayGrid::hex(3, 0, 1.0).is_err());
        assert!(VoronoiDelaunayGrid::hex(3, 2, -1.0).is_err());
    }
}

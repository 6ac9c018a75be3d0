//! Voronoi/Delaunay grids on scattered points
//!
//! Nodes are the input points; links are the edges of their Delaunay
//! triangulation, built with an incremental Bowyer-Watson algorithm.
//! Nodes on the convex hull start as fixed value boundaries.

use super::base::GridBase;
use super::{check_node_array, GridKind, ModelGrid, NodeStatus};
use crate::error::{Error, Result};
use std::collections::HashMap;
use tracing::debug;

/// An irregular grid whose cells are the Voronoi polygons of its nodes.
#[derive(Debug, Clone)]
pub struct VoronoiDelaunayGrid {
    base: GridBase,
    kind: GridKind,
}

impl VoronoiDelaunayGrid {
    /// Triangulate the points `(x[i], y[i])` into a grid.
    ///
    /// Requires at least 3 distinct, finite, non-collinear points.
    pub fn new(x: &[f64], y: &[f64]) -> Result<Self> {
        check_node_array(x.len(), y.len(), "node y coordinates")?;
        if x.len() < 3 {
            return Err(Error::InvalidParameter {
                name: "points",
                value: x.len().to_string(),
                reason: "need at least 3 points".into(),
            });
        }
        if let Some(i) = (0..x.len()).find(|&i| !x[i].is_finite() || !y[i].is_finite()) {
            return Err(Error::InvalidParameter {
                name: "points",
                value: format!("({}, {})", x[i], y[i]),
                reason: "coordinates must be finite".into(),
            });
        }
        let mut order: Vec<usize> = (0..x.len()).collect();
        order.sort_by(|&a, &b| x[a].total_cmp(&x[b]).then(y[a].total_cmp(&y[b])));
        if let Some(w) = order.windows(2).find(|w| x[w[0]] == x[w[1]] && y[w[0]] == y[w[1]]) {
            return Err(Error::InvalidParameter {
                name: "points",
                value: format!("({}, {})", x[w[1]], y[w[1]]),
                reason: "duplicate point".into(),
            });
        }

        let triangles = delaunay(x, y);
        if triangles.is_empty() {
            return Err(Error::Algorithm(
                "Failed to build triangulation (collinear points?)".into(),
            ));
        }

        // Hull edges belong to exactly one triangle
        let mut edge_count: HashMap<(usize, usize), u8> = HashMap::new();
        for tri in &triangles {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                *edge_count.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        let mut status = vec![NodeStatus::Core; x.len()];
        for (&(a, b), &count) in &edge_count {
            if count == 1 {
                status[a] = NodeStatus::FixedValue;
                status[b] = NodeStatus::FixedValue;
            }
        }

        let base = GridBase::from_edges(x.to_vec(), y.to_vec(), edge_count.into_keys(), status)?;
        debug!(
            nodes = base.number_of_nodes(),
            links = base.number_of_links(),
            triangles = triangles.len(),
            "built Voronoi grid"
        );
        Ok(Self::from_base(base, GridKind::Voronoi))
    }

    pub(super) fn from_base(base: GridBase, kind: GridKind) -> Self {
        Self { base, kind }
    }
}

impl ModelGrid for VoronoiDelaunayGrid {
    fn kind(&self) -> GridKind {
        self.kind
    }

    fn base(&self) -> &GridBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GridBase {
        &mut self.base
    }
}

/// Circumcircle of a triangle
#[derive(Debug, Clone, Copy)]
struct Circumcircle {
    cx: f64,
    cy: f64,
    radius_sq: f64,
}

/// Compute the circumcircle of three points
fn circumcircle(p0: (f64, f64), p1: (f64, f64), p2: (f64, f64)) -> Option<Circumcircle> {
    let (ax, ay) = p0;
    let (bx, by) = p1;
    let (cx, cy) = p2;

    let d = 2.0 * (ax * (by - cy) + bx * (cy - ay) + cx * (ay - by));
    if d.abs() < 1e-12 {
        return None; // Degenerate triangle
    }

    let ux = ((ax * ax + ay * ay) * (by - cy)
        + (bx * bx + by * by) * (cy - ay)
        + (cx * cx + cy * cy) * (ay - by))
        / d;

    let uy = ((ax * ax + ay * ay) * (cx - bx)
        + (bx * bx + by * by) * (ax - cx)
        + (cx * cx + cy * cy) * (bx - ax))
        / d;

    let dx = ax - ux;
    let dy = ay - uy;

    Some(Circumcircle {
        cx: ux,
        cy: uy,
        radius_sq: dx * dx + dy * dy,
    })
}

/// Build Delaunay triangulation using Bowyer-Watson algorithm
fn delaunay(x: &[f64], y: &[f64]) -> Vec<[usize; 3]> {
    let mut min_x = f64::MAX;
    let mut min_y = f64::MAX;
    let mut max_x = f64::MIN;
    let mut max_y = f64::MIN;

    for (&px, &py) in x.iter().zip(y) {
        min_x = min_x.min(px);
        min_y = min_y.min(py);
        max_x = max_x.max(px);
        max_y = max_y.max(py);
    }

    let dx = max_x - min_x;
    let dy = max_y - min_y;
    let delta = dx.max(dy).max(1.0);

    // Super-triangle vertices take indices 0, 1, 2
    let mut vertices: Vec<(f64, f64)> = vec![
        (min_x - 10.0 * delta, min_y - delta),
        (min_x + 0.5 * dx, max_y + 10.0 * delta),
        (max_x + 10.0 * delta, min_y - delta),
    ];

    let mut triangles: Vec<[usize; 3]> = vec![[0, 1, 2]];

    for (&px, &py) in x.iter().zip(y) {
        let vi = vertices.len();
        vertices.push((px, py));

        // Triangles whose circumcircle contains the new point
        let bad_triangles: Vec<usize> = triangles
            .iter()
            .enumerate()
            .filter(|(_, tri)| {
                circumcircle(vertices[tri[0]], vertices[tri[1]], vertices[tri[2]]).is_some_and(
                    |cc| {
                        let dx = px - cc.cx;
                        let dy = py - cc.cy;
                        dx * dx + dy * dy <= cc.radius_sq
                    },
                )
            })
            .map(|(ti, _)| ti)
            .collect();

        // Boundary polygon of the hole: edges not shared by two bad triangles
        let mut boundary: Vec<(usize, usize)> = Vec::new();
        for &bi in &bad_triangles {
            let tri = triangles[bi];
            for (ea, eb) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let shared = bad_triangles.iter().any(|&oi| {
                    oi != bi && {
                        let other = triangles[oi];
                        [(other[0], other[1]), (other[1], other[2]), (other[2], other[0])]
                            .iter()
                            .any(|&(oa, ob)| (oa == ea && ob == eb) || (oa == eb && ob == ea))
                    }
                });
                if !shared {
                    boundary.push((ea, eb));
                }
            }
        }

        // Remove in reverse order so swap_remove keeps the remaining indices valid
        let mut bad_triangles = bad_triangles;
        bad_triangles.sort_unstable_by(|a, b| b.cmp(a));
        for bi in bad_triangles {
            triangles.swap_remove(bi);
        }

        for (ea, eb) in boundary {
            triangles.push([ea, eb, vi]);
        }
    }

    // Drop triangles touching the super-triangle and shift indices back
    triangles
        .into_iter()
        .filter(|tri| tri.iter().all(|&v| v >= 3))
        .filter(|tri| {
            circumcircle(vertices[tri[0]], vertices[tri[1]], vertices[tri[2]]).is_some()
        })
        .map(|tri| [tri[0] - 3, tri[1] - 3, tri[2] - 3])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delaunay_square() {
        let x = [0.0, 10.0, 0.0, 10.0];
        let y = [10.0, 10.0, 0.0, 0.0];
        let tris = delaunay(&x, &y);
        assert_eq!(tris.len(), 2, "Expected 2 triangles, got {}", tris.len());
    }

    #[test]
    fn test_square_with_center() {
        let x = [0.0, 2.0, 0.0, 2.0, 1.0];
        let y = [0.0, 0.0, 2.0, 2.0, 1.0];
        let grid = VoronoiDelaunayGrid::new(&x, &y).unwrap();

        assert_eq!(grid.kind(), GridKind::Voronoi);
        assert_eq!(grid.number_of_nodes(), 5);
        // 4 hull edges + 4 spokes to the center
        assert_eq!(grid.number_of_links(), 8);
        assert_eq!(grid.core_nodes(), vec![4]);
        assert_eq!(grid.active_links().len(), 4);
    }

    #[test]
    fn test_links_join_triangle_vertices() {
        let x = [0.0, 3.0, 1.0, 4.0, 2.0, 0.5];
        let y = [0.0, 0.2, 2.0, 2.5, 4.0, 3.5];
        let grid = VoronoiDelaunayGrid::new(&x, &y).unwrap();

        // Planar triangulation: E <= 3V - 6
        assert!(grid.number_of_links() <= 3 * 6 - 6);
        for (&t, &h) in grid.node_at_link_tail().iter().zip(grid.node_at_link_head()) {
            assert!(t < 6 && h < 6 && t != h);
            let up_right = y[h] > y[t] || (y[h] == y[t] && x[h] > x[t]);
            assert!(up_right, "link {t}->{h} should point up and right");
        }
    }

    #[test]
    fn test_rejects_bad_points() {
        assert!(VoronoiDelaunayGrid::new(&[0.0, 1.0], &[0.0, 1.0]).is_err());
        assert!(VoronoiDelaunayGrid::new(&[0.0, 1.0, 2.0], &[0.0, 1.0]).is_err());
        assert!(VoronoiDelaunayGrid::new(&[0.0, 1.0, 0.0], &[0.0, 0.0, 0.0]).is_err());
        assert!(matches!(
            VoronoiDelaunayGrid::new(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0]),
            Err(Error::Algorithm(_))
        ));
        assert!(VoronoiDelaunayGrid::new(&[0.0, f64::NAN, 2.0], &[0.0, 1.0, 0.0]).is_err());
    }
}

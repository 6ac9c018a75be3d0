//! Node and link storage shared by every grid type

use super::fields::NodeFields;
use super::{check_node_array, NodeStatus};
use crate::error::{Error, Result};
use crate::maybe_rayon::*;
use std::cmp::Ordering;

/// Nodes, links, boundary status and node fields of a grid.
///
/// Links are numbered by midpoint, sorted by y and then x. Every link
/// points "up and right": its head has the larger y, or the same y and
/// the larger x.
#[derive(Debug, Clone)]
pub struct GridBase {
    node_x: Vec<f64>,
    node_y: Vec<f64>,
    link_tail: Vec<usize>,
    link_head: Vec<usize>,
    link_length: Vec<f64>,
    status_at_node: Vec<NodeStatus>,
    bc_set_code: u64,
    fields: NodeFields,
}

impl GridBase {
    /// Build from node coordinates, undirected node pairs and initial status.
    ///
    /// Duplicate pairs are merged. Pairs are oriented and sorted into the
    /// canonical link order.
    pub fn from_edges(
        node_x: Vec<f64>,
        node_y: Vec<f64>,
        edges: impl IntoIterator<Item = (usize, usize)>,
        status_at_node: Vec<NodeStatus>,
    ) -> Result<Self> {
        let n = node_x.len();
        check_node_array(n, node_y.len(), "node y coordinates")?;
        check_node_array(n, status_at_node.len(), "node status")?;

        let mut links: Vec<(usize, usize)> = Vec::new();
        for (a, b) in edges {
            for node in [a, b] {
                if node >= n {
                    return Err(Error::IndexOutOfBounds { index: node, len: n });
                }
            }
            if a == b {
                return Err(Error::InvalidParameter {
                    name: "edge",
                    value: format!("({a}, {b})"),
                    reason: "a link must join two different nodes".into(),
                });
            }
            let a_first = match node_y[a].total_cmp(&node_y[b]) {
                Ordering::Less => true,
                Ordering::Greater => false,
                Ordering::Equal => node_x[a] < node_x[b],
            };
            links.push(if a_first { (a, b) } else { (b, a) });
        }
        links.sort_unstable();
        links.dedup();

        let midpoint = |&(t, h): &(usize, usize)| {
            ((node_y[t] + node_y[h]) * 0.5, (node_x[t] + node_x[h]) * 0.5)
        };
        links.sort_by(|a, b| {
            let (ay, ax) = midpoint(a);
            let (by, bx) = midpoint(b);
            ay.total_cmp(&by).then(ax.total_cmp(&bx))
        });

        let mut link_length = Vec::with_capacity(links.len());
        for &(t, h) in &links {
            let length = (node_x[h] - node_x[t]).hypot(node_y[h] - node_y[t]);
            if length.is_nan() || length <= 0.0 {
                return Err(Error::InvalidParameter {
                    name: "edge",
                    value: format!("({t}, {h})"),
                    reason: "nodes of a link must not coincide".into(),
                });
            }
            link_length.push(length);
        }

        Ok(Self {
            link_tail: links.iter().map(|&(t, _)| t).collect(),
            link_head: links.iter().map(|&(_, h)| h).collect(),
            link_length,
            status_at_node,
            bc_set_code: 0,
            fields: NodeFields::new(n),
            node_x,
            node_y,
        })
    }

    pub fn number_of_nodes(&self) -> usize {
        self.node_x.len()
    }

    pub fn number_of_links(&self) -> usize {
        self.link_tail.len()
    }

    pub fn node_x(&self) -> &[f64] {
        &self.node_x
    }

    pub fn node_y(&self) -> &[f64] {
        &self.node_y
    }

    pub fn node_at_link_tail(&self) -> &[usize] {
        &self.link_tail
    }

    pub fn node_at_link_head(&self) -> &[usize] {
        &self.link_head
    }

    pub fn length_of_link(&self) -> &[f64] {
        &self.link_length
    }

    pub fn status_at_node(&self) -> &[NodeStatus] {
        &self.status_at_node
    }

    pub fn bc_set_code(&self) -> u64 {
        self.bc_set_code
    }

    pub fn fields(&self) -> &NodeFields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut NodeFields {
        &mut self.fields
    }

    /// Set the status of `nodes`, bumping the boundary condition code.
    pub fn set_status(&mut self, nodes: &[usize], status: NodeStatus) -> Result<()> {
        let len = self.number_of_nodes();
        if let Some(&index) = nodes.iter().find(|&&node| node >= len) {
            return Err(Error::IndexOutOfBounds { index, len });
        }
        for &node in nodes {
            self.status_at_node[node] = status;
        }
        self.bc_set_code = self.bc_set_code.wrapping_add(1);
        Ok(())
    }

    /// Gradient of node `values` along the given links
    pub(crate) fn grad_along(&self, values: &[f64], links: &[usize]) -> Result<Vec<f64>> {
        check_node_array(self.number_of_nodes(), values.len(), "node values")?;
        let nlinks = self.number_of_links();
        if let Some(&index) = links.iter().find(|&&l| l >= nlinks) {
            return Err(Error::IndexOutOfBounds { index, len: nlinks });
        }

        let tail = &self.link_tail;
        let head = &self.link_head;
        let length = &self.link_length;
        Ok(links
            .to_vec()
            .into_par_iter()
            .map(|l| (values[head[l]] - values[tail[l]]) / length[l])
            .collect())
    }
}

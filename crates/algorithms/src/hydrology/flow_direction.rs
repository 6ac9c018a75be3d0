//! Steepest-descent flow directions over a link network
//!
//! Each node sends its flow to the neighbor reached by the steepest
//! downhill active link. Nodes without a downhill link, and base-level
//! nodes, receive their own flow and are reported as sinks.

use landflow_core::{Algorithm, Error, Result, BAD_INDEX_VALUE};

/// Links and slopes that flow directions are computed over.
///
/// `tail_node[i]`, `head_node[i]` and `link_slope[i]` describe the link
/// `active_links[i]`. A positive slope means the tail is higher than the
/// head.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkNetwork {
    pub elevation: Vec<f64>,
    pub active_links: Vec<usize>,
    pub tail_node: Vec<usize>,
    pub head_node: Vec<usize>,
    pub link_slope: Vec<f64>,
}

/// Parameters for flow directions
#[derive(Debug, Clone, Default)]
pub struct FlowDirectionParams {
    /// Nodes that always drain to themselves (fixed value or gradient boundaries)
    pub baselevel_nodes: Option<Vec<usize>>,
}

/// Per-node result of steepest-descent routing.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowDirections {
    /// Receiver of each node; a node's own id when it has none
    pub receiver: Vec<usize>,
    /// Slope toward the receiver, zero for sinks
    pub steepest_slope: Vec<f64>,
    /// Ids of nodes that are their own receivers, ascending
    pub sink: Vec<usize>,
    /// Link toward the receiver, if any
    pub receiver_link: Vec<Option<usize>>,
}

impl FlowDirections {
    /// Receiver links as integers, with `BAD_INDEX_VALUE` where there is none
    pub fn receiver_link_codes(&self) -> Vec<i64> {
        self.receiver_link
            .iter()
            .map(|l| l.map_or(BAD_INDEX_VALUE, |l| l as i64))
            .collect()
    }

    /// Sink flag for every node
    pub fn sink_flags(&self) -> Vec<bool> {
        let mut flags = vec![false; self.receiver.len()];
        for &s in &self.sink {
            flags[s] = true;
        }
        flags
    }
}

/// Steepest-descent flow direction algorithm
#[derive(Debug, Clone, Default)]
pub struct SteepestDescent;

impl Algorithm for SteepestDescent {
    type Input = LinkNetwork;
    type Output = FlowDirections;
    type Params = FlowDirectionParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Flow Directions (steepest descent)"
    }

    fn description(&self) -> &'static str {
        "Route each node to the neighbor across its steepest downhill link"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        flow_directions(&input, params.baselevel_nodes.as_deref())
    }
}

/// Find the steepest downhill receiver of every node.
///
/// Links are visited in the order given. For each link the higher end is
/// the potential donor and the lower end the potential receiver; the
/// donor takes the link if it is strictly steeper than the best found so
/// far, so ties keep the first link. Base-level nodes are then reset to
/// drain to themselves with zero slope.
///
/// # Arguments
/// * `network` - Elevations plus the active links and their slopes
/// * `baselevel_nodes` - Nodes forced to be their own receivers
///
/// # Returns
/// Receivers, slopes, sinks and receiver links for every node
pub fn flow_directions(
    network: &LinkNetwork,
    baselevel_nodes: Option<&[usize]>,
) -> Result<FlowDirections> {
    let elev = &network.elevation;
    let num_nodes = elev.len();
    let num_links = network.active_links.len();

    for (what, actual) in [
        ("link tail nodes", network.tail_node.len()),
        ("link head nodes", network.head_node.len()),
        ("link slopes", network.link_slope.len()),
    ] {
        if actual != num_links {
            return Err(Error::SizeMismatch {
                what,
                expected: num_links,
                actual,
            });
        }
    }
    let out_of_range = network
        .tail_node
        .iter()
        .chain(&network.head_node)
        .chain(baselevel_nodes.unwrap_or(&[]))
        .find(|&&node| node >= num_nodes);
    if let Some(&index) = out_of_range {
        return Err(Error::IndexOutOfBounds {
            index,
            len: num_nodes,
        });
    }

    let mut receiver: Vec<usize> = (0..num_nodes).collect();
    let mut steepest_slope = vec![0.0_f64; num_nodes];
    let mut receiver_link: Vec<Option<usize>> = vec![None; num_nodes];

    for i in 0..num_links {
        let f = network.tail_node[i];
        let t = network.head_node[i];
        let slope = network.link_slope[i];

        if elev[f] > elev[t] && slope > steepest_slope[f] {
            receiver[f] = t;
            steepest_slope[f] = slope;
            receiver_link[f] = Some(network.active_links[i]);
        } else if elev[t] > elev[f] && -slope > steepest_slope[t] {
            receiver[t] = f;
            steepest_slope[t] = -slope;
            receiver_link[t] = Some(network.active_links[i]);
        }
    }

    for &node in baselevel_nodes.unwrap_or(&[]) {
        receiver[node] = node;
        receiver_link[node] = None;
        steepest_slope[node] = 0.0;
    }

    let sink = receiver
        .iter()
        .enumerate()
        .filter(|&(node, &r)| node == r)
        .map(|(node, _)| node)
        .collect();

    Ok(FlowDirections {
        receiver,
        steepest_slope,
        sink,
        receiver_link,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Three nodes in a row, 1 m apart: 0 -- 1 -- 2
    fn chain(elevation: &[f64]) -> (Vec<usize>, Vec<usize>, Vec<f64>) {
        let tail = vec![0, 1];
        let head = vec![1, 2];
        let slope = tail
            .iter()
            .zip(&head)
            .map(|(&t, &h)| elevation[t] - elevation[h])
            .collect();
        (tail, head, slope)
    }

    #[test]
    fn test_downhill_chain() {
        let elev = [3.0, 2.0, 0.0];
        let (tail, head, slope) = chain(&elev);
        let result = flow_directions(
            &LinkNetwork {
                elevation: elev.to_vec(),
                active_links: vec![0, 1],
                tail_node: tail,
                head_node: head,
                link_slope: slope,
            },
            None,
        )
        .unwrap();

        assert_eq!(result.receiver, vec![1, 2, 2]);
        assert_eq!(result.steepest_slope, vec![1.0, 2.0, 0.0]);
        assert_eq!(result.receiver_link, vec![Some(0), Some(1), None]);
        assert_eq!(result.sink, vec![2]);
        assert_eq!(result.receiver_link_codes(), vec![0, 1, -1]);
        assert_eq!(result.sink_flags(), vec![false, false, true]);
    }

    #[test]
    fn test_uphill_link_reversed() {
        // Flow runs head to tail when the head is higher
        let elev = [0.0, 2.0, 5.0];
        let (tail, head, slope) = chain(&elev);
        let result = flow_directions(
            &LinkNetwork {
                elevation: elev.to_vec(),
                active_links: vec![0, 1],
                tail_node: tail,
                head_node: head,
                link_slope: slope,
            },
            None,
        )
        .unwrap();

        assert_eq!(result.receiver, vec![0, 0, 1]);
        assert_eq!(result.steepest_slope, vec![0.0, 2.0, 3.0]);
        assert_eq!(result.sink, vec![0]);
    }

    #[test]
    fn test_pit_is_sink() {
        let elev = [5.0, 1.0, 5.0];
        let (tail, head, slope) = chain(&elev);
        let result = flow_directions(
            &LinkNetwork {
                elevation: elev.to_vec(),
                active_links: vec![0, 1],
                tail_node: tail,
                head_node: head,
                link_slope: slope,
            },
            None,
        )
        .unwrap();

        assert_eq!(result.receiver, vec![1, 1, 1]);
        assert_eq!(result.sink, vec![1]);
    }

    #[test]
    fn test_flat_has_no_receiver() {
        let elev = [1.0, 1.0, 1.0];
        let (tail, head, slope) = chain(&elev);
        let result = flow_directions(
            &LinkNetwork {
                elevation: elev.to_vec(),
                active_links: vec![0, 1],
                tail_node: tail,
                head_node: head,
                link_slope: slope,
            },
            None,
        )
        .unwrap();

        assert_eq!(result.sink, vec![0, 1, 2]);
    }

    #[test]
    fn test_tie_keeps_first_link() {
        // Node 1 is equally high above nodes 0 and 2
        let elev = [0.0, 1.0, 0.0];
        let (tail, head, slope) = chain(&elev);
        let result = flow_directions(
            &LinkNetwork {
                elevation: elev.to_vec(),
                active_links: vec![7, 9],
                tail_node: tail,
                head_node: head,
                link_slope: slope,
            },
            None,
        )
        .unwrap();

        assert_eq!(result.receiver[1], 0);
        assert_eq!(result.receiver_link[1], Some(7));
    }

    #[test]
    fn test_baselevel_overrides_receiver() {
        let elev = [3.0, 2.0, 0.0];
        let (tail, head, slope) = chain(&elev);
        let result = SteepestDescent
            .execute(
                LinkNetwork {
                    elevation: elev.to_vec(),
                    active_links: vec![0, 1],
                    tail_node: tail,
                    head_node: head,
                    link_slope: slope,
                },
                FlowDirectionParams {
                    baselevel_nodes: Some(vec![1]),
                },
            )
            .unwrap();

        assert_eq!(result.receiver, vec![1, 1, 2]);
        assert_eq!(result.steepest_slope, vec![1.0, 0.0, 0.0]);
        assert_eq!(result.receiver_link[1], None);
        assert_eq!(result.sink, vec![1, 2]);
    }

    #[test]
    fn test_mismatched_lengths() {
        let elev = [3.0, 2.0, 0.0];
        let err = flow_directions(
            &LinkNetwork {
                elevation: elev.to_vec(),
                active_links: vec![0, 1],
                tail_node: vec![0, 1],
                head_node: vec![1, 2],
                link_slope: vec![1.0],
            },
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::SizeMismatch { expected: 2, actual: 1, .. }
        ));
    }

    #[test]
    fn test_node_out_of_range() {
        let elev = [3.0, 2.0];
        let err = flow_directions(
            &LinkNetwork {
                elevation: elev.to_vec(),
                active_links: vec![0],
                tail_node: vec![0],
                head_node: vec![1],
                link_slope: vec![1.0],
            },
            Some(&[4][..]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::IndexOutOfBounds { index: 4, len: 2 }));
    }
}

//! Flow accumulation algorithm
//!
//! Totals a per-node weight (cell area, runoff, or just 1) down the
//! receiver tree produced by a flow director. Each node's total is its own
//! weight plus the totals of every node that drains to it.

use landflow_core::{Algorithm, Error, Result};

/// Parameters for flow accumulation
#[derive(Debug, Clone, Default)]
pub struct FlowAccumulationParams {
    /// Weight contributed by each node; 1 everywhere when `None`
    pub weights: Option<Vec<f64>>,
}

/// Flow accumulation algorithm
#[derive(Debug, Clone, Default)]
pub struct FlowAccumulation;

impl Algorithm for FlowAccumulation {
    type Input = Vec<usize>;
    type Output = Vec<f64>;
    type Params = FlowAccumulationParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Flow Accumulation"
    }

    fn description(&self) -> &'static str {
        "Total node weights down the steepest-descent receiver tree"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        flow_accumulation(&input, params.weights.as_deref())
    }
}

/// Accumulate weights from donors to receivers.
///
/// # Algorithm
/// 1. Count donors for each node (in-degree), ignoring self-receivers
/// 2. Start from nodes with no donors (headwaters)
/// 3. Propagate downstream, adding each node's total to its receiver
///
/// # Arguments
/// * `receivers` - Receiver of each node; a node is an outlet if it is its own receiver
/// * `weights` - Weight of each node, 1 when `None`
///
/// # Returns
/// Accumulated total at every node
///
/// # Errors
/// [`Error::IndexOutOfBounds`] if a receiver is not a node, and
/// [`Error::Algorithm`] if the receivers contain a cycle.
pub fn flow_accumulation(receivers: &[usize], weights: Option<&[f64]>) -> Result<Vec<f64>> {
    let n = receivers.len();
    let mut accumulation = match weights {
        Some(w) if w.len() != n => {
            return Err(Error::SizeMismatch {
                what: "weights",
                expected: n,
                actual: w.len(),
            })
        }
        Some(w) => w.to_vec(),
        None => vec![1.0; n],
    };

    let mut in_degree = vec![0u32; n];
    for (node, &r) in receivers.iter().enumerate() {
        if r >= n {
            return Err(Error::IndexOutOfBounds { index: r, len: n });
        }
        if r != node {
            in_degree[r] += 1;
        }
    }

    let mut queue: Vec<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut processed = 0usize;

    while let Some(node) = queue.pop() {
        processed += 1;
        let r = receivers[node];
        if r == node {
            continue;
        }

        accumulation[r] += accumulation[node];
        in_degree[r] -= 1;
        if in_degree[r] == 0 {
            queue.push(r);
        }
    }

    if processed < n {
        return Err(Error::Algorithm(format!(
            "receivers contain a cycle through {} nodes",
            n - processed
        )));
    }

    Ok(accumulation)
}

//! Routing report: the director's output fields in one serialisable value

use super::flow_director::{
    FLOW_LINK_TO_RECEIVER_NODE, FLOW_RECEIVER_NODE, FLOW_SINK_FLAG, TOPOGRAPHIC_STEEPEST_SLOPE,
};
use landflow_core::{ModelGrid, Result, BAD_INDEX_VALUE};
use serde::{Deserialize, Serialize};

/// Output of a flow-routing step, read back from the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowReport {
    pub number_of_nodes: usize,
    pub number_of_core_nodes: usize,
    pub number_of_active_links: usize,
    pub number_of_sinks: usize,
    /// Core nodes with no downhill neighbor
    pub number_of_pits: usize,
    #[serde(rename = "flow__receiver_node")]
    pub receiver: Vec<i64>,
    #[serde(rename = "topographic__steepest_slope")]
    pub steepest_slope: Vec<f64>,
    #[serde(rename = "flow__link_to_receiver_node")]
    pub link_to_receiver: Vec<i64>,
    #[serde(rename = "flow__sink_flag")]
    pub sink_flag: Vec<bool>,
    /// Upstream totals, if accumulation was run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drainage: Option<Vec<f64>>,
}

impl FlowReport {
    /// Collect the output fields from a grid a director has run on
    pub fn from_grid<G: ModelGrid>(grid: &G) -> Result<Self> {
        let fields = grid.at_node();
        let receiver = fields.get::<i64>(FLOW_RECEIVER_NODE)?.to_vec();
        let steepest_slope = fields.get::<f64>(TOPOGRAPHIC_STEEPEST_SLOPE)?.to_vec();
        let link_to_receiver = fields.get::<i64>(FLOW_LINK_TO_RECEIVER_NODE)?.to_vec();
        let sink_flag = fields.get::<bool>(FLOW_SINK_FLAG)?.to_vec();

        let core = grid.core_nodes();
        let number_of_pits = core
            .iter()
            .filter(|&&n| link_to_receiver[n] == BAD_INDEX_VALUE)
            .count();

        Ok(Self {
            number_of_nodes: grid.number_of_nodes(),
            number_of_core_nodes: core.len(),
            number_of_active_links: grid.active_links().len(),
            number_of_sinks: sink_flag.iter().filter(|&&s| s).count(),
            number_of_pits,
            receiver,
            steepest_slope,
            link_to_receiver,
            sink_flag,
            drainage: None,
        })
    }

    /// Attach accumulated drainage totals
    pub fn with_drainage(mut self, drainage: Vec<f64>) -> Self {
        self.drainage = Some(drainage);
        self
    }

    /// Receivers as node ids
    pub fn receivers(&self) -> Vec<usize> {
        self.receiver.iter().map(|&r| r as usize).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrology::{flow_accumulation, FlowDirectorSteepestDescent};
    use landflow_core::{Component, Error, VoronoiDelaunayGrid};

    #[test]
    fn test_report_requires_routed_grid() {
        let grid = VoronoiDelaunayGrid::hex(3, 2, 1.0).unwrap();
        assert!(matches!(
            FlowReport::from_grid(&grid),
            Err(Error::FieldNotFound(_))
        ));
    }

    #[test]
    fn test_report_counts() {
        let mut grid = VoronoiDelaunayGrid::hex(3, 2, 1.0).unwrap();
        let mut z = vec![10.0; 7];
        z[0] = 0.0;
        z[3] = 5.0;
        let mut fd = FlowDirectorSteepestDescent::new(&mut grid, z).unwrap();
        fd.run_one_step(&mut grid).unwrap();

        let report = FlowReport::from_grid(&grid).unwrap();
        assert_eq!(report.number_of_nodes, 7);
        assert_eq!(report.number_of_core_nodes, 1);
        assert_eq!(report.number_of_active_links, 6);
        assert_eq!(report.number_of_sinks, 6);
        assert_eq!(report.number_of_pits, 0);

        let drainage = flow_accumulation(&report.receivers(), None).unwrap();
        let report = report.with_drainage(drainage);
        assert_eq!(report.drainage.as_ref().unwrap()[0], 2.0);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["flow__receiver_node"][3], 0);
        assert_eq!(json["flow__sink_flag"][3], false);
    }
}

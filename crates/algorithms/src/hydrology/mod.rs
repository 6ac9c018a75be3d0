//! Hydrological analysis on model grids
//!
//! - Flow directions: steepest descent over a network of active links
//! - Flow director: component writing receivers, slopes, links and sinks
//!   onto an irregular grid
//! - Flow accumulation: upstream totals down the receiver tree
//! - Report: the routing outputs collected for serialisation

pub(crate) mod flow_accumulation;
pub(crate) mod flow_direction;
mod flow_director;
mod report;

pub use flow_accumulation::{flow_accumulation, FlowAccumulation, FlowAccumulationParams};
pub use flow_direction::{
    flow_directions, FlowDirectionParams, FlowDirections, LinkNetwork, SteepestDescent,
};
pub use flow_director::{
    FlowDirectorSteepestDescent, Surface, FLOW_LINK_TO_RECEIVER_NODE, FLOW_RECEIVER_NODE,
    FLOW_SINK_FLAG, TOPOGRAPHIC_ELEVATION, TOPOGRAPHIC_STEEPEST_SLOPE,
};
pub use report::FlowReport;

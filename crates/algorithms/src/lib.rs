//! # Landflow Algorithms
//!
//! Flow-routing algorithms and components for Landflow.
//!
//! ## Available Algorithm Categories
//!
//! - **hydrology**: steepest-descent flow directions, the flow director
//!   component for irregular grids, flow accumulation

pub mod hydrology;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::hydrology::{
        flow_accumulation, flow_directions, FlowAccumulation, FlowDirectorSteepestDescent,
        FlowDirections, FlowReport, LinkNetwork, SteepestDescent, Surface,
    };
    pub use landflow_core::prelude::*;
}

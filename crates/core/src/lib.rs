//! # Landflow Core
//!
//! Core types, traits and I/O for the Landflow flow-routing toolkit.
//!
//! This crate provides:
//! - `ModelGrid`: the grid interface components work against
//! - `VoronoiDelaunayGrid`: irregular grids, including hexagonal ones
//! - `RasterModelGrid`: structured grids
//! - `NodeFields`: named per-node arrays
//! - Algorithm and component traits for consistent API
//! - I/O for JSON mesh documents

pub mod error;
pub mod grid;
pub mod io;
mod maybe_rayon;

pub use error::{Error, Result};
pub use grid::{
    Grid, GridKind, LinkStatus, ModelGrid, NodeFields, NodeStatus, RasterModelGrid,
    VoronoiDelaunayGrid, BAD_INDEX_VALUE,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::grid::{
        Grid, GridKind, LinkStatus, ModelGrid, NodeFields, NodeStatus, RasterModelGrid,
        VoronoiDelaunayGrid, BAD_INDEX_VALUE,
    };
    pub use crate::{Algorithm, Component, FieldInfo, FieldRole};
}

/// Core trait for all algorithms in Landflow.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}

/// Whether a component reads or writes a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    Input,
    Output,
}

/// Description of a node field used by a component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: &'static str,
    pub role: FieldRole,
    pub units: &'static str,
    pub doc: &'static str,
}

/// A model component: a stateful step that reads and writes grid fields.
///
/// Unlike an [`Algorithm`], a component mutates the grid it runs on.
pub trait Component {
    /// Returns the component name
    fn name(&self) -> &'static str;

    /// Fields this component reads or writes
    fn field_info(&self) -> &'static [FieldInfo];

    /// Advance the component by one step on `grid`
    fn run_one_step<G: ModelGrid>(&mut self, grid: &mut G) -> Result<()>;

    /// Names of fields the component reads
    fn input_var_names(&self) -> Vec<&'static str> {
        self.field_info()
            .iter()
            .filter(|f| f.role == FieldRole::Input)
            .map(|f| f.name)
            .collect()
    }

    /// Names of fields the component writes
    fn output_var_names(&self) -> Vec<&'static str> {
        self.field_info()
            .iter()
            .filter(|f| f.role == FieldRole::Output)
            .map(|f| f.name)
            .collect()
    }

    /// Units of a field, if the component uses it
    fn var_units(&self, name: &str) -> Option<&'static str> {
        self.field_info().iter().find(|f| f.name == name).map(|f| f.units)
    }

    /// Description of a field, if the component uses it
    fn var_doc(&self, name: &str) -> Option<&'static str> {
        self.field_info().iter().find(|f| f.name == name).map(|f| f.doc)
    }
}

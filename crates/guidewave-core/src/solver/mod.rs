//! Field solver abstraction and implementations.
//!
//! The [`FieldSolver`] trait defines what the driver needs from a
//! time-domain engine: stepping, running for a duration, and sampling
//! arrays. The FDTD engine ([`fdtd::Simulation`]) is the implementation.

pub mod fdtd;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Component, Volume};

/// Errors that can occur while building or querying a simulation.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Resolution must be positive and finite, got {0}")]
    InvalidResolution(f64),

    #[error("Cell [{0}, {1}] needs at least three grid cells along each axis")]
    InvalidCell(f64, f64),

    #[error("Courant factor {courant} is outside the stable range (0, {limit:.4}]")]
    UnstableCourant { courant: f64, limit: f64 },

    #[error("PML of thickness {thickness} fills the cell along {axis} (cell size {cell})")]
    PmlTooThick { axis: char, thickness: f64, cell: f64 },

    #[error("Invalid PML along {axis}: {reason}")]
    InvalidPml { axis: char, reason: String },

    #[error("Component {0} cannot be used as a source (only Ez is supported)")]
    UnsupportedSourceComponent(Component),

    #[error("Invalid source time profile: {0}")]
    InvalidSourceTime(String),

    #[error("Source at [{0}, {1}] does not overlap any grid point")]
    SourceOutsideCell(f64, f64),

    #[error("Volume centred at [{0}, {1}] does not overlap any {2} sample")]
    VolumeOutsideCell(f64, f64, Component),

    #[error("Run duration must be non-negative and finite, got {0}")]
    InvalidDuration(f64),

    #[error("Invalid geometry: {0}")]
    Geometry(#[from] guidewave_geometry::GeometryError),

    #[error("Invalid material: {0}")]
    Material(#[from] guidewave_materials::MaterialError),
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    /// Timesteps executed by this run.
    pub steps: u64,
    /// Simulation time at the end of the run.
    pub time: f64,
    /// Wall-clock duration (seconds).
    pub wall_time: f64,
    /// Electromagnetic energy at the end of the run.
    pub field_energy: f64,
    /// Throughput in million cell-updates per second.
    pub mcells_per_sec: f64,
}

/// The interface the driver uses to control a time-domain engine.
pub trait FieldSolver {
    /// Advance all fields by one timestep.
    fn step(&mut self);

    /// Current simulation time.
    fn time(&self) -> f64;

    /// Step until the simulation time reaches `time`.
    fn run_until(&mut self, time: f64) -> Result<RunStats, SolverError>;

    /// Step for `duration` time units from the current time.
    fn run_for(&mut self, duration: f64) -> Result<RunStats, SolverError> {
        if !(duration.is_finite() && duration >= 0.0) {
            return Err(SolverError::InvalidDuration(duration));
        }
        let target = self.time() + duration;
        self.run_until(target)
    }

    /// Sample `component` at every grid point inside `volume`, indexed `[x][y]`.
    fn get_array(&self, component: Component, volume: &Volume) -> Result<Array2<f64>, SolverError>;

    /// Human-readable name of the method.
    fn method_name(&self) -> &str;
}

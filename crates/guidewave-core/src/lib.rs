//! # Guidewave Core
//!
//! Time-domain electromagnetics in two dimensions. This crate implements a
//! finite-difference time-domain (FDTD) engine for the TMz polarisation
//! ($E_z$, $H_x$, $H_y$) on a Yee grid, terminated by a convolutional PML.
//!
//! ## Architecture
//!
//! Engines implement the [`solver::FieldSolver`] trait, which provides
//! stepping, timed runs, and array extraction. The implementation is
//! [`solver::fdtd::Simulation`], configured through its builder from
//! geometry ([`guidewave_geometry`]), media ([`guidewave_materials`]),
//! [`source::Source`]s, and PML layers.
//!
//! ## Modules
//!
//! - [`types`]: field components and sampling volumes.
//! - [`source`]: current sources and their time profiles.
//! - [`solver`]: solver trait, errors, and the FDTD engine.
//! - [`snapshot`]: permittivity/field snapshots stored as `.npz`.
//!
//! ## Units
//!
//! Lengths are in an arbitrary unit $a$, frequencies in $c/a$, and times in
//! $a/c$; $\epsilon_0 = \mu_0 = c = 1$.

pub mod snapshot;
pub mod solver;
pub mod source;
pub mod types;

/// Commonly used items for setting up and running a simulation.
pub mod prelude {
    pub use crate::snapshot::Snapshot;
    pub use crate::solver::fdtd::{Pml, PmlDirection, Simulation};
    pub use crate::solver::{FieldSolver, RunStats, SolverError};
    pub use crate::source::{Source, SourceTime};
    pub use crate::types::{Component, Volume};
    pub use guidewave_geometry::{Block, Cylinder, Ellipsoid, GeometricObject, Shape};
    pub use guidewave_materials::Medium;
}

//! # Guidewave Materials
//!
//! Material descriptions for the Guidewave FDTD engine. Every cell of the
//! simulation grid carries a [`Medium`](medium::Medium): a non-dispersive
//! material described by its relative permittivity, relative permeability,
//! and electric conductivity.
//!
//! ## Available data
//!
//! | Source | Module | Notes |
//! |--------|--------|-------|
//! | Explicit parameters | [`medium`] | ε, μ, σ given directly |
//! | Named presets | [`library`] | Common photonic materials at telecom wavelengths |

pub mod library;
pub mod medium;

pub use medium::{MaterialError, Medium};

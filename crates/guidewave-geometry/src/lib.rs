//! # Guidewave Geometry
//!
//! Geometry handling for the Guidewave FDTD engine. This crate provides:
//!
//! - **Parametric shapes** ([`primitives`]): blocks, cylinders, and
//!   ellipsoids in the simulation plane, each paired with a
//!   [`Medium`](guidewave_materials::Medium).
//! - **Rasterisation** ([`rasterise`]): samples a list of objects onto the
//!   staggered Yee lattice, with optional subpixel averaging.

pub mod primitives;
pub mod rasterise;

pub use primitives::{Block, Cylinder, Ellipsoid, GeometricObject, GeometryError, Shape};
pub use rasterise::{rasterise, Lattice, MaterialMap};

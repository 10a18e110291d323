//! Parametric 2D shapes.
//!
//! Shapes live in the simulation plane; the out-of-plane extent is infinite,
//! so a [`Cylinder`] is a disk and an [`Ellipsoid`] an ellipse. Sizes may be
//! `inf` to span the whole cell, which is how a straight waveguide is usually
//! written.

use guidewave_materials::Medium;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from shape validation.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Shape size must be non-negative, got [{0}, {1}]")]
    NegativeSize(f64, f64),

    #[error("Cylinder radius must be positive, got {0}")]
    NonPositiveRadius(f64),

    #[error("Shape centre must be finite, got [{0}, {1}]")]
    NonFiniteCentre(f64, f64),

    #[error("Invalid material: {0}")]
    Material(#[from] guidewave_materials::MaterialError),
}

/// A geometric shape in the simulation plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Block(Block),
    Cylinder(Cylinder),
    Ellipsoid(Ellipsoid),
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Centre position.
    #[serde(default)]
    pub center: [f64; 2],
    /// Full side lengths along x and y; `inf` spans the cell.
    pub size: [f64; 2],
}

/// A disk, the in-plane section of an infinite cylinder along z.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cylinder {
    /// Centre position.
    #[serde(default)]
    pub center: [f64; 2],
    /// Radius.
    pub radius: f64,
}

/// An axis-aligned ellipse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    /// Centre position.
    #[serde(default)]
    pub center: [f64; 2],
    /// Full axis lengths along x and y.
    pub size: [f64; 2],
}

impl Shape {
    /// Check whether a point lies inside this shape. Boundaries are inclusive.
    pub fn contains(&self, point: &[f64; 2]) -> bool {
        match self {
            Shape::Block(b) => {
                (point[0] - b.center[0]).abs() <= 0.5 * b.size[0]
                    && (point[1] - b.center[1]).abs() <= 0.5 * b.size[1]
            }
            Shape::Cylinder(c) => {
                let dx = point[0] - c.center[0];
                let dy = point[1] - c.center[1];
                dx * dx + dy * dy <= c.radius * c.radius
            }
            Shape::Ellipsoid(e) => {
                let u = (point[0] - e.center[0]) / (0.5 * e.size[0]);
                let v = (point[1] - e.center[1]) / (0.5 * e.size[1]);
                u * u + v * v <= 1.0
            }
        }
    }

    /// Centre of the shape.
    pub fn center(&self) -> [f64; 2] {
        match self {
            Shape::Block(b) => b.center,
            Shape::Cylinder(c) => c.center,
            Shape::Ellipsoid(e) => e.center,
        }
    }

    /// Check dimensions for physical sense.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let c = self.center();
        if !c[0].is_finite() || !c[1].is_finite() {
            return Err(GeometryError::NonFiniteCentre(c[0], c[1]));
        }
        match self {
            Shape::Block(Block { size, .. }) | Shape::Ellipsoid(Ellipsoid { size, .. }) => {
                if !(size[0] >= 0.0 && size[1] >= 0.0) {
                    return Err(GeometryError::NegativeSize(size[0], size[1]));
                }
            }
            Shape::Cylinder(cyl) => {
                if !(cyl.radius > 0.0) {
                    return Err(GeometryError::NonPositiveRadius(cyl.radius));
                }
            }
        }
        Ok(())
    }
}

/// A shape filled with a medium.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometricObject {
    pub shape: Shape,
    pub material: Medium,
}

impl GeometricObject {
    pub fn new(shape: Shape, material: Medium) -> Self {
        Self { shape, material }
    }

    /// Validate both the shape and its medium.
    pub fn validate(&self) -> Result<(), GeometryError> {
        self.shape.validate()?;
        self.material.validate()?;
        Ok(())
    }
}

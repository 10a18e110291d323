//! Rasterisation of geometric objects onto the simulation lattice.
//!
//! The Yee scheme samples each field component on its own staggered
//! sub-grid. [`rasterise`] evaluates the material at the sample points of one
//! such sub-grid, selected by a fractional `offset` in cell units:
//!
//! | Component | Offset |
//! |-----------|--------|
//! | $E_z$ | $(0, 0)$ |
//! | $H_x$ | $(0, \tfrac12)$ |
//! | $H_y$ | $(\tfrac12, 0)$ |
//!
//! With `samples > 1`, every cell is supersampled on a `samples × samples`
//! sub-grid and the constants are averaged. This smooths interfaces that do
//! not fall on cell boundaries.

use guidewave_materials::Medium;
use ndarray::Array2;

use crate::primitives::GeometricObject;

/// A uniform 2D lattice of cell-centred sample points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lattice {
    /// Number of cells along x.
    pub nx: usize,
    /// Number of cells along y.
    pub ny: usize,
    /// Cell size (equal along both axes).
    pub dx: f64,
    /// Lower-left corner of the lattice.
    pub origin: [f64; 2],
}

impl Lattice {
    /// Lattice covering a cell of size `cell` centred on the origin at
    /// `resolution` cells per unit length.
    pub fn centred(cell: [f64; 2], resolution: f64) -> Self {
        let nx = (cell[0] * resolution).round().max(0.0) as usize;
        let ny = (cell[1] * resolution).round().max(0.0) as usize;
        Self {
            nx,
            ny,
            dx: 1.0 / resolution,
            origin: [-0.5 * cell[0], -0.5 * cell[1]],
        }
    }

    /// Position of sample `(i, j)` on the sub-grid shifted by `offset` cells.
    pub fn position(&self, i: usize, j: usize, offset: [f64; 2]) -> [f64; 2] {
        [
            self.origin[0] + (i as f64 + 0.5 + offset[0]) * self.dx,
            self.origin[1] + (j as f64 + 0.5 + offset[1]) * self.dx,
        ]
    }

    /// Continuous (fractional) lattice coordinates of a point, inverse of
    /// [`position`](Self::position) with zero offset.
    pub fn fractional_index(&self, point: &[f64; 2]) -> [f64; 2] {
        [
            (point[0] - self.origin[0]) / self.dx - 0.5,
            (point[1] - self.origin[1]) / self.dx - 0.5,
        ]
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Material constants sampled on one sub-grid.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialMap {
    pub epsilon: Array2<f64>,
    pub mu: Array2<f64>,
    pub conductivity: Array2<f64>,
}

/// Medium at a point: the last object containing it wins, otherwise `default`.
pub fn medium_at(objects: &[GeometricObject], default: &Medium, point: &[f64; 2]) -> Medium {
    objects
        .iter()
        .rev()
        .find(|obj| obj.shape.contains(point))
        .map(|obj| obj.material)
        .unwrap_or(*default)
}

/// Sample the objects on the sub-grid of `lattice` shifted by `offset`.
///
/// # Arguments
/// * `objects` - Objects in increasing order of precedence.
/// * `default` - Medium filling the space outside every object.
/// * `lattice` - Sample lattice.
/// * `offset` - Sub-grid shift in cells (see module docs).
/// * `samples` - Supersampling factor per axis; `1` samples the point only.
pub fn rasterise(
    objects: &[GeometricObject],
    default: &Medium,
    lattice: &Lattice,
    offset: [f64; 2],
    samples: usize,
) -> MaterialMap {
    let samples = samples.max(1);
    let shape = (lattice.nx, lattice.ny);
    let mut epsilon = Array2::zeros(shape);
    let mut mu = Array2::zeros(shape);
    let mut conductivity = Array2::zeros(shape);

    let weight = 1.0 / (samples * samples) as f64;
    let fractions: Vec<f64> = (0..samples)
        .map(|s| (s as f64 + 0.5) / samples as f64 - 0.5)
        .collect();

    for i in 0..lattice.nx {
        for j in 0..lattice.ny {
            let centre = lattice.position(i, j, offset);
            let (mut eps, mut m, mut sigma) = (0.0, 0.0, 0.0);
            for fx in &fractions {
                for fy in &fractions {
                    let p = [centre[0] + fx * lattice.dx, centre[1] + fy * lattice.dx];
                    let medium = medium_at(objects, default, &p);
                    eps += medium.epsilon;
                    m += medium.mu;
                    sigma += medium.conductivity;
                }
            }
            epsilon[[i, j]] = eps * weight;
            mu[[i, j]] = m * weight;
            conductivity[[i, j]] = sigma * weight;
        }
    }

    MaterialMap {
        epsilon,
        mu,
        conductivity,
    }
}

//! Core types shared across the Guidewave engine.
//!
//! Fields live in the TMz polarisation: $E_z$ out of plane, $H_x$ and $H_y$
//! in plane. All quantities are in normalised units with
//! $\epsilon_0 = \mu_0 = c = 1$.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A quantity that can be sampled from the simulation grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Component {
    Ez,
    Hx,
    Hy,
    /// Relative permittivity at the $E_z$ sample points.
    Dielectric,
    /// Relative permeability at the $E_z$ sample points.
    Permeability,
}

impl Component {
    /// Sub-grid offset of the component's sample points, in cells.
    pub fn offset(self) -> [f64; 2] {
        match self {
            Component::Hx => [0.0, 0.5],
            Component::Hy => [0.5, 0.0],
            Component::Ez | Component::Dielectric | Component::Permeability => [0.0, 0.0],
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Component::Ez => "Ez",
            Component::Hx => "Hx",
            Component::Hy => "Hy",
            Component::Dielectric => "Dielectric",
            Component::Permeability => "Permeability",
        };
        f.write_str(name)
    }
}

/// An axis-aligned rectangular region of the simulation plane.
///
/// A zero size along an axis selects a line (or point) at the centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub center: [f64; 2],
    pub size: [f64; 2],
}

impl Volume {
    pub fn new(center: [f64; 2], size: [f64; 2]) -> Self {
        Self { center, size }
    }

    /// The whole cell of the given size, centred on the origin.
    pub fn whole(cell: [f64; 2]) -> Self {
        Self {
            center: [0.0, 0.0],
            size: cell,
        }
    }

    /// A single point.
    pub fn point(center: [f64; 2]) -> Self {
        Self {
            center,
            size: [0.0, 0.0],
        }
    }

    /// Bounds `[min, max]` along an axis.
    pub fn bounds(&self, axis: usize) -> [f64; 2] {
        let half = 0.5 * self.size[axis];
        [self.center[axis] - half, self.center[axis] + half]
    }
}

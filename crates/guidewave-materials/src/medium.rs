//! Non-dispersive electromagnetic media.
//!
//! The engine works in normalised units where $\epsilon_0 = \mu_0 = c = 1$,
//! so a medium is fully described by its relative constants.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from material construction and lookup.
#[derive(Debug, Error)]
pub enum MaterialError {
    #[error("Permittivity must be positive, got {0}")]
    NonPositivePermittivity(f64),

    #[error("Permeability must be positive, got {0}")]
    NonPositivePermeability(f64),

    #[error("Conductivity must be non-negative, got {0}")]
    NegativeConductivity(f64),

    #[error("Material not found: {0}")]
    NotFound(String),
}

/// A linear, isotropic, non-dispersive medium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Medium {
    /// Relative permittivity $\epsilon_r$.
    #[serde(default = "one")]
    pub epsilon: f64,
    /// Relative permeability $\mu_r$.
    #[serde(default = "one")]
    pub mu: f64,
    /// Electric conductivity in units of $\epsilon_0 c / a$.
    ///
    /// Attenuates the field as $\exp(-\sigma t / \epsilon)$ inside the medium.
    #[serde(default)]
    pub conductivity: f64,
}

fn one() -> f64 {
    1.0
}

impl Default for Medium {
    fn default() -> Self {
        Self::vacuum()
    }
}

impl Medium {
    /// Vacuum (and, at this level of modelling, air).
    pub const fn vacuum() -> Self {
        Self {
            epsilon: 1.0,
            mu: 1.0,
            conductivity: 0.0,
        }
    }

    /// A lossless dielectric with the given relative permittivity.
    pub const fn dielectric(epsilon: f64) -> Self {
        Self {
            epsilon,
            mu: 1.0,
            conductivity: 0.0,
        }
    }

    /// A lossless dielectric with refractive index $n$, i.e. $\epsilon = n^2$.
    pub fn from_index(n: f64) -> Self {
        Self::dielectric(n * n)
    }

    /// Refractive index $n = \sqrt{\epsilon \mu}$.
    pub fn refractive_index(&self) -> f64 {
        (self.epsilon * self.mu).sqrt()
    }

    /// Check that the constants describe a physical, stable medium.
    pub fn validate(&self) -> Result<(), MaterialError> {
        if !(self.epsilon > 0.0) {
            return Err(MaterialError::NonPositivePermittivity(self.epsilon));
        }
        if !(self.mu > 0.0) {
            return Err(MaterialError::NonPositivePermeability(self.mu));
        }
        if !(self.conductivity >= 0.0) {
            return Err(MaterialError::NegativeConductivity(self.conductivity));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_index_squares() {
        let m = Medium::from_index(1.45);
        assert_relative_eq!(m.epsilon, 2.1025, epsilon = 1e-12);
        assert_relative_eq!(m.refractive_index(), 1.45, epsilon = 1e-12);
    }

    #[test]
    fn test_validate_rejects_unphysical() {
        assert!(Medium::dielectric(12.0).validate().is_ok());
        assert!(matches!(
            Medium::dielectric(0.0).validate(),
            Err(MaterialError::NonPositivePermittivity(_))
        ));
        assert!(matches!(
            Medium::dielectric(f64::NAN).validate(),
            Err(MaterialError::NonPositivePermittivity(_))
        ));
        let lossy = Medium {
            conductivity: -0.1,
            ..Medium::vacuum()
        };
        assert!(matches!(
            lossy.validate(),
            Err(MaterialError::NegativeConductivity(_))
        ));
    }
}

//! Convolutional Perfectly Matched Layer (CPML).
//!
//! The absorbing layer is implemented as a complex-frequency-shifted
//! coordinate stretch $s = \kappa + \sigma / (\alpha + i\omega)$, applied
//! through auxiliary $\psi$ fields with recursive convolution
//! (Roden & Gedney, 2000). Each spatial derivative $\partial_u F$ inside the
//! layer becomes $\partial_u F / \kappa + \psi$ with
//!
//! $$\psi^{n+1} = b\,\psi^n + a\,\partial_u F, \qquad
//!   b = e^{-(\sigma/\kappa + \alpha)\Delta t}, \qquad
//!   a = \frac{\sigma}{\sigma\kappa + \kappa^2\alpha}(b - 1).$$
//!
//! The conductivity is graded as $\sigma(d) = \sigma_\text{max}(d/L)^m$ with
//! $\sigma_\text{max} = -(m+1)\ln R / (2L)$, so that a wave crossing the
//! layer and back is attenuated by the asymptotic reflection $R$.

use serde::{Deserialize, Serialize};

/// Axes along which a PML layer absorbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PmlDirection {
    #[default]
    All,
    X,
    Y,
}

impl PmlDirection {
    fn covers(self, axis: usize) -> bool {
        match self {
            PmlDirection::All => true,
            PmlDirection::X => axis == 0,
            PmlDirection::Y => axis == 1,
        }
    }
}

/// A PML layer on both sides of the cell along its direction(s).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pml {
    /// Layer thickness in length units (inside the cell).
    pub thickness: f64,
    #[serde(default)]
    pub direction: PmlDirection,
    /// Target round-trip reflection of the continuous layer.
    #[serde(default = "default_r_asymptotic")]
    pub r_asymptotic: f64,
    /// Polynomial grading order $m$.
    #[serde(default = "default_grading_order")]
    pub grading_order: f64,
    /// Maximum real stretch $\kappa_\text{max}$ (1 disables stretching).
    #[serde(default = "default_kappa_max")]
    pub kappa_max: f64,
    /// Maximum complex frequency shift $\alpha_\text{max}$.
    #[serde(default)]
    pub alpha_max: f64,
}

fn default_r_asymptotic() -> f64 {
    1e-15
}

fn default_grading_order() -> f64 {
    2.0
}

fn default_kappa_max() -> f64 {
    1.0
}

impl Pml {
    /// Layer of the given thickness on all sides with default grading.
    pub fn new(thickness: f64) -> Self {
        Self {
            thickness,
            direction: PmlDirection::All,
            r_asymptotic: default_r_asymptotic(),
            grading_order: default_grading_order(),
            kappa_max: default_kappa_max(),
            alpha_max: 0.0,
        }
    }

    pub fn with_direction(mut self, direction: PmlDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Peak conductivity for this layer's grading.
    pub fn sigma_max(&self) -> f64 {
        -(self.grading_order + 1.0) * self.r_asymptotic.ln() / (2.0 * self.thickness)
    }

    /// Check the grading parameters. Returns a description of the first
    /// offending parameter.
    pub fn check(&self) -> Result<(), String> {
        if !(self.thickness.is_finite() && self.thickness >= 0.0) {
            return Err(format!("thickness must be finite and non-negative, got {}", self.thickness));
        }
        if !(self.r_asymptotic > 0.0 && self.r_asymptotic < 1.0) {
            return Err(format!("r_asymptotic must lie in (0, 1), got {}", self.r_asymptotic));
        }
        if !(self.grading_order.is_finite() && self.grading_order >= 0.0) {
            return Err(format!("grading_order must be non-negative, got {}", self.grading_order));
        }
        if !(self.kappa_max.is_finite() && self.kappa_max >= 1.0) {
            return Err(format!("kappa_max must be at least 1, got {}", self.kappa_max));
        }
        if !(self.alpha_max.is_finite() && self.alpha_max >= 0.0) {
            return Err(format!("alpha_max must be non-negative, got {}", self.alpha_max));
        }
        Ok(())
    }

    /// Whether this layer absorbs along `axis` (0 = x, 1 = y).
    pub fn covers(&self, axis: usize) -> bool {
        self.direction.covers(axis) && self.thickness > 0.0
    }
}

/// The layer responsible for `axis`: the thickest one that covers it.
pub(crate) fn layer_for_axis(layers: &[Pml], axis: usize) -> Option<&Pml> {
    layers
        .iter()
        .filter(|p| p.covers(axis))
        .max_by(|a, b| a.thickness.total_cmp(&b.thickness))
}

/// CPML coefficients along one axis, for the E and H sample positions.
///
/// Outside the layer $b = 1$, $a = 0$, $\kappa = 1$, so the auxiliary fields
/// stay at zero and the update reduces to the plain Yee scheme.
#[derive(Debug, Clone)]
pub(crate) struct CpmlAxis {
    pub b_e: Vec<f64>,
    pub a_e: Vec<f64>,
    pub kappa_e: Vec<f64>,
    pub b_h: Vec<f64>,
    pub a_h: Vec<f64>,
    pub kappa_h: Vec<f64>,
    /// Number of cells inside the layer on each side.
    pub cells: usize,
}

impl CpmlAxis {
    /// Coefficients for an axis of `n` cells of size `dx`.
    pub fn new(n: usize, dx: f64, dt: f64, layer: Option<&Pml>) -> Self {
        let mut axis = Self {
            b_e: vec![1.0; n],
            a_e: vec![0.0; n],
            kappa_e: vec![1.0; n],
            b_h: vec![1.0; n],
            a_h: vec![0.0; n],
            kappa_h: vec![1.0; n],
            cells: 0,
        };
        let Some(layer) = layer else {
            return axis;
        };

        let thickness = layer.thickness;
        let length = n as f64 * dx;
        let sigma_max = layer.sigma_max();
        let depth = |x: f64| (thickness - x).max(x - (length - thickness)).max(0.0);

        for i in 0..n {
            // E samples at cell centres, H samples half a cell further along.
            let (b, a, kappa) = coefficients(layer, sigma_max, depth((i as f64 + 0.5) * dx) / thickness, dt);
            axis.b_e[i] = b;
            axis.a_e[i] = a;
            axis.kappa_e[i] = kappa;

            let (b, a, kappa) = coefficients(layer, sigma_max, depth((i as f64 + 1.0) * dx) / thickness, dt);
            axis.b_h[i] = b;
            axis.a_h[i] = a;
            axis.kappa_h[i] = kappa;
        }
        axis.cells = ((thickness / dx).round() as usize).min(n);

        axis
    }
}

/// `(b, a, kappa)` at normalised depth `rho` in `[0, 1]`.
fn coefficients(layer: &Pml, sigma_max: f64, rho: f64, dt: f64) -> (f64, f64, f64) {
    let rho = rho.clamp(0.0, 1.0);
    if rho == 0.0 {
        return (1.0, 0.0, 1.0);
    }
    let grade = rho.powf(layer.grading_order);
    let sigma = sigma_max * grade;
    let kappa = 1.0 + (layer.kappa_max - 1.0) * grade;
    let alpha = layer.alpha_max * (1.0 - rho);

    let b = (-(sigma / kappa + alpha) * dt).exp();
    let denom = sigma * kappa + kappa * kappa * alpha;
    let a = if denom > 0.0 { sigma / denom * (b - 1.0) } else { 0.0 };
    (b, a, kappa)
}

//! Current sources and their time dependence.
//!
//! A [`Source`] injects an electric current density $J_z$ into the $E_z$
//! update. Its time profile is a complex [`SourceTime`]; the real-valued
//! engine uses $\mathrm{Re}\{A\, s(t)\}$ with $A$ the complex amplitude, so
//! several sources can be driven with relative phases.

use std::f64::consts::PI;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::types::Component;

/// Time profile of a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceTime {
    /// Continuous wave $e^{-i\omega t}$, optionally switched on smoothly.
    Continuous {
        /// Frequency in units of $c/a$.
        frequency: f64,
        #[serde(default)]
        start_time: f64,
        #[serde(default = "infinite")]
        end_time: f64,
        /// Turn-on time scale; `0` switches on abruptly.
        #[serde(default)]
        width: f64,
        /// Delay of the turn-on, in units of `width`.
        #[serde(default = "default_slowness")]
        slowness: f64,
    },
    /// Gaussian pulse with centre frequency `frequency` and bandwidth `fwidth`.
    Gaussian {
        frequency: f64,
        fwidth: f64,
        #[serde(default)]
        start_time: f64,
        /// Half-length of the pulse window in units of $1/f_\text{width}$.
        #[serde(default = "default_cutoff")]
        cutoff: f64,
    },
}

fn infinite() -> f64 {
    f64::INFINITY
}

fn default_slowness() -> f64 {
    3.0
}

fn default_cutoff() -> f64 {
    5.0
}

impl SourceTime {
    /// Continuous wave switched on abruptly at $t = 0$.
    pub fn continuous(frequency: f64) -> Self {
        SourceTime::Continuous {
            frequency,
            start_time: 0.0,
            end_time: f64::INFINITY,
            width: 0.0,
            slowness: default_slowness(),
        }
    }

    /// Gaussian pulse starting at $t = 0$ with the default cutoff.
    pub fn gaussian(frequency: f64, fwidth: f64) -> Self {
        SourceTime::Gaussian {
            frequency,
            fwidth,
            start_time: 0.0,
            cutoff: default_cutoff(),
        }
    }

    /// Centre frequency.
    pub fn frequency(&self) -> f64 {
        match self {
            SourceTime::Continuous { frequency, .. } | SourceTime::Gaussian { frequency, .. } => {
                *frequency
            }
        }
    }

    /// Time after which the source is identically zero.
    pub fn end_time(&self) -> f64 {
        match self {
            SourceTime::Continuous { end_time, .. } => *end_time,
            SourceTime::Gaussian {
                fwidth,
                start_time,
                cutoff,
                ..
            } => start_time + 2.0 * cutoff / fwidth,
        }
    }

    /// Complex current amplitude at time `t`.
    pub fn current(&self, t: f64) -> Complex64 {
        match *self {
            SourceTime::Continuous {
                frequency,
                start_time,
                end_time,
                width,
                slowness,
            } => {
                if t < start_time || t > end_time {
                    return Complex64::new(0.0, 0.0);
                }
                let envelope = if width > 0.0 {
                    0.5 * (1.0 + ((t - start_time) / width - slowness).tanh())
                } else {
                    1.0
                };
                Complex64::from_polar(envelope, -2.0 * PI * frequency * t)
            }
            SourceTime::Gaussian {
                frequency,
                fwidth,
                start_time,
                cutoff,
            } => {
                let w = 1.0 / fwidth;
                let peak = start_time + cutoff * w;
                let tt = t - peak;
                if tt.abs() > cutoff * w {
                    return Complex64::new(0.0, 0.0);
                }
                let envelope = (-tt * tt / (2.0 * w * w)).exp();
                Complex64::from_polar(envelope, -2.0 * PI * frequency * t)
            }
        }
    }

    pub(crate) fn validate(&self) -> bool {
        match *self {
            SourceTime::Continuous {
                frequency, width, ..
            } => frequency.is_finite() && frequency >= 0.0 && width >= 0.0,
            SourceTime::Gaussian {
                frequency,
                fwidth,
                cutoff,
                ..
            } => frequency.is_finite() && frequency >= 0.0 && fwidth > 0.0 && cutoff > 0.0,
        }
    }
}

/// A current source occupying a point, line, or rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub time: SourceTime,
    pub component: Component,
    pub center: [f64; 2],
    /// Extent of the source; zero along both axes gives a point source.
    #[serde(default)]
    pub size: [f64; 2],
    pub amplitude: Complex64,
}

impl Source {
    /// Point source of unit amplitude.
    pub fn point(time: SourceTime, component: Component, center: [f64; 2]) -> Self {
        Self {
            time,
            component,
            center,
            size: [0.0, 0.0],
            amplitude: Complex64::new(1.0, 0.0),
        }
    }

    pub fn with_size(mut self, size: [f64; 2]) -> Self {
        self.size = size;
        self
    }

    pub fn with_amplitude(mut self, amplitude: Complex64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Real current (before spatial weighting) injected at time `t`.
    pub fn real_current(&self, t: f64) -> f64 {
        (self.amplitude * self.time.current(t)).re
    }
}

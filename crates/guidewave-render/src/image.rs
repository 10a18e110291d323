//! Raster images built from 2D arrays.
//!
//! Arrays from the engine are indexed `[x][y]`. Images are stored row-major
//! with row `0` at the top; [`orient`] maps array index `y = 0` to the top
//! row, matching the default image orientation of NumPy-based plotting.

use ndarray::Array2;

use crate::colormap::{Colormap, Rgb};

/// An RGB image with channels in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub width: usize,
    pub height: usize,
    pixels: Vec<Rgb>,
}

impl Raster {
    /// Colour every element of an image-oriented array (`[row][col]`).
    pub fn from_values(values: &Array2<f64>, colormap: Colormap) -> Self {
        let (height, width) = values.dim();
        let pixels = values.iter().map(|&v| colormap.map(v)).collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn pixel(&self, col: usize, row: usize) -> Rgb {
        self.pixels[row * self.width + col]
    }

    /// Alpha-composite `self` over `background`: `alpha * self + (1 - alpha) * background`.
    ///
    /// Returns `None` if the rasters differ in size.
    pub fn over(&self, background: &Raster, alpha: f64) -> Option<Raster> {
        if (self.width, self.height) != (background.width, background.height) {
            return None;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        let pixels = self
            .pixels
            .iter()
            .zip(&background.pixels)
            .map(|(fg, bg)| {
                [
                    alpha * fg[0] + (1.0 - alpha) * bg[0],
                    alpha * fg[1] + (1.0 - alpha) * bg[1],
                    alpha * fg[2] + (1.0 - alpha) * bg[2],
                ]
            })
            .collect();
        Some(Raster {
            width: self.width,
            height: self.height,
            pixels,
        })
    }

    /// Pixels as 8-bit RGB, row by row from the top.
    pub fn to_rgb8(&self) -> Vec<[u8; 3]> {
        self.pixels
            .iter()
            .map(|p| p.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
            .collect()
    }
}

/// Rescale to `[0, 1]` using the array's own minimum and maximum.
///
/// A constant array (or one without finite values) maps to all zeros.
pub fn normalize(values: &Array2<f64>) -> Array2<f64> {
    let (min, max) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;
    if !(range.is_finite() && range > 0.0) {
        return Array2::zeros(values.dim());
    }
    values.mapv(|v| ((v - min) / range).clamp(0.0, 1.0))
}

/// Transpose an `[x][y]` array to image layout `[row][col]` with `y = 0` on top.
pub fn orient(values: &Array2<f64>) -> Array2<f64> {
    values.t().to_owned()
}

/// Enlarge an image-oriented array by an integer factor with bilinear
/// interpolation between sample centres.
pub fn upsample(values: &Array2<f64>, scale: usize) -> Array2<f64> {
    let scale = scale.max(1);
    let (rows, cols) = values.dim();
    if scale == 1 || rows == 0 || cols == 0 {
        return values.clone();
    }

    // Source coordinate of each output pixel centre, clamped to the edge samples.
    let sample = |k: usize, n: usize| -> (usize, usize, f64) {
        let x = ((k as f64 + 0.5) / scale as f64 - 0.5).clamp(0.0, (n - 1) as f64);
        let lo = x.floor() as usize;
        let hi = (lo + 1).min(n - 1);
        (lo, hi, x - lo as f64)
    };

    Array2::from_shape_fn((rows * scale, cols * scale), |(r, c)| {
        let (r0, r1, tr) = sample(r, rows);
        let (c0, c1, tc) = sample(c, cols);
        let top = (1.0 - tc) * values[[r0, c0]] + tc * values[[r0, c1]];
        let bottom = (1.0 - tc) * values[[r1, c0]] + tc * values[[r1, c1]];
        (1.0 - tr) * top + tr * bottom
    })
}

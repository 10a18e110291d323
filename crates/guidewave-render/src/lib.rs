//! # Guidewave Render
//!
//! Static images of simulation snapshots.
//!
//! - [`render_permittivity`]: the permittivity map in the `binary` colormap.
//! - [`render_field_overlay`]: the $E_z$ field in `RdBu` drawn at 90 % opacity
//!   over the permittivity map.
//!
//! Each array is normalised by its own range, transposed so that x runs
//! along image columns, and enlarged by [`RenderOptions::scale`] with
//! bilinear interpolation before colouring.

pub mod colormap;
pub mod image;
pub mod png;

use std::path::Path;

use ndarray::Array2;
use thiserror::Error;

use crate::colormap::Colormap;
use crate::image::{normalize, orient, upsample, Raster};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Cannot render an empty image")]
    EmptyImage,

    #[error("Arrays differ in shape: {0:?} vs {1:?}")]
    ShapeMismatch((usize, usize), (usize, usize)),

    #[error("Drawing failed: {0}")]
    Draw(String),
}

/// Parameters shared by both images.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Output pixels per array sample along each axis.
    pub scale: usize,
    /// Opacity of the field layer in the overlay.
    pub field_alpha: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: 4,
            field_alpha: 0.9,
        }
    }
}

fn layer(values: &Array2<f64>, colormap: Colormap, scale: usize) -> Result<Raster, RenderError> {
    if values.is_empty() {
        return Err(RenderError::EmptyImage);
    }
    let img = upsample(&orient(&normalize(values)), scale);
    Ok(Raster::from_values(&img, colormap))
}

/// Grayscale image of the permittivity map.
pub fn permittivity_image(eps: &Array2<f64>, options: &RenderOptions) -> Result<Raster, RenderError> {
    layer(eps, Colormap::Binary, options.scale)
}

/// The field in `RdBu` composited over the grayscale permittivity map.
pub fn field_overlay_image(
    eps: &Array2<f64>,
    ez: &Array2<f64>,
    options: &RenderOptions,
) -> Result<Raster, RenderError> {
    if eps.dim() != ez.dim() {
        return Err(RenderError::ShapeMismatch(eps.dim(), ez.dim()));
    }
    let background = layer(eps, Colormap::Binary, options.scale)?;
    let field = layer(ez, Colormap::RdBu, options.scale)?;
    field
        .over(&background, options.field_alpha)
        .ok_or(RenderError::ShapeMismatch(eps.dim(), ez.dim()))
}

/// Write the permittivity image to `path`.
pub fn render_permittivity(
    eps: &Array2<f64>,
    path: impl AsRef<Path>,
    options: &RenderOptions,
) -> Result<(), RenderError> {
    png::write_png(&permittivity_image(eps, options)?, path.as_ref())
}

/// Write the field overlay image to `path`.
pub fn render_field_overlay(
    eps: &Array2<f64>,
    ez: &Array2<f64>,
    path: impl AsRef<Path>,
    options: &RenderOptions,
) -> Result<(), RenderError> {
    png::write_png(&field_overlay_image(eps, ez, options)?, path.as_ref())
}

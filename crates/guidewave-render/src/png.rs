//! PNG output through the plotters bitmap backend.

use std::path::Path;

use plotters::prelude::*;

use crate::image::Raster;
use crate::RenderError;

/// Write `raster` to `path` as a PNG of exactly `width x height` pixels.
pub fn write_png(raster: &Raster, path: &Path) -> Result<(), RenderError> {
    if raster.width == 0 || raster.height == 0 {
        return Err(RenderError::EmptyImage);
    }
    let size = (raster.width as u32, raster.height as u32);
    let root = BitMapBackend::new(path, size).into_drawing_area();

    for (k, [r, g, b]) in raster.to_rgb8().into_iter().enumerate() {
        let (col, row) = (k % raster.width, k / raster.width);
        root.draw_pixel((col as i32, row as i32), &RGBColor(r, g, b))
            .map_err(|e| RenderError::Draw(e.to_string()))?;
    }
    root.present().map_err(|e| RenderError::Draw(e.to_string()))?;

    log::debug!("Wrote {}x{} image to {}", size.0, size.1, path.display());
    Ok(())
}

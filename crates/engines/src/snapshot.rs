//! PNG output for rendered frames and field visualizations.
//!
//! Feature-gated behind `png` (default on) so that WASM builds can depend on
//! this crate without pulling in the `image` crate.

use std::path::Path;

use flowfield_core::color::Srgb;
use flowfield_core::error::EngineError;
use flowfield_core::field::VectorField;
use flowfield_core::palette::Palette;
use flowfield_core::surface::PixelBuffer;

use crate::pixel::{composite_over, field_to_rgba};

/// Writes a frame as an opaque PNG, compositing it over `background`.
///
/// Returns `EngineError::InvalidDimensions` if the dimensions overflow
/// `u32`, or `EngineError::Io` on write failure.
pub fn write_png(pixels: &PixelBuffer, path: &Path, background: Srgb) -> Result<(), EngineError> {
    let rgba = composite_over(pixels, background);
    save_rgba(pixels.width(), pixels.height(), rgba, path)
}

/// Writes the field as a `cols × rows` PNG, one pixel per cell.
pub fn write_field_png(
    field: &VectorField,
    palette: &Palette,
    path: &Path,
) -> Result<(), EngineError> {
    if field.is_empty() {
        return Err(EngineError::InvalidDimensions);
    }
    save_rgba(field.cols(), field.rows(), field_to_rgba(field, palette), path)
}

fn save_rgba(width: usize, height: usize, rgba: Vec<u8>, path: &Path) -> Result<(), EngineError> {
    let w = u32::try_from(width).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u32::try_from(height).map_err(|_| EngineError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))?;
    tracing::debug!(path = %path.display(), width, height, "wrote png");
    Ok(())
}

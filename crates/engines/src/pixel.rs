//! Pure-computation pixel conversions shared by the PNG path and the CLI.
//!
//! No feature gate: nothing here touches the `image` crate.

use std::f64::consts::TAU;

use flowfield_core::color::Srgb;
use flowfield_core::field::VectorField;
use flowfield_core::palette::Palette;
use flowfield_core::surface::PixelBuffer;

/// Maps each cell's angle through a palette, one pixel per cell.
///
/// `t = angle / 2π` is sampled from the palette; alpha is the cell opacity,
/// so cells that are not spawn points show as transparent. The buffer is
/// `cols × rows × 4` bytes, row-major.
pub fn field_to_rgba(field: &VectorField, palette: &Palette) -> Vec<u8> {
    field
        .cells()
        .iter()
        .flat_map(|cell| {
            let [r, g, b, _] = palette.sample(cell.angle / TAU).to_rgba8();
            let a = (cell.opacity * 255.0).round().clamp(0.0, 255.0) as u8;
            [r, g, b, a]
        })
        .collect()
}

/// Flattens straight-alpha pixels over an opaque background.
///
/// The result has the same dimensions and every alpha byte is 255.
pub fn composite_over(pixels: &PixelBuffer, background: Srgb) -> Vec<u8> {
    let [br, bg, bb, _] = background.to_rgba8();
    pixels
        .data()
        .chunks_exact(4)
        .flat_map(|px| {
            let a = px[3] as f64 / 255.0;
            let mix = |s: u8, d: u8| (s as f64 * a + d as f64 * (1.0 - a)).round() as u8;
            [mix(px[0], br), mix(px[1], bg), mix(px[2], bb), 255]
        })
        .collect()
}

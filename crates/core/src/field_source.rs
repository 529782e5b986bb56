//! Field strategies: the interchangeable ways of filling a [`VectorField`].
//!
//! All strategies share one contract: given the surface dimensions and a
//! cell size they produce exactly `rows × cols` cells in row-major order.
//! Procedural and noise strategies are pure functions of their parameters;
//! the image strategy is a pure function of the rendered reference content.

use std::f64::consts::TAU;

use noise::{NoiseFn, Perlin};

use crate::error::EngineError;
use crate::field::VectorField;
use crate::reference::Reference;
use crate::surface::{PixelBuffer, Surface};

/// How the steering angles are computed.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldStrategy {
    /// `cos(col·zoom) + sin(row·zoom)·curve`.
    Procedural { zoom: f64, curve: f64 },
    /// Seeded Perlin noise mapped onto a full turn.
    Noise { scale: f64, seed: u32 },
    /// Grayscale of the reference content mapped onto a full turn, with
    /// pixel alpha as spawn opacity.
    ImageLuminance(Reference),
}

impl FieldStrategy {
    /// Short name used in params and logs.
    pub fn name(&self) -> &'static str {
        match self {
            FieldStrategy::Procedural { .. } => "procedural",
            FieldStrategy::Noise { .. } => "noise",
            FieldStrategy::ImageLuminance(_) => "image",
        }
    }

    /// Builds the field for the surface's current dimensions.
    ///
    /// The image strategy clears the surface, draws the reference and only
    /// then reads the pixels back, so sampling always sees fresh content.
    #[tracing::instrument(skip(self, surface), fields(strategy = self.name()))]
    pub fn generate(
        &self,
        surface: &mut dyn Surface,
        cell_size: usize,
    ) -> Result<VectorField, EngineError> {
        let (width, height) = (surface.width(), surface.height());
        let field = match self {
            FieldStrategy::Procedural { zoom, curve } => {
                procedural(width, height, cell_size, *zoom, *curve)?
            }
            FieldStrategy::Noise { scale, seed } => {
                perlin(width, height, cell_size, *scale, *seed)?
            }
            FieldStrategy::ImageLuminance(reference) => {
                surface.clear();
                reference.draw(surface);
                let pixels = surface.read_pixels(0, 0, width, height)?;
                luminance(&pixels, cell_size)?
            }
        };
        tracing::debug!(
            rows = field.rows(),
            cols = field.cols(),
            valid = field.valid_count(),
            "flow field generated"
        );
        Ok(field)
    }
}

/// Procedural field: `angle = cos(col·zoom) + sin(row·zoom)·curve`, every
/// cell a valid spawn point.
pub fn procedural(
    width: usize,
    height: usize,
    cell_size: usize,
    zoom: f64,
    curve: f64,
) -> Result<VectorField, EngineError> {
    VectorField::from_fn(width, height, cell_size, |col, row| {
        let angle = (col as f64 * zoom).cos() + (row as f64 * zoom).sin() * curve;
        (angle, 1.0)
    })
}

/// Perlin field: noise in [-1, 1] at `(col·scale, row·scale)` mapped onto
/// [0, 2π), every cell a valid spawn point.
pub fn perlin(
    width: usize,
    height: usize,
    cell_size: usize,
    scale: f64,
    seed: u32,
) -> Result<VectorField, EngineError> {
    let noise = Perlin::new(seed);
    VectorField::from_fn(width, height, cell_size, |col, row| {
        let v = noise.get([col as f64 * scale, row as f64 * scale]).clamp(-1.0, 1.0);
        ((v + 1.0) * 0.5 * TAU, 1.0)
    })
}

/// Luminance field sampled at the origin pixel of each cell:
/// `angle = round2(((r + g + b) / 3) / 255 · 2π)`, `opacity = a / 255`.
pub fn luminance(pixels: &PixelBuffer, cell_size: usize) -> Result<VectorField, EngineError> {
    VectorField::from_fn(pixels.width(), pixels.height(), cell_size, |col, row| {
        let [r, g, b, a] = pixels
            .pixel(col * cell_size, row * cell_size)
            .unwrap_or([0, 0, 0, 0]);
        let gray = (r as f64 + g as f64 + b as f64) / 3.0;
        let angle = round_hundredths(gray / 255.0 * TAU);
        (angle, a as f64 / 255.0)
    })
}

fn round_hundredths(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Srgb;
    use crate::raster::RasterSurface;
    use crate::reference::ReferencePaint;

    fn pixels_from(
        width: usize,
        height: usize,
        f: impl Fn(usize, usize) -> [u8; 4],
    ) -> PixelBuffer {
        let mut data = Vec::with_capacity(width * height * 4);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        PixelBuffer::from_raw(width, height, data).unwrap()
    }

    // -- procedural --

    #[test]
    fn procedural_matches_formula_after_normalization() {
        let f = procedural(50, 50, 5, 0.07, 5.0).unwrap();
        let c = f.cells()[3 * f.cols() + 7];
        let raw = (7.0_f64 * 0.07).cos() + (3.0_f64 * 0.07).sin() * 5.0;
        assert!((c.angle - raw.rem_euclid(TAU)).abs() < 1e-12);
        assert!(f.cells().iter().all(|c| c.is_valid()));
    }

    #[test]
    fn procedural_origin_cell_angle_is_one() {
        // cos(0) + sin(0)·curve = 1 for any zoom and curve.
        let f = procedural(10, 10, 5, 0.3, 9.0).unwrap();
        assert!((f.cells()[0].angle - 1.0).abs() < 1e-12);
    }

    #[test]
    fn procedural_is_deterministic() {
        let a = procedural(120, 80, 4, 0.07, 5.0).unwrap();
        let b = procedural(120, 80, 4, 0.07, 5.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn procedural_rejects_zero_cell_size() {
        assert!(matches!(
            procedural(10, 10, 0, 0.1, 1.0),
            Err(EngineError::InvalidCellSize)
        ));
    }

    // -- noise --

    #[test]
    fn perlin_is_deterministic_per_seed_and_varies_across_seeds() {
        let a = perlin(100, 100, 5, 0.13, 7).unwrap();
        let b = perlin(100, 100, 5, 0.13, 7).unwrap();
        let c = perlin(100, 100, 5, 0.13, 8).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    // -- luminance --

    #[test]
    fn luminance_maps_white_black_and_gray() {
        let px = pixels_from(3, 1, |x, _| match x {
            0 => [255, 255, 255, 255],
            1 => [0, 0, 0, 255],
            _ => [255, 0, 0, 128],
        });
        let f = luminance(&px, 1).unwrap();
        assert!((f.cells()[0].angle - 6.28).abs() < 1e-12);
        assert_eq!(f.cells()[1].angle, 0.0);
        // gray = 85 → 85/255·2π = 2.0944 → 2.09
        assert!((f.cells()[2].angle - 2.09).abs() < 1e-12);
        assert!((f.cells()[2].opacity - 128.0 / 255.0).abs() < 1e-12);
    }

    #[test]
    fn luminance_transparent_pixels_are_invalid() {
        let px = pixels_from(4, 4, |_, _| [200, 200, 200, 0]);
        let f = luminance(&px, 2).unwrap();
        assert_eq!(f.len(), 4);
        assert_eq!(f.valid_count(), 0);
    }

    #[test]
    fn luminance_samples_cell_origin_at_stride() {
        // Only pixels at even coordinates are opaque; stride-2 sampling sees all opaque.
        let px = pixels_from(6, 6, |x, y| {
            if x % 2 == 0 && y % 2 == 0 {
                [0, 0, 0, 255]
            } else {
                [0, 0, 0, 0]
            }
        });
        let f = luminance(&px, 2).unwrap();
        assert_eq!(f.len(), 9);
        assert_eq!(f.valid_count(), 9);
    }

    #[test]
    fn luminance_grid_ignores_partial_cells() {
        let px = pixels_from(7, 5, |_, _| [0, 0, 0, 255]);
        let f = luminance(&px, 2).unwrap();
        assert_eq!((f.cols(), f.rows()), (3, 2));
    }

    // -- generate --

    #[test]
    fn generate_image_draws_reference_before_sampling() {
        let mut surface = RasterSurface::new(100, 100).unwrap();
        let strategy = FieldStrategy::ImageLuminance(Reference::new(
            "I",
            ReferencePaint::Solid(Srgb::WHITE),
        ));
        let f = strategy.generate(&mut surface, 5).unwrap();
        assert_eq!(f.len(), 400);
        let valid = f.valid_count();
        assert!(valid > 0 && valid < f.len(), "valid = {valid}");
        let center = f.cell_at(glam::DVec2::new(50.0, 50.0)).unwrap();
        assert!(center.is_valid());
        assert!((center.angle - 6.28).abs() < 1e-12);
    }

    #[test]
    fn generate_image_ignores_stale_surface_content() {
        let strategy = FieldStrategy::ImageLuminance(Reference::default());
        let mut clean = RasterSurface::new(80, 60).unwrap();
        let mut dirty = RasterSurface::new(80, 60).unwrap();
        dirty.stroke_polyline(
            &[glam::DVec2::new(0.0, 0.0), glam::DVec2::new(80.0, 60.0)],
            Srgb::WHITE,
            6.0,
        );
        assert_eq!(
            strategy.generate(&mut clean, 4).unwrap(),
            strategy.generate(&mut dirty, 4).unwrap()
        );
    }

    #[test]
    fn generate_procedural_leaves_surface_untouched() {
        let mut surface = RasterSurface::new(40, 40).unwrap();
        let strategy = FieldStrategy::Procedural {
            zoom: 0.07,
            curve: 5.0,
        };
        let f = strategy.generate(&mut surface, 5).unwrap();
        assert_eq!(f, procedural(40, 40, 5, 0.07, 5.0).unwrap());
        assert!(surface.snapshot().data().iter().all(|&b| b == 0));
    }

    #[test]
    fn strategy_names() {
        let p = FieldStrategy::Procedural {
            zoom: 0.1,
            curve: 1.0,
        };
        let n = FieldStrategy::Noise {
            scale: 0.1,
            seed: 1,
        };
        let i = FieldStrategy::ImageLuminance(Reference::default());
        assert_eq!((p.name(), n.name(), i.name()), ("procedural", "noise", "image"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn procedural_angles_in_range_and_repeatable(
                w in 1_usize..120,
                h in 1_usize..120,
                cell in 1_usize..12,
                zoom in -1.0_f64..1.0,
                curve in -10.0_f64..10.0,
            ) {
                let a = procedural(w, h, cell, zoom, curve).unwrap();
                let b = procedural(w, h, cell, zoom, curve).unwrap();
                prop_assert_eq!(&a, &b);
                prop_assert_eq!(a.len(), (w / cell) * (h / cell));
                for c in a.cells() {
                    prop_assert!((0.0..TAU).contains(&c.angle));
                }
            }

            #[test]
            fn luminance_angles_bounded(r: u8, g: u8, b: u8, a: u8) {
                let px = pixels_from(2, 2, |_, _| [r, g, b, a]);
                let f = luminance(&px, 1).unwrap();
                for c in f.cells() {
                    prop_assert!((0.0..=6.28).contains(&c.angle));
                    prop_assert_eq!(c.is_valid(), a > 0);
                }
            }
        }
    }
}

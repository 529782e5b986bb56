//! Reference content for the image-luminance field strategy.
//!
//! The reference is large gradient-filled text drawn across the surface.
//! Its pixels are sampled to build the field, so particles trace the
//! letterforms. It is also redrawn as an overlay in debug mode.

use glam::DVec2;

use crate::color::Srgb;
use crate::surface::{Gradient, Paint, Surface};

/// Text height as a fraction of surface height.
const FONT_SCALE: f64 = 0.9;
/// Maximum text width as a fraction of surface width.
const MAX_WIDTH_SCALE: f64 = 0.95;
/// Inner radius of the halo gradient, in pixels.
const HALO_INNER_RADIUS: f64 = 10.0;

/// Fill applied to the reference text.
#[derive(Debug, Clone, PartialEq)]
pub enum ReferencePaint {
    /// Diagonal yellow → crimson → cyan → cream.
    Sunrise,
    /// Diagonal red → green → dusty rose → cyan.
    Prism,
    /// Radial blue → lime → blue → black from the surface center.
    Halo,
    /// A single flat color.
    Solid(Srgb),
}

impl ReferencePaint {
    /// Parses `"sunrise" | "prism" | "halo"` or a hex color.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sunrise" => Some(ReferencePaint::Sunrise),
            "prism" => Some(ReferencePaint::Prism),
            "halo" => Some(ReferencePaint::Halo),
            hex => Srgb::from_hex(hex).ok().map(ReferencePaint::Solid),
        }
    }

    /// Resolves to a concrete paint for a `width × height` surface.
    pub fn paint(&self, width: f64, height: f64) -> Paint {
        let diagonal = || Gradient::linear(DVec2::ZERO, DVec2::new(width, height));
        match self {
            ReferencePaint::Sunrise => Paint::Gradient(
                diagonal()
                    .with_stop(0.2, Srgb::from_rgb8(255, 255, 0))
                    .with_stop(0.4, Srgb::from_rgb8(200, 5, 50))
                    .with_stop(0.6, Srgb::from_rgb8(150, 255, 255))
                    .with_stop(0.8, Srgb::from_rgb8(255, 255, 150)),
            ),
            ReferencePaint::Prism => Paint::Gradient(
                diagonal()
                    .with_stop(0.2, Srgb::from_rgb8(255, 0, 0))
                    .with_stop(0.4, Srgb::from_rgb8(0, 255, 0))
                    .with_stop(0.6, Srgb::from_rgb8(150, 100, 100))
                    .with_stop(0.8, Srgb::from_rgb8(0, 255, 255)),
            ),
            ReferencePaint::Halo => Paint::Gradient(
                Gradient::radial(
                    DVec2::new(width * 0.5, height * 0.5),
                    HALO_INNER_RADIUS,
                    width,
                )
                .with_stop(0.2, Srgb::from_rgb8(0, 0, 255))
                .with_stop(0.4, Srgb::from_rgb8(200, 255, 0))
                .with_stop(0.6, Srgb::from_rgb8(0, 0, 255))
                .with_stop(0.8, Srgb::from_rgb8(0, 0, 0)),
            ),
            ReferencePaint::Solid(c) => Paint::Solid(*c),
        }
    }
}

/// Text drawn centered on the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub text: String,
    pub paint: ReferencePaint,
}

impl Default for Reference {
    fn default() -> Self {
        Self {
            text: "JS".to_string(),
            paint: ReferencePaint::Halo,
        }
    }
}

impl Reference {
    pub fn new(text: impl Into<String>, paint: ReferencePaint) -> Self {
        Self {
            text: text.into(),
            paint,
        }
    }

    /// Draws the text centered, scaled to the surface.
    pub fn draw(&self, surface: &mut dyn Surface) {
        let w = surface.width() as f64;
        let h = surface.height() as f64;
        let paint = self.paint.paint(w, h);
        surface.fill_text(
            &self.text,
            DVec2::new(w * 0.5, h * 0.5),
            h * FONT_SCALE,
            w * MAX_WIDTH_SCALE,
            &paint,
        );
    }
}

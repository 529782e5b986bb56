//! Color palettes for particle strokes and field visualization.
//!
//! Particles pick one discrete stop at creation; the field visualizer
//! samples the palette continuously along `t`.

use crate::color::Srgb;
use crate::error::EngineError;
use crate::prng::Xorshift64;

/// Names accepted by [`Palette::from_name`].
const PALETTE_NAMES: &[&str] = &[
    "white",
    "ocean",
    "neon",
    "earth",
    "monochrome",
    "vapor",
    "fire",
];

/// An ordered list of sRGB color stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Srgb>,
}

impl Palette {
    /// Creates a palette from color stops. Requires at least one color.
    pub fn new(colors: Vec<Srgb>) -> Result<Self, EngineError> {
        if colors.is_empty() {
            return Err(EngineError::InvalidPalette(
                "palette requires at least 1 color".to_string(),
            ));
        }
        Ok(Self { colors })
    }

    /// Creates a palette by parsing hex color strings ("#rrggbb" or "rrggbb").
    pub fn from_hex<S: AsRef<str>>(hexes: &[S]) -> Result<Self, EngineError> {
        let colors = hexes
            .iter()
            .map(|h| Srgb::from_hex(h.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(colors)
    }

    /// Looks up a built-in palette by name.
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name {
            "white" => Ok(Self::white()),
            "ocean" => Ok(Self::ocean()),
            "neon" => Ok(Self::neon()),
            "earth" => Ok(Self::earth()),
            "monochrome" => Ok(Self::monochrome()),
            "vapor" => Ok(Self::vapor()),
            "fire" => Ok(Self::fire()),
            other => Err(EngineError::InvalidPalette(format!(
                "unknown palette '{other}' (expected one of: {})",
                PALETTE_NAMES.join(", ")
            ))),
        }
    }

    /// Names of all built-in palettes.
    pub fn list_names() -> &'static [&'static str] {
        PALETTE_NAMES
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false for a constructed palette.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Srgb] {
        &self.colors
    }

    /// Picks one stop uniformly at random.
    pub fn pick(&self, rng: &mut Xorshift64) -> Srgb {
        rng.pick(&self.colors).copied().unwrap_or(Srgb::WHITE)
    }

    /// Samples the palette at `t` in [0, 1] with linear interpolation
    /// between evenly spaced stops. `t` is clamped; NaN maps to 0.
    pub fn sample(&self, t: f64) -> Srgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let n = self.colors.len();
        if n == 1 {
            return self.colors[0];
        }
        let scaled = t * (n - 1) as f64;
        let idx = (scaled as usize).min(n - 2);
        let frac = scaled - idx as f64;
        self.colors[idx].lerp(self.colors[idx + 1], frac)
    }

    // -- Built-in palettes --

    /// Plain white strokes.
    pub fn white() -> Self {
        Self {
            colors: vec![Srgb::WHITE],
        }
    }

    /// Deep blues to cyan.
    pub fn ocean() -> Self {
        Self::from_hex(&["#001f3f", "#003366", "#005f73", "#0a9396", "#94d2bd"])
            .expect("ocean palette hex values are valid")
    }

    /// Vibrant pinks, greens, yellows.
    pub fn neon() -> Self {
        Self::from_hex(&["#ff00ff", "#00ff41", "#ffff00", "#ff0080", "#00ffff"])
            .expect("neon palette hex values are valid")
    }

    /// Browns, greens, golds.
    pub fn earth() -> Self {
        Self::from_hex(&["#5c4033", "#8b6914", "#6b8e23", "#daa520", "#d2b48c"])
            .expect("earth palette hex values are valid")
    }

    /// Black to white via grays.
    pub fn monochrome() -> Self {
        Self::from_hex(&["#000000", "#404040", "#808080", "#c0c0c0", "#ffffff"])
            .expect("monochrome palette hex values are valid")
    }

    /// Pastel purples, pinks, teals.
    pub fn vapor() -> Self {
        Self::from_hex(&["#7b2d8e", "#c77dff", "#ff9ebb", "#80ced6", "#a0e7e5"])
            .expect("vapor palette hex values are valid")
    }

    /// Reds, oranges, yellows.
    pub fn fire() -> Self {
        Self::from_hex(&["#800000", "#cc0000", "#ff4500", "#ff8c00", "#ffd700"])
            .expect("fire palette hex values are valid")
    }
}

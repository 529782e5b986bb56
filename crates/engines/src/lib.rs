#![deny(unsafe_code)]
//! Preset registry: maps preset names to configured particle systems and
//! provides CPU-side snapshot output.
//!
//! This crate sits between `flowfield-particles` (the simulation) and the
//! hosts. Both the CLI and the WASM bindings depend on it so the preset table
//! lives in one place.

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use flowfield_core::error::EngineError;
use flowfield_core::surface::Surface;
use flowfield_core::Engine;
use flowfield_particles::ParticleSystem;
use serde_json::{json, Map, Value};

/// All available preset names.
const PRESET_NAMES: &[&str] = &["spiral", "glyph", "noise"];

/// A configured flow-field scene.
///
/// Every variant wraps a [`ParticleSystem`]; presets differ only in the
/// defaults they layer under the user's params. Use
/// [`EngineKind::from_name`] for string-based construction (CLI, WASM).
pub enum EngineKind {
    /// Procedural cos/sin field, snap steering, unconditional respawn.
    Spiral(ParticleSystem),
    /// Image-luminance field traced from reference text, smoothed steering,
    /// bounded-retry respawn onto the letterforms.
    Glyph(ParticleSystem),
    /// Perlin field, smoothed steering, unconditional respawn.
    Noise(ParticleSystem),
}

impl EngineKind {
    /// Constructs a preset by name on a `width × height` surface.
    ///
    /// The surface is resized first. User `params` override the preset's
    /// defaults key by key. Returns `EngineError::UnknownPreset` if the name
    /// is not recognized.
    #[tracing::instrument(skip(params, surface))]
    pub fn from_name(
        name: &str,
        width: usize,
        height: usize,
        seed: u64,
        params: &Value,
        surface: &mut dyn Surface,
    ) -> Result<Self, EngineError> {
        let defaults = Self::preset_defaults(name)?;
        if !(params.is_object() || params.is_null()) {
            return Err(EngineError::invalid_param("params", "must be a JSON object"));
        }
        let merged = merge_params(defaults, params);
        surface.resize(width, height)?;
        let system = ParticleSystem::from_json(&merged, seed, surface)?;
        Ok(match name {
            "spiral" => EngineKind::Spiral(system),
            "glyph" => EngineKind::Glyph(system),
            _ => EngineKind::Noise(system),
        })
    }

    /// Default params a preset layers under user overrides.
    pub fn preset_defaults(name: &str) -> Result<Value, EngineError> {
        match name {
            "spiral" => Ok(json!({
                "strategy": "procedural",
                "steering": "snap",
                "respawn": "unconditional",
            })),
            "glyph" => Ok(json!({
                "strategy": "image",
                "steering": "smoothed",
                "respawn": "bounded_retry",
                "reference_paint": "halo",
            })),
            "noise" => Ok(json!({
                "strategy": "noise",
                "steering": "smoothed",
                "respawn": "unconditional",
                "palette": "ocean",
            })),
            _ => Err(EngineError::UnknownPreset(name.to_string())),
        }
    }

    /// One-line description of a preset, for listings.
    pub fn describe(name: &str) -> Option<&'static str> {
        match name {
            "spiral" => Some("procedural cos/sin field with snapped headings"),
            "glyph" => Some("particles tracing the luminance of large reference text"),
            "noise" => Some("seeded Perlin noise field with smoothed headings"),
            _ => None,
        }
    }

    /// Returns a slice of all recognized preset names.
    pub fn list_presets() -> &'static [&'static str] {
        PRESET_NAMES
    }

    /// Name of the preset this engine was built from.
    pub fn preset_name(&self) -> &'static str {
        match self {
            EngineKind::Spiral(_) => "spiral",
            EngineKind::Glyph(_) => "glyph",
            EngineKind::Noise(_) => "noise",
        }
    }

    /// The underlying particle system.
    pub fn system(&self) -> &ParticleSystem {
        match self {
            EngineKind::Spiral(s) | EngineKind::Glyph(s) | EngineKind::Noise(s) => s,
        }
    }

    fn system_mut(&mut self) -> &mut ParticleSystem {
        match self {
            EngineKind::Spiral(s) | EngineKind::Glyph(s) | EngineKind::Noise(s) => s,
        }
    }
}

/// Overlays the keys of `overrides` onto `defaults`. A null `overrides`
/// leaves the defaults untouched.
fn merge_params(defaults: Value, overrides: &Value) -> Value {
    let mut merged: Map<String, Value> = match defaults {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    if let Some(obj) = overrides.as_object() {
        for (k, v) in obj {
            merged.insert(k.clone(), v.clone());
        }
    }
    Value::Object(merged)
}

impl Engine for EngineKind {
    fn render(&mut self, surface: &mut dyn Surface) -> Result<(), EngineError> {
        self.system_mut().render(surface)
    }

    fn resize(
        &mut self,
        width: usize,
        height: usize,
        surface: &mut dyn Surface,
    ) -> Result<(), EngineError> {
        self.system_mut().resize(width, height, surface)
    }

    fn toggle_debug(&mut self) {
        self.system_mut().toggle_debug();
    }

    fn debug(&self) -> bool {
        self.system().debug()
    }

    fn params(&self) -> Value {
        self.system().params()
    }

    fn param_schema(&self) -> Value {
        self.system().param_schema()
    }
}

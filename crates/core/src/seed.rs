//! Reproducible description of a flow-field scene.
//!
//! A [`Seed`] captures everything needed to recreate a rendered frame:
//! preset name, surface dimensions, parameter overrides, PRNG seed, and the
//! number of animation frames to run.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Reproducible description of a flow-field scene.
///
/// Two identical `Seed` values fed to the same binary produce bit-identical
/// frames on the raster surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seed {
    pub preset: String,
    pub width: usize,
    pub height: usize,
    #[serde(default = "empty_params")]
    pub params: serde_json::Value,
    pub seed: u64,
    #[serde(default)]
    pub frames: usize,
}

fn empty_params() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Seed {
    /// Creates a new Seed with default params (`{}`) and zero frames.
    pub fn new(preset: &str, width: usize, height: usize, seed: u64) -> Self {
        Self {
            preset: preset.to_string(),
            width,
            height,
            params: empty_params(),
            seed,
            frames: 0,
        }
    }

    /// Validates non-zero dimensions, that `width * height * 4` (the RGBA
    /// buffer size) does not overflow, and that `params` is a JSON object.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .and_then(|n| n.checked_mul(4))
            .ok_or(EngineError::InvalidDimensions)?;
        if !self.params.is_object() {
            return Err(EngineError::invalid_param("params", "must be a JSON object"));
        }
        Ok(())
    }
}

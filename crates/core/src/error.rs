//! Error types for the flowfield core.

use thiserror::Error;

/// Errors produced while building fields, surfaces and particle systems.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Width or height was zero (or overflowed) when creating a surface or field.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// The flow-field cell size was zero.
    #[error("invalid cell size: must be at least 1 pixel")]
    InvalidCellSize,

    /// A configuration value was present but unusable.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParam { name: String, reason: String },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A palette could not be constructed from the given colors.
    #[error("invalid palette: {0}")]
    InvalidPalette(String),

    /// The drawing surface rejected an operation (e.g. pixel read-back).
    #[error("surface error: {0}")]
    Surface(String),

    /// A preset name was not recognized by the engine registry.
    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    /// File output failed.
    #[error("i/o error: {0}")]
    Io(String),
}

impl EngineError {
    /// Shorthand for [`EngineError::InvalidParam`].
    pub fn invalid_param(name: &str, reason: impl Into<String>) -> Self {
        EngineError::InvalidParam {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

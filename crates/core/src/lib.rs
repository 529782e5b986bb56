#![deny(unsafe_code)]
//! Core types and traits for the flowfield renderer.
//!
//! Provides the `Engine` trait, the `VectorField` grid and its `FieldStrategy`
//! generators, the `Surface` drawing interface with a CPU `RasterSurface`
//! implementation, color types, `Palette`, the `Xorshift64` PRNG, `Seed`, and
//! parameter helpers.

pub mod color;
pub mod engine;
pub mod error;
pub mod field;
pub mod field_source;
pub mod glyphs;
pub mod palette;
pub mod params;
pub mod prng;
pub mod raster;
pub mod reference;
pub mod seed;
pub mod surface;

pub use color::Srgb;
pub use engine::Engine;
pub use error::EngineError;
pub use field::{Cell, VectorField};
pub use field_source::FieldStrategy;
pub use palette::Palette;
pub use prng::Xorshift64;
pub use raster::RasterSurface;
pub use reference::{Reference, ReferencePaint};
pub use seed::Seed;
pub use surface::{Gradient, Paint, PixelBuffer, Surface};

#![deny(unsafe_code)]
//! Flow-field particle-trail simulation.
//!
//! A [`ParticleSystem`] builds a steering-angle grid with one of the
//! `FieldStrategy` generators, then drives a fixed pool of [`Particle`]s
//! across it. Every frame each particle strokes its trail, steers toward the
//! angle of the cell under it, moves, and eventually drains its trail and
//! respawns somewhere else. The system implements `Engine`, so hosts drive it
//! with `clear` + `render` once per frame.

pub mod params;
pub mod particle;
pub mod system;

pub use params::{FieldKind, FlowFieldParams, Respawn, Steering};
pub use particle::Particle;
pub use system::ParticleSystem;

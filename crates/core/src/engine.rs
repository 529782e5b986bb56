//! The `Engine` trait every frame-driven renderer implements.
//!
//! The trait is object-safe so hosts (CLI, browser) can hold a
//! `Box<dyn Engine>` and drive whichever preset was selected at runtime.

use serde_json::Value;

use crate::error::EngineError;
use crate::surface::Surface;

/// A frame-driven renderer that draws onto a host-provided [`Surface`].
///
/// Hosts call [`Surface::clear`] and then [`Engine::render`] once per frame.
/// Input events arrive as [`Engine::resize`] and [`Engine::toggle_debug`].
pub trait Engine {
    /// Draws one frame and advances the simulation by one step.
    fn render(&mut self, surface: &mut dyn Surface) -> Result<(), EngineError>;

    /// Resizes the surface and rebuilds all derived state for the new size.
    fn resize(
        &mut self,
        width: usize,
        height: usize,
        surface: &mut dyn Surface,
    ) -> Result<(), EngineError>;

    /// Flips the debug overlay. Touches nothing else.
    fn toggle_debug(&mut self);

    /// Whether the debug overlay is on.
    fn debug(&self) -> bool;

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all available parameters, their types, ranges, and defaults.
    fn param_schema(&self) -> Value;
}

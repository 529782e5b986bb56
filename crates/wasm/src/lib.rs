#![deny(unsafe_code)]
//! WASM bindings: drive a flowfield preset on a browser `<canvas>`.
//!
//! The page owns the frame loop. It calls [`FlowFieldApp::frame`] from
//! `requestAnimationFrame`, and forwards key presses and window resizes to
//! [`FlowFieldApp::toggle_debug`] and [`FlowFieldApp::resize`].

mod canvas;

pub use canvas::CanvasSurface;

use flowfield_core::{Engine, EngineError, Surface};
use flowfield_engines::EngineKind;
use serde_json::{json, Value};
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

fn to_js(e: EngineError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Parses a params string from JS. Empty means no overrides.
fn parse_params(text: &str) -> Result<Value, String> {
    if text.trim().is_empty() {
        return Ok(json!({}));
    }
    let v: Value = serde_json::from_str(text).map_err(|e| format!("invalid params JSON: {e}"))?;
    if v.is_object() {
        Ok(v)
    } else {
        Err("params must be a JSON object".to_string())
    }
}

/// A preset bound to a canvas.
#[wasm_bindgen]
pub struct FlowFieldApp {
    engine: EngineKind,
    surface: CanvasSurface,
}

#[wasm_bindgen]
impl FlowFieldApp {
    /// Builds `preset` at the canvas's current size.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: HtmlCanvasElement,
        preset: &str,
        seed: u32,
        params: &str,
    ) -> Result<FlowFieldApp, JsValue> {
        let params = parse_params(params).map_err(|e| JsValue::from_str(&e))?;
        let mut surface = CanvasSurface::new(canvas).map_err(to_js)?;
        let (width, height) = (surface.width(), surface.height());
        let engine = EngineKind::from_name(
            preset,
            width,
            height,
            u64::from(seed),
            &params,
            &mut surface,
        )
        .map_err(to_js)?;
        Ok(Self { engine, surface })
    }

    /// One animation tick: clear, then render.
    pub fn frame(&mut self) -> Result<(), JsValue> {
        self.surface.clear();
        self.engine.render(&mut self.surface).map_err(to_js)
    }

    pub fn toggle_debug(&mut self) {
        self.engine.toggle_debug();
    }

    pub fn debug(&self) -> bool {
        self.engine.debug()
    }

    /// Resizes the canvas and rebuilds the field and particles.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), JsValue> {
        self.engine
            .resize(width as usize, height as usize, &mut self.surface)
            .map_err(to_js)
    }

    /// Current params as a JSON string.
    pub fn params(&self) -> String {
        self.engine.params().to_string()
    }

    /// Param schema as a JSON string.
    pub fn param_schema(&self) -> String {
        self.engine.param_schema().to_string()
    }
}

/// Preset names as a JSON array string.
#[wasm_bindgen]
pub fn presets() -> String {
    json!(EngineKind::list_presets()).to_string()
}

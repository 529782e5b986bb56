//! [`Surface`] over a browser 2D canvas context.

use flowfield_core::color::Srgb;
use flowfield_core::error::EngineError;
use flowfield_core::surface::{Gradient, GradientKind, Paint, PixelBuffer, Surface};
use glam::DVec2;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasGradient, CanvasRenderingContext2d, HtmlCanvasElement};

/// Font family for reference text.
const FONT_FAMILY: &str = "Verdana";

fn js_err(context: &str, v: JsValue) -> EngineError {
    EngineError::Surface(format!("{context}: {v:?}"))
}

/// A canvas element and its 2D context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, EngineError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| js_err("get_context", e))?
            .ok_or_else(|| EngineError::Surface("2d context unavailable".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| EngineError::Surface("context is not a CanvasRenderingContext2d".into()))?;
        Ok(Self { canvas, ctx })
    }

    fn gradient(&self, g: &Gradient) -> Result<CanvasGradient, EngineError> {
        let cg = match g.kind {
            GradientKind::Linear { start, end } => {
                self.ctx
                    .create_linear_gradient(start.x, start.y, end.x, end.y)
            }
            GradientKind::Radial { center, inner, outer } => self
                .ctx
                .create_radial_gradient(center.x, center.y, inner, center.x, center.y, outer)
                .map_err(|e| js_err("create_radial_gradient", e))?,
        };
        for stop in g.stops() {
            cg.add_color_stop(stop.offset as f32, &stop.color.to_hex())
                .map_err(|e| js_err("add_color_stop", e))?;
        }
        Ok(cg)
    }

    fn set_fill(&self, paint: &Paint) -> Result<(), EngineError> {
        match paint {
            Paint::Solid(c) => self.ctx.set_fill_style_str(&c.to_hex()),
            Paint::Gradient(g) => self.ctx.set_fill_style_canvas_gradient(&self.gradient(g)?),
        }
        Ok(())
    }
}

impl Surface for CanvasSurface {
    fn width(&self) -> usize {
        self.canvas.width() as usize
    }

    fn height(&self) -> usize {
        self.canvas.height() as usize
    }

    fn resize(&mut self, width: usize, height: usize) -> Result<(), EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        let w = u32::try_from(width).map_err(|_| EngineError::InvalidDimensions)?;
        let h = u32::try_from(height).map_err(|_| EngineError::InvalidDimensions)?;
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        Ok(())
    }

    fn clear(&mut self) {
        self.ctx
            .clear_rect(0.0, 0.0, self.canvas.width() as f64, self.canvas.height() as f64);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, p: DVec2) {
        self.ctx.move_to(p.x, p.y);
    }

    fn line_to(&mut self, p: DVec2) {
        self.ctx.line_to(p.x, p.y);
    }

    fn stroke(&mut self, color: Srgb, line_width: f64) {
        self.ctx.set_stroke_style_str(&color.to_hex());
        self.ctx.set_line_width(line_width);
        self.ctx.stroke();
    }

    fn fill_text(
        &mut self,
        text: &str,
        center: DVec2,
        font_size: f64,
        max_width: f64,
        paint: &Paint,
    ) {
        if let Err(e) = self.set_fill(paint) {
            tracing::warn!(error = %e, "text fill unavailable, skipping");
            return;
        }
        self.ctx.set_font(&format!("{font_size}px {FONT_FAMILY}"));
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        if let Err(e) = self.ctx.fill_text_with_max_width(text, center.x, center.y, max_width) {
            tracing::warn!(error = ?e, "fill_text failed");
        }
    }

    fn read_pixels(
        &mut self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Result<PixelBuffer, EngineError> {
        let image = self
            .ctx
            .get_image_data(x as f64, y as f64, width as f64, height as f64)
            .map_err(|e| js_err("get_image_data", e))?;
        PixelBuffer::from_raw(width, height, image.data().0)
    }
}

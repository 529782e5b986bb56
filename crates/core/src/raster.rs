//! CPU implementation of [`Surface`] on top of `vello_cpu`.
//!
//! Drawing calls are recorded into a [`RenderContext`] and rasterized into a
//! premultiplied [`Pixmap`] only when pixels are read back. Read-back converts
//! to straight-alpha RGBA8, the layout a browser canvas hands out.

use std::fmt;

use glam::DVec2;
use vello_cpu::kurbo::{self, BezPath, Cap, Join, Stroke};
use vello_cpu::peniko::{self, Color};
use vello_cpu::{Pixmap, RenderContext};

use crate::color::Srgb;
use crate::error::EngineError;
use crate::glyphs::{self, ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::surface::{Gradient, GradientKind, Paint, PixelBuffer, Surface};

/// Canvas 2D default miter limit.
const MITER_LIMIT: f64 = 10.0;

/// Software drawing surface.
pub struct RasterSurface {
    width: u16,
    height: u16,
    ctx: RenderContext,
    pixmap: Pixmap,
    /// Drawing recorded since the pixmap was last rendered.
    stale: bool,
    path: BezPath,
    /// False until the current subpath has a finite start point.
    pen_down: bool,
}

impl fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stale", &self.stale)
            .finish_non_exhaustive()
    }
}

fn pixmap_dims(width: usize, height: usize) -> Result<(u16, u16), EngineError> {
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidDimensions);
    }
    let w = u16::try_from(width).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u16::try_from(height).map_err(|_| EngineError::InvalidDimensions)?;
    Ok((w, h))
}

fn to_point(p: DVec2) -> kurbo::Point {
    kurbo::Point::new(p.x, p.y)
}

fn to_color(c: Srgb) -> Color {
    let [r, g, b, a] = c.to_rgba8();
    Color::from_rgba8(r, g, b, a)
}

/// Canvas-style gradient. `None` when there are no stops, which canvas
/// treats as transparent.
fn to_gradient(g: &Gradient) -> Option<peniko::Gradient> {
    if g.stops().is_empty() {
        return None;
    }
    let stops: Vec<(f32, Color)> = g
        .stops()
        .iter()
        .map(|s| (s.offset as f32, to_color(s.color)))
        .collect();
    let base = match g.kind {
        GradientKind::Linear { start, end } => {
            peniko::Gradient::new_linear(to_point(start), to_point(end))
        }
        GradientKind::Radial {
            center,
            inner,
            outer,
        } => peniko::Gradient::new_two_point_radial(
            to_point(center),
            inner as f32,
            to_point(center),
            outer as f32,
        ),
    };
    Some(base.with_stops(stops.as_slice()))
}

/// Straight-alpha copy of premultiplied RGBA8.
fn unpremultiply(premul: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(premul.len());
    for px in premul.chunks_exact(4) {
        let a = px[3];
        match a {
            0 => out.extend_from_slice(&[0, 0, 0, 0]),
            255 => out.extend_from_slice(px),
            _ => {
                let a16 = u16::from(a);
                for &c in &px[..3] {
                    let straight = (u16::from(c) * 255 + a16 / 2) / a16;
                    out.push(straight.min(255) as u8);
                }
                out.push(a);
            }
        }
    }
    out
}

/// Axis-aligned rectangles covering the inked font units of `text`, laid
/// out centered on `center`. Width and height scale independently so a
/// binding `max_width` squeezes the text horizontally only.
fn glyph_path(text: &str, center: DVec2, font_size: f64, max_width: f64) -> Option<BezPath> {
    let units = glyphs::text_units(text);
    if units == 0 || font_size.is_nan() || font_size <= 0.0 || !center.is_finite() {
        return None;
    }
    let unit_y = font_size / GLYPH_HEIGHT as f64;
    let mut unit_x = unit_y;
    if max_width > 0.0 && unit_x * units as f64 > max_width {
        unit_x = max_width / units as f64;
    }
    let left = center.x - unit_x * units as f64 / 2.0;
    let top = center.y - font_size / 2.0;

    let mut path = BezPath::new();
    for (i, c) in text.chars().enumerate() {
        let g = glyphs::glyph(c);
        for row in 0..GLYPH_HEIGHT {
            for col in 0..GLYPH_WIDTH {
                if !glyphs::is_set(&g, col, row) {
                    continue;
                }
                let x0 = left + (i * ADVANCE + col) as f64 * unit_x;
                let y0 = top + row as f64 * unit_y;
                let (x1, y1) = (x0 + unit_x, y0 + unit_y);
                path.move_to((x0, y0));
                path.line_to((x1, y0));
                path.line_to((x1, y1));
                path.line_to((x0, y1));
                path.close_path();
            }
        }
    }
    Some(path)
}

impl RasterSurface {
    /// Creates a transparent surface.
    ///
    /// Returns `EngineError::InvalidDimensions` if either dimension is zero
    /// or exceeds `u16::MAX`.
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        let (w, h) = pixmap_dims(width, height)?;
        Ok(Self {
            width: w,
            height: h,
            ctx: RenderContext::new(w, h),
            pixmap: Pixmap::new(w, h),
            stale: false,
            path: BezPath::new(),
            pen_down: false,
        })
    }

    /// Rasterizes pending drawing.
    fn pixmap(&mut self) -> &Pixmap {
        if self.stale {
            let mut pixmap = Pixmap::new(self.width, self.height);
            self.ctx.flush();
            self.ctx.render_to_pixmap(&mut pixmap);
            self.pixmap = pixmap;
            self.stale = false;
        }
        &self.pixmap
    }

    /// Straight-alpha copy of the whole surface.
    pub fn snapshot(&mut self) -> PixelBuffer {
        let (w, h) = (usize::from(self.width), usize::from(self.height));
        let data = unpremultiply(self.pixmap().data_as_u8_slice());
        PixelBuffer::from_parts(w, h, data)
    }
}

impl Surface for RasterSurface {
    fn width(&self) -> usize {
        usize::from(self.width)
    }

    fn height(&self) -> usize {
        usize::from(self.height)
    }

    fn resize(&mut self, width: usize, height: usize) -> Result<(), EngineError> {
        *self = RasterSurface::new(width, height)?;
        Ok(())
    }

    fn clear(&mut self) {
        self.ctx = RenderContext::new(self.width, self.height);
        self.pixmap = Pixmap::new(self.width, self.height);
        self.stale = false;
    }

    fn begin_path(&mut self) {
        self.path = BezPath::new();
        self.pen_down = false;
    }

    fn move_to(&mut self, p: DVec2) {
        if p.is_finite() {
            self.path.move_to(to_point(p));
            self.pen_down = true;
        } else {
            self.pen_down = false;
        }
    }

    fn line_to(&mut self, p: DVec2) {
        if !p.is_finite() {
            self.pen_down = false;
        } else if self.pen_down {
            self.path.line_to(to_point(p));
        } else {
            self.move_to(p);
        }
    }

    fn stroke(&mut self, color: Srgb, line_width: f64) {
        if self.path.elements().is_empty() || !(line_width > 0.0 && line_width.is_finite()) {
            return;
        }
        let style = Stroke::new(line_width)
            .with_caps(Cap::Butt)
            .with_join(Join::Miter)
            .with_miter_limit(MITER_LIMIT);
        self.ctx.set_stroke(style);
        self.ctx.set_paint(to_color(color));
        self.ctx.stroke_path(&self.path);
        self.stale = true;
    }

    fn fill_text(
        &mut self,
        text: &str,
        center: DVec2,
        font_size: f64,
        max_width: f64,
        paint: &Paint,
    ) {
        let Some(path) = glyph_path(text, center, font_size, max_width) else {
            return;
        };
        match paint {
            Paint::Solid(c) => self.ctx.set_paint(to_color(*c)),
            Paint::Gradient(g) => match to_gradient(g) {
                Some(gradient) => self.ctx.set_paint(gradient),
                None => return,
            },
        }
        self.ctx.fill_path(&path);
        self.stale = true;
    }

    fn read_pixels(
        &mut self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Result<PixelBuffer, EngineError> {
        let len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .filter(|&n| n > 0)
            .ok_or(EngineError::InvalidDimensions)?;
        let (sw, sh) = (usize::from(self.width), usize::from(self.height));
        let src = self.pixmap().data_as_u8_slice();
        let mut out = vec![0u8; len];
        for row in 0..height {
            let sy = y + row;
            if sy >= sh || x >= sw {
                continue;
            }
            let cols = width.min(sw - x);
            let from = (sy * sw + x) * 4;
            let to = row * width * 4;
            out[to..to + cols * 4].copy_from_slice(&src[from..from + cols * 4]);
        }
        PixelBuffer::from_raw(width, height, unpremultiply(&out))
    }
}

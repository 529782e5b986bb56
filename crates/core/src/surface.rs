//! The drawing-surface interface consumed by the particle system.
//!
//! A [`Surface`] exposes only what the renderer needs: clearing, a
//! canvas-style path API for stroked polylines, gradient-filled text for the
//! reference content, and RGBA read-back for luminance sampling. Hosts
//! implement it over whatever they draw on (the CPU
//! [`RasterSurface`](crate::raster::RasterSurface), a browser canvas).

use glam::DVec2;

use crate::color::Srgb;
use crate::error::EngineError;

/// Color stop along a gradient, `offset` in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f64,
    pub color: Srgb,
}

/// Gradient geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientKind {
    /// Projects points onto the segment `start → end`.
    Linear { start: DVec2, end: DVec2 },
    /// Concentric circles around `center`, from `inner` to `outer` radius.
    Radial { center: DVec2, inner: f64, outer: f64 },
}

/// A gradient paint with canvas semantics: positions before the first stop
/// take the first stop's color, after the last stop the last stop's color.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub kind: GradientKind,
    stops: Vec<ColorStop>,
}

impl Gradient {
    pub fn linear(start: DVec2, end: DVec2) -> Self {
        Self {
            kind: GradientKind::Linear { start, end },
            stops: Vec::new(),
        }
    }

    pub fn radial(center: DVec2, inner: f64, outer: f64) -> Self {
        Self {
            kind: GradientKind::Radial {
                center,
                inner,
                outer,
            },
            stops: Vec::new(),
        }
    }

    /// Adds a color stop (builder style). Offsets are clamped to [0, 1] and
    /// kept sorted; equal offsets keep insertion order.
    pub fn with_stop(mut self, offset: f64, color: Srgb) -> Self {
        let offset = offset.clamp(0.0, 1.0);
        let at = self.stops.partition_point(|s| s.offset <= offset);
        self.stops.insert(at, ColorStop { offset, color });
        self
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }
}

/// Fill style for text.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Srgb),
    Gradient(Gradient),
}

/// Row-major RGBA8 pixels read back from a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wraps raw RGBA bytes, checking `data.len() == width * height * 4`.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, EngineError> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or(EngineError::InvalidDimensions)?;
        if data.len() != expected {
            return Err(EngineError::Surface(format!(
                "pixel buffer holds {} bytes, expected {expected} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// For callers that already hold a correctly sized buffer.
    pub(crate) fn from_parts(width: usize, height: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height * 4);
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// RGBA at `(x, y)`, `None` outside the buffer.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }
}

/// Drawing surface primitives used by the particle system.
///
/// The trait is object-safe; the system only ever sees `&mut dyn Surface`.
pub trait Surface {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Changes the surface dimensions. Content is discarded.
    fn resize(&mut self, width: usize, height: usize) -> Result<(), EngineError>;

    /// Clears the whole surface to transparent.
    fn clear(&mut self);

    /// Starts a new, empty path.
    fn begin_path(&mut self);

    /// Begins a new subpath at `p`.
    fn move_to(&mut self, p: DVec2);

    /// Adds a straight segment from the current point to `p`.
    fn line_to(&mut self, p: DVec2);

    /// Strokes the current path.
    fn stroke(&mut self, color: Srgb, line_width: f64);

    /// Fills `text` centered on `center` at `font_size` pixels tall. Text
    /// wider than `max_width` is squeezed horizontally to fit.
    fn fill_text(
        &mut self,
        text: &str,
        center: DVec2,
        font_size: f64,
        max_width: f64,
        paint: &Paint,
    );

    /// Reads back straight-alpha RGBA pixels of a rectangle, flushing any
    /// pending drawing first. Regions extending past the surface edge read
    /// as transparent black.
    fn read_pixels(
        &mut self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Result<PixelBuffer, EngineError>;

    /// Strokes a polyline through `points` in one path. Fewer than two points
    /// draw nothing.
    fn stroke_polyline(&mut self, points: &[DVec2], color: Srgb, line_width: f64) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        if rest.is_empty() {
            return;
        }
        self.begin_path();
        self.move_to(*first);
        for p in rest {
            self.line_to(*p);
        }
        self.stroke(color, line_width);
    }
}

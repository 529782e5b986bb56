//! The steering-angle grid that particles read every frame.
//!
//! A [`VectorField`] covers a `width × height` pixel surface with
//! `rows × cols` square cells of `cell_size` pixels, stored row-major.
//! Pixels past the last whole cell (the right and bottom remainders) are not
//! covered; lookups there report no cell.

use std::f64::consts::TAU;

use glam::DVec2;

use crate::error::EngineError;

/// One grid unit of the flow field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    /// Pixel x of the cell origin (`col * cell_size`).
    pub x: f64,
    /// Pixel y of the cell origin (`row * cell_size`).
    pub y: f64,
    /// Steering angle in radians, in [0, 2π).
    pub angle: f64,
    /// Spawn weight in [0, 1]; the cell is a valid spawn point when > 0.
    pub opacity: f64,
}

impl Cell {
    /// Whether particles may respawn here.
    pub fn is_valid(&self) -> bool {
        self.opacity > 0.0
    }

    /// Cell origin as a point.
    pub fn origin(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

/// Wraps any finite angle into [0, 2π). Non-finite input maps to 0.
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let a = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if a >= TAU {
        0.0
    } else {
        a
    }
}

/// Grid of steering cells. Immutable once built; regenerate to change it.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorField {
    cell_size: usize,
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl VectorField {
    /// Computes `(rows, cols)` for a surface: `floor(height / cell_size)`
    /// and `floor(width / cell_size)`.
    pub fn grid_dims(
        width: usize,
        height: usize,
        cell_size: usize,
    ) -> Result<(usize, usize), EngineError> {
        if cell_size == 0 {
            return Err(EngineError::InvalidCellSize);
        }
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        Ok((height / cell_size, width / cell_size))
    }

    /// Builds a field by evaluating `cell_at(col, row)` for every cell in
    /// row-major order. The closure returns `(angle, opacity)`; angles are
    /// normalized into [0, 2π) and opacity clamped to [0, 1].
    pub fn from_fn<F>(
        width: usize,
        height: usize,
        cell_size: usize,
        mut cell_at: F,
    ) -> Result<Self, EngineError>
    where
        F: FnMut(usize, usize) -> (f64, f64),
    {
        let (rows, cols) = Self::grid_dims(width, height, cell_size)?;
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let (angle, opacity) = cell_at(col, row);
                cells.push(Cell {
                    x: (col * cell_size) as f64,
                    y: (row * cell_size) as f64,
                    angle: normalize_angle(angle),
                    opacity: if opacity.is_nan() {
                        0.0
                    } else {
                        opacity.clamp(0.0, 1.0)
                    },
                });
            }
        }
        Ok(Self {
            cell_size,
            rows,
            cols,
            cells,
        })
    }

    pub fn cell_size(&self) -> usize {
        self.cell_size
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells (`rows * cols`).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when the surface is smaller than one cell in either direction.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell by flat index.
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Flat index of the cell containing pixel position `p`:
    /// `floor(y / cell_size) * cols + floor(x / cell_size)`.
    ///
    /// Returns `None` when `p` is non-finite or lies outside the grid,
    /// including the uncovered right and bottom remainders.
    pub fn index_of(&self, p: DVec2) -> Option<usize> {
        if !p.is_finite() || p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        let size = self.cell_size as f64;
        let col = (p.x / size).floor();
        let row = (p.y / size).floor();
        if col >= self.cols as f64 || row >= self.rows as f64 {
            return None;
        }
        Some(row as usize * self.cols + col as usize)
    }

    /// The cell containing `p`, if any.
    pub fn cell_at(&self, p: DVec2) -> Option<&Cell> {
        self.index_of(p).and_then(|i| self.cells.get(i))
    }

    /// Number of cells particles may respawn in.
    pub fn valid_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_valid()).count()
    }
}

//! Density grid produced by point aggregation.

use serde::{Deserialize, Serialize};

/// A datum position: `[x, y, z]` (longitude, latitude, altitude for geographic data).
pub type Position = [f64; 3];

/// Number of columns and rows in an aggregation grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub cols: usize,
    pub rows: usize,
}

impl GridSize {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self { cols, rows }
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cols * self.rows
    }

    /// Check if the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.cols == 0 || self.rows == 0
    }
}

/// Output of one aggregation pass.
///
/// `counts` is row-major: row 0 is the southernmost row, column 0 the
/// westernmost. Cell `(col, row)` spans
/// `origin + [col, row] * cell_offset` to `origin + [col + 1, row + 1] * cell_offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityGrid {
    /// Per-cell point counts
    pub counts: Vec<f32>,
    /// Largest value in `counts`
    pub max_count: f32,
    /// Grid dimensions
    pub size: GridSize,
    /// World coordinate of the lower-left corner of cell (0, 0)
    pub origin: [f64; 2],
    /// World-unit size of one cell in x and y
    pub cell_offset: [f64; 2],
}

impl DensityGrid {
    /// A grid with every count at zero.
    pub fn zeroed(size: GridSize, origin: [f64; 2], cell_offset: [f64; 2]) -> Self {
        Self {
            counts: vec![0.0; size.len()],
            max_count: 0.0,
            size,
            origin,
            cell_offset,
        }
    }

    /// Get the 1D array index for a 2D grid position.
    pub fn flat_index(&self, col: usize, row: usize) -> usize {
        row * self.size.cols + col
    }

    /// Count stored in a cell, `None` when out of range.
    pub fn count(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.size.cols || row >= self.size.rows {
            return None;
        }
        self.counts.get(self.flat_index(col, row)).copied()
    }

    /// World coordinate of a cell's center.
    pub fn cell_center(&self, col: usize, row: usize) -> [f64; 2] {
        [
            self.origin[0] + (col as f64 + 0.5) * self.cell_offset[0],
            self.origin[1] + (row as f64 + 0.5) * self.cell_offset[1],
        ]
    }

    /// Sum of all counts.
    pub fn total_count(&self) -> f64 {
        self.counts.iter().map(|&c| c as f64).sum()
    }

    /// True when no cell holds a point.
    pub fn is_all_zero(&self) -> bool {
        self.counts.iter().all(|&c| c == 0.0)
    }
}

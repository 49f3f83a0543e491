//! Contour line (isoline) extraction using the marching squares algorithm.
//!
//! [`march_squares`] works in grid space on a plain row-major value array.
//! [`generate_contours`] runs it over an aggregated [`DensityGrid`] for each
//! threshold and returns world-space segments tagged with their threshold.

use contour_common::DensityGrid;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A point in grid space (column, row)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A line segment between two grid-space points
#[derive(Debug, Clone)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// A world-space contour segment produced for one threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourSegment {
    pub start: [f64; 2],
    pub end: [f64; 2],
    pub threshold: f64,
}

/// Marching squares algorithm to generate contour lines
///
/// # Arguments
/// * `data` - Grid data in row-major order
/// * `width` - Grid width
/// * `height` - Grid height
/// * `level` - Contour level to extract
///
/// # Returns
/// Vector of line segments representing the contour
pub fn march_squares(data: &[f32], width: usize, height: usize, level: f32) -> Vec<Segment> {
    if width < 2 || height < 2 || data.len() != width * height {
        return vec![];
    }

    let mut segments = Vec::new();

    for y in 0..(height - 1) {
        for x in 0..(width - 1) {
            let tl = data[y * width + x];
            let tr = data[y * width + x + 1];
            let bl = data[(y + 1) * width + x];
            let br = data[(y + 1) * width + x + 1];

            // Skip cells with NaN values
            if tl.is_nan() || tr.is_nan() || bl.is_nan() || br.is_nan() {
                continue;
            }

            // Cell index (0-15) from which corners are at or above the level
            let mut cell_index = 0;
            if tl >= level {
                cell_index |= 1;
            }
            if tr >= level {
                cell_index |= 2;
            }
            if br >= level {
                cell_index |= 4;
            }
            if bl >= level {
                cell_index |= 8;
            }

            push_cell_segments(
                &mut segments,
                cell_index,
                x as f32,
                y as f32,
                [tl, tr, br, bl],
                level,
            );
        }
    }

    segments
}

/// Append the segments for one marching squares cell.
///
/// `corners` is `[top-left, top-right, bottom-right, bottom-left]`.
fn push_cell_segments(
    segments: &mut Vec<Segment>,
    cell_index: u8,
    x: f32,
    y: f32,
    corners: [f32; 4],
    level: f32,
) {
    let [tl, tr, br, bl] = corners;
    let top = || interpolate_edge(x, y, x + 1.0, y, tl, tr, level);
    let right = || interpolate_edge(x + 1.0, y, x + 1.0, y + 1.0, tr, br, level);
    let bottom = || interpolate_edge(x, y + 1.0, x + 1.0, y + 1.0, bl, br, level);
    let left = || interpolate_edge(x, y, x, y + 1.0, tl, bl, level);
    let mut push = |start: Point, end: Point| segments.push(Segment { start, end });

    match cell_index {
        0 | 15 => {}
        1 | 14 => push(left(), top()),
        2 | 13 => push(top(), right()),
        3 | 12 => push(left(), right()),
        4 | 11 => push(right(), bottom()),
        5 => {
            // Saddle: two separate segments
            push(left(), top());
            push(right(), bottom());
        }
        6 | 9 => push(top(), bottom()),
        7 | 8 => push(left(), bottom()),
        10 => {
            push(top(), right());
            push(left(), bottom());
        }
        _ => {}
    }
}

/// Linearly interpolate between two edge points based on data values
fn interpolate_edge(
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    val1: f32,
    val2: f32,
    level: f32,
) -> Point {
    if (val2 - val1).abs() < 1e-6 {
        return Point::new((x1 + x2) / 2.0, (y1 + y2) / 2.0);
    }

    let t = ((level - val1) / (val2 - val1)).clamp(0.0, 1.0);

    Point::new(x1 + t * (x2 - x1), y1 + t * (y2 - y1))
}

/// Copy `data` into a grid one cell larger on every side, filled with zeros.
///
/// Marching over the padded grid closes iso-lines that would otherwise stop
/// at the data's border.
pub fn pad_with_zeros(data: &[f32], width: usize, height: usize) -> Vec<f32> {
    let padded_width = width + 2;
    let mut padded = vec![0.0f32; padded_width * (height + 2)];
    for (row, values) in data.chunks_exact(width.max(1)).take(height).enumerate() {
        let start = (row + 1) * padded_width + 1;
        padded[start..start + width].copy_from_slice(values);
    }
    padded
}

/// Extract contour segments from a density grid for every threshold.
///
/// Grid samples sit at cell centers. Segments come back grouped by
/// threshold, in the order the thresholds are given.
pub fn generate_contours(thresholds: &[f64], grid: &DensityGrid) -> Vec<ContourSegment> {
    let cols = grid.size.cols;
    let rows = grid.size.rows;
    if grid.size.is_empty() || grid.counts.len() != cols * rows {
        tracing::warn!(
            cols,
            rows,
            counts = grid.counts.len(),
            "Density grid shape does not match its counts, skipping contours"
        );
        return vec![];
    }

    let padded = pad_with_zeros(&grid.counts, cols, rows);
    let [origin_x, origin_y] = grid.origin;
    let [dx, dy] = grid.cell_offset;
    // Padded sample i is cell i - 1, whose center is at (i - 0.5) cells
    let to_world = |p: Point| {
        [
            origin_x + (p.x as f64 - 0.5) * dx,
            origin_y + (p.y as f64 - 0.5) * dy,
        ]
    };

    let per_threshold: Vec<Vec<ContourSegment>> = thresholds
        .par_iter()
        .map(|&threshold| {
            march_squares(&padded, cols + 2, rows + 2, threshold as f32)
                .into_iter()
                .map(|seg| ContourSegment {
                    start: to_world(seg.start),
                    end: to_world(seg.end),
                    threshold,
                })
                .collect()
        })
        .collect();

    let segments: Vec<ContourSegment> = per_threshold.into_iter().flatten().collect();

    tracing::debug!(
        cols,
        rows,
        max_count = grid.max_count,
        num_thresholds = thresholds.len(),
        num_segments = segments.len(),
        "Generated contours"
    );

    segments
}

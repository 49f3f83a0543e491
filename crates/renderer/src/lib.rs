//! Contour line extraction for density grids.
//!
//! Implements marching squares over zero-padded count grids, producing
//! world-space line segments grouped by threshold.

pub mod contour;

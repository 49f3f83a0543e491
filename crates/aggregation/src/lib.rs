//! Point-to-grid density aggregation.
//!
//! Bins scattered points into a regular grid whose cells are sized in
//! meters, producing the per-cell counts that contour extraction runs on.
//!
//! # Example
//!
//! ```ignore
//! use aggregation::{point_to_density_grid, AggregationMode, AggregationRequest, GridAggregator};
//!
//! let aggregator = GridAggregator::with_threads("points-grid-aggregator", 0)?;
//! let grid = point_to_density_grid(
//!     &AggregationRequest {
//!         data: &points,
//!         cell_size_meters: 1000.0,
//!         get_position: &|p: &PointDatum| p.position,
//!         mode: AggregationMode::Serial,
//!     },
//!     &aggregator,
//! )?;
//! ```

pub mod aggregator;
pub mod density;

pub use aggregator::{AggregationMode, GridAggregator, GridLayout};
pub use density::{
    grid_offset, layout_for_bbox, point_to_density_grid, validate_cell_size, AggregationRequest,
    MAX_CELL_SIZE_METERS, MAX_GRID_CELLS,
};

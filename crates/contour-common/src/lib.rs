//! Common types shared by the contour layer crates.

pub mod bbox;
pub mod error;
pub mod grid;
pub mod style;

pub use bbox::BoundingBox;
pub use error::{ContourError, ContourResult};
pub use grid::{DensityGrid, GridSize, Position};
pub use style::{threshold_color, Color, ThresholdTable, DEFAULT_COLOR};

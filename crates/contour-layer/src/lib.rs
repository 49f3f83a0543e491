//! Contour layer: point data → density grid → iso-lines → line sub-layer.
//!
//! [`ContourLayer`] implements the host-facing [`Layer`] lifecycle:
//!
//! ```text
//! initialize(context) ── binds a GridAggregator to the context's pool
//!      │
//! update(old, new, flags)
//!      ├─► aggregation_needed?         → point_to_density_grid
//!      └─► contour_regeneration_needed? → generate_contours
//!      │
//! render() ── one LineSubLayer (segments, colors, opacity 0.6, stroke 5)
//! ```
//!
//! Every update builds a fresh [`ContourState`] snapshot and swaps it in, so a
//! failed update leaves the previous snapshot untouched.

pub mod config;
pub mod contour_layer;
pub mod layer;
pub mod props;
pub mod state;
pub mod sublayer;

pub use config::ContourLayerConfig;
pub use contour_layer::ContourLayer;
pub use layer::{ChangeFlags, Layer, LayerContext, UpdateParams};
pub use props::{Accessor, ContourLayerProps, DatumStyle, PointDatum};
pub use state::{aggregation_needed, contour_regeneration_needed, ContourState};
pub use sublayer::{LineInstance, LineSubLayer};

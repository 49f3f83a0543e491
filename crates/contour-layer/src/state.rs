//! Immutable layer state and the update decisions made from it.

use std::sync::Arc;

use contour_common::DensityGrid;
use renderer::contour::ContourSegment;

use crate::layer::ChangeFlags;
use crate::props::ContourLayerProps;

/// Snapshot of everything the layer derived from its props.
///
/// A new snapshot is built on every update and swapped in whole.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContourState {
    /// Most recent aggregation output
    pub grid: Option<Arc<DensityGrid>>,
    /// Segments traced from `grid`
    pub contours: Arc<Vec<ContourSegment>>,
    /// Aggregation passes run by this layer
    pub aggregation_passes: u64,
    /// Contour passes run by this layer
    pub contour_passes: u64,
    /// Value of `aggregation_passes` when `contours` were traced
    pub contours_from_pass: u64,
}

impl ContourState {
    /// True when the contours were traced from the current grid.
    pub fn contours_current(&self) -> bool {
        self.contours_from_pass == self.aggregation_passes
    }
}

/// Whether an update must re-run aggregation.
///
/// Aggregates on the first update, when no grid exists yet, when the data
/// was replaced, when the position accessor was replaced, or when the cell
/// size differs. Style accessors never reach aggregation and are ignored.
pub fn aggregation_needed<D>(
    old: Option<&ContourLayerProps<D>>,
    new: &ContourLayerProps<D>,
    flags: &ChangeFlags,
    has_grid: bool,
) -> bool {
    let Some(old) = old else {
        return true;
    };
    !has_grid
        || flags.data_changed
        || !Arc::ptr_eq(&old.get_position, &new.get_position)
        || old.cell_size != new.cell_size
}

/// Whether an update must re-trace contours.
///
/// Re-traces after a fresh aggregation, on the first update, and when the
/// threshold table changed.
pub fn contour_regeneration_needed<D>(
    old: Option<&ContourLayerProps<D>>,
    new: &ContourLayerProps<D>,
    aggregated: bool,
) -> bool {
    aggregated || old.map_or(true, |old| old.thresholds != new.thresholds)
}

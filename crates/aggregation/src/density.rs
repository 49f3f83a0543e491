//! Point data to density grid conversion.
//!
//! The grid is sized in meters and laid out in degrees: the cell size is
//! converted to longitude/latitude offsets at the center latitude of the
//! data's bounding box, and the grid origin is the box's minimum corner.

use contour_common::{BoundingBox, ContourError, ContourResult, DensityGrid, GridSize, Position};
use tracing::debug;

use crate::aggregator::{AggregationMode, GridAggregator, GridLayout};

/// Earth radius used for meter/degree conversion.
pub const EARTH_RADIUS_METERS: f64 = 6_378_000.0;

/// Largest grid (in cells) an aggregation pass may allocate.
pub const MAX_GRID_CELLS: usize = 1 << 24;

/// Largest accepted cell size in meters.
pub const MAX_CELL_SIZE_METERS: f64 = 1000.0;

/// Center latitudes are clamped to this magnitude before the longitude
/// offset is computed.
const MAX_CENTER_LATITUDE: f64 = 89.0;

/// Inputs of one aggregation pass.
pub struct AggregationRequest<'a, D> {
    pub data: &'a [D],
    pub cell_size_meters: f64,
    pub get_position: &'a dyn Fn(&D) -> Position,
    pub mode: AggregationMode,
}

/// Degree offsets `[x, y]` covering `cell_size_meters` at `latitude`.
pub fn grid_offset(cell_size_meters: f64, latitude: f64) -> [f64; 2] {
    let y_offset = (cell_size_meters / EARTH_RADIUS_METERS).to_degrees();
    let latitude = latitude.clamp(-MAX_CENTER_LATITUDE, MAX_CENTER_LATITUDE);
    let x_offset = y_offset / latitude.to_radians().cos();
    [x_offset, y_offset]
}

/// Check a cell size against the accepted range.
pub fn validate_cell_size(cell_size_meters: f64) -> ContourResult<()> {
    if cell_size_meters.is_finite()
        && cell_size_meters > 0.0
        && cell_size_meters <= MAX_CELL_SIZE_METERS
    {
        Ok(())
    } else {
        Err(ContourError::InvalidCellSize(cell_size_meters))
    }
}

/// Grid layout covering `bbox` with square cells of `cell_size_meters`.
pub fn layout_for_bbox(bbox: &BoundingBox, cell_size_meters: f64) -> ContourResult<GridLayout> {
    let (_, center_lat) = bbox.center();
    let cell_offset = grid_offset(cell_size_meters, center_lat);

    let cols = (bbox.width() / cell_offset[0]).floor() + 1.0;
    let rows = (bbox.height() / cell_offset[1]).floor() + 1.0;
    if cols * rows > MAX_GRID_CELLS as f64 {
        // float to int casts saturate
        return Err(ContourError::GridTooLarge {
            cols: cols as usize,
            rows: rows as usize,
            limit: MAX_GRID_CELLS,
        });
    }

    Ok(GridLayout {
        size: GridSize::new(cols as usize, rows as usize),
        origin: [bbox.min_x, bbox.min_y],
        cell_offset,
    })
}

/// Aggregate `request.data` into a density grid using `aggregator`.
///
/// An empty dataset yields a 1x1 zero grid at the origin. Any invalid
/// position or cell size is returned as an error; nothing is skipped.
pub fn point_to_density_grid<D>(
    request: &AggregationRequest<'_, D>,
    aggregator: &GridAggregator,
) -> ContourResult<DensityGrid> {
    validate_cell_size(request.cell_size_meters)?;

    let mut positions = Vec::with_capacity(request.data.len());
    for (index, datum) in request.data.iter().enumerate() {
        let position = (request.get_position)(datum);
        if !position.iter().all(|v| v.is_finite()) {
            return Err(ContourError::InvalidPosition { index });
        }
        positions.push(position);
    }

    let layout = match BoundingBox::from_positions(&positions) {
        Some(bbox) => layout_for_bbox(&bbox, request.cell_size_meters)?,
        None => GridLayout {
            size: GridSize::new(1, 1),
            origin: [0.0, 0.0],
            cell_offset: grid_offset(request.cell_size_meters, 0.0),
        },
    };

    debug!(
        points = positions.len(),
        cell_size_meters = request.cell_size_meters,
        cols = layout.size.cols,
        rows = layout.size.rows,
        "point_to_density_grid input"
    );

    aggregator.aggregate(&positions, &layout, request.mode)
}

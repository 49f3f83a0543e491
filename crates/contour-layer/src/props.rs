//! Layer props and the default point datum.

use std::sync::Arc;

use aggregation::MAX_CELL_SIZE_METERS;
use contour_common::{Color, ContourError, ContourResult, Position, ThresholdTable, DEFAULT_COLOR};
use serde::{Deserialize, Deserializer, Serialize};

/// Per-datum accessor.
pub type Accessor<D, T> = Arc<dyn Fn(&D) -> T + Send + Sync>;

/// Default cell size in meters.
pub const DEFAULT_CELL_SIZE: f64 = 1000.0;

/// A point record as read from JSON input.
///
/// `position` accepts `[x, y]` or `[x, y, z]`; a missing `z` is 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointDatum {
    #[serde(deserialize_with = "deserialize_position")]
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
}

impl PointDatum {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: [x, y, 0.0],
            threshold: None,
            color: None,
            width: None,
        }
    }
}

impl From<Position> for PointDatum {
    fn from(position: Position) -> Self {
        Self {
            position,
            threshold: None,
            color: None,
            width: None,
        }
    }
}

fn deserialize_position<'de, De>(deserializer: De) -> Result<Position, De::Error>
where
    De: Deserializer<'de>,
{
    let coords = Vec::<f64>::deserialize(deserializer)?;
    match coords.as_slice() {
        [x, y] => Ok([*x, *y, 0.0]),
        [x, y, z] => Ok([*x, *y, *z]),
        _ => Err(serde::de::Error::invalid_length(
            coords.len(),
            &"a position with 2 or 3 coordinates",
        )),
    }
}

/// Resolved per-datum styling values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatumStyle {
    pub threshold: Option<f64>,
    pub color: Color,
    pub width: f32,
}

/// Configuration surface of the contour layer.
///
/// `data` identity (the `Arc` pointer) is what hosts compare to decide
/// whether data changed; replacing the vector contents in place is not
/// possible by construction.
pub struct ContourLayerProps<D> {
    pub data: Arc<[D]>,
    /// Cell size in meters, within [0, 1000]
    pub cell_size: f64,
    /// Aggregate on the compute pool instead of the calling thread
    pub gpu_aggregation: bool,
    /// Request 64-bit position precision from the line sub-layer
    pub fp64: bool,
    pub width_scale: f32,
    pub visible: bool,
    pub thresholds: ThresholdTable,
    pub get_position: Accessor<D, Position>,
    pub get_threshold: Accessor<D, Option<f64>>,
    pub get_color: Accessor<D, Color>,
    pub get_width: Accessor<D, f32>,
}

impl<D> Clone for ContourLayerProps<D> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            cell_size: self.cell_size,
            gpu_aggregation: self.gpu_aggregation,
            fp64: self.fp64,
            width_scale: self.width_scale,
            visible: self.visible,
            thresholds: self.thresholds.clone(),
            get_position: Arc::clone(&self.get_position),
            get_threshold: Arc::clone(&self.get_threshold),
            get_color: Arc::clone(&self.get_color),
            get_width: Arc::clone(&self.get_width),
        }
    }
}

impl<D> std::fmt::Debug for ContourLayerProps<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContourLayerProps")
            .field("data_len", &self.data.len())
            .field("cell_size", &self.cell_size)
            .field("gpu_aggregation", &self.gpu_aggregation)
            .field("fp64", &self.fp64)
            .field("width_scale", &self.width_scale)
            .field("visible", &self.visible)
            .field("thresholds", &self.thresholds)
            .finish_non_exhaustive()
    }
}

impl ContourLayerProps<PointDatum> {
    /// Props with every default, reading style values from the datum fields.
    pub fn new(data: impl Into<Arc<[PointDatum]>>) -> Self {
        let mut props = Self::with_position_accessor(data, |d: &PointDatum| d.position);
        props.get_threshold = Arc::new(|d: &PointDatum| d.threshold);
        props.get_color = Arc::new(|d: &PointDatum| d.color.unwrap_or(DEFAULT_COLOR));
        props.get_width = Arc::new(|d: &PointDatum| d.width.unwrap_or(1.0));
        props
    }
}

impl<D: 'static> ContourLayerProps<D> {
    /// Props for an arbitrary datum type.
    ///
    /// Style accessors default to no threshold, [`DEFAULT_COLOR`] and width 1.
    pub fn with_position_accessor<F>(data: impl Into<Arc<[D]>>, get_position: F) -> Self
    where
        F: Fn(&D) -> Position + Send + Sync + 'static,
    {
        Self {
            data: data.into(),
            cell_size: DEFAULT_CELL_SIZE,
            gpu_aggregation: false,
            fp64: false,
            width_scale: 1.0,
            visible: true,
            thresholds: ThresholdTable::default(),
            get_position: Arc::new(get_position),
            get_threshold: Arc::new(|_: &D| -> Option<f64> { None }),
            get_color: Arc::new(|_: &D| DEFAULT_COLOR),
            get_width: Arc::new(|_: &D| 1.0f32),
        }
    }
}

impl<D> ContourLayerProps<D> {
    pub fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn with_thresholds(mut self, thresholds: ThresholdTable) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_gpu_aggregation(mut self, gpu_aggregation: bool) -> Self {
        self.gpu_aggregation = gpu_aggregation;
        self
    }

    pub fn with_width_scale(mut self, width_scale: f32) -> Self {
        self.width_scale = width_scale;
        self
    }

    pub fn with_fp64(mut self, fp64: bool) -> Self {
        self.fp64 = fp64;
        self
    }

    /// Same props pointing at a new dataset.
    pub fn with_data(&self, data: impl Into<Arc<[D]>>) -> Self {
        Self {
            data: data.into(),
            ..self.clone()
        }
    }

    /// True when both props point at the same dataset allocation.
    pub fn same_data(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Style values the accessors produce for one datum.
    ///
    /// The line sub-layer does not read these: line colors come from the
    /// threshold table and widths from `width_scale`.
    pub fn datum_style(&self, datum: &D) -> DatumStyle {
        DatumStyle {
            threshold: (self.get_threshold)(datum),
            color: (self.get_color)(datum),
            width: (self.get_width)(datum),
        }
    }

    /// Validate the numeric props.
    pub fn validate(&self) -> ContourResult<()> {
        if !(self.cell_size.is_finite() && (0.0..=MAX_CELL_SIZE_METERS).contains(&self.cell_size))
        {
            return Err(ContourError::InvalidCellSize(self.cell_size));
        }
        if !(self.width_scale.is_finite() && self.width_scale >= 0.0) {
            return Err(ContourError::InvalidConfig {
                param: "width_scale".to_string(),
                message: format!("{} is not a non-negative number", self.width_scale),
            });
        }
        Ok(())
    }
}

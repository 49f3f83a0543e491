//! Line sub-layer descriptor handed to the host for drawing.

use contour_common::{Color, ThresholdTable};
use renderer::contour::ContourSegment;
use serde::Serialize;

/// Opacity of contour lines.
pub const CONTOUR_OPACITY: f32 = 0.6;

/// Stroke width of contour lines.
pub const CONTOUR_STROKE_WIDTH: f32 = 5.0;

/// Suffix appended to the parent layer id.
pub const SUB_LAYER_ID: &str = "contour-line-layer";

/// One drawable line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineInstance {
    pub source_position: [f64; 2],
    pub target_position: [f64; 2],
    pub color: Color,
    pub threshold: f64,
}

impl LineInstance {
    /// Resolve a segment's positions and color.
    pub fn from_segment(segment: &ContourSegment, thresholds: &ThresholdTable) -> Self {
        Self {
            source_position: segment.start,
            target_position: segment.end,
            color: thresholds.color_for(segment.threshold),
            threshold: segment.threshold,
        }
    }
}

/// A line-segment layer description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSubLayer {
    pub id: String,
    #[serde(rename = "type")]
    pub layer_type: &'static str,
    pub data: Vec<LineInstance>,
    pub opacity: f32,
    pub stroke_width: f32,
    pub width_scale: f32,
    pub pickable: bool,
    pub visible: bool,
    pub fp64: bool,
}

impl LineSubLayer {
    pub const LAYER_NAME: &'static str = "LineLayer";

    /// Sub-layer for `parent_id` drawing `segments`.
    pub fn new(parent_id: &str, segments: &[ContourSegment], thresholds: &ThresholdTable) -> Self {
        Self {
            id: format!("{}-{}", parent_id, SUB_LAYER_ID),
            layer_type: Self::LAYER_NAME,
            data: segments
                .iter()
                .map(|s| LineInstance::from_segment(s, thresholds))
                .collect(),
            opacity: CONTOUR_OPACITY,
            stroke_width: CONTOUR_STROKE_WIDTH,
            width_scale: 1.0,
            pickable: true,
            visible: true,
            fp64: false,
        }
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Number of lines per threshold, in threshold order of first appearance.
    pub fn lines_per_threshold(&self) -> Vec<(f64, usize)> {
        let mut counts: Vec<(f64, usize)> = Vec::new();
        for line in &self.data {
            match counts.iter_mut().find(|(t, _)| *t == line.threshold) {
                Some((_, n)) => *n += 1,
                None => counts.push((line.threshold, 1)),
            }
        }
        counts
    }
}

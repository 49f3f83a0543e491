//! Threshold and color tables for contour styling.
//!
//! A [`ThresholdTable`] pairs each iso-value with the color its contour lines
//! are drawn in. Tables are validated on construction, so a table obtained
//! from [`ThresholdTable::new`] or deserialized from JSON always has matching
//! lengths and strictly ascending, finite thresholds.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ContourError, ContourResult};

/// RGB color.
pub type Color = [u8; 3];

/// Color used for contour segments whose threshold has no table entry.
pub const DEFAULT_COLOR: Color = [255, 0, 255];

/// Default iso-values.
pub const DEFAULT_THRESHOLDS: [f64; 3] = [0.999, 10.0, 20.0];

/// Default colors, paired positionally with [`DEFAULT_THRESHOLDS`].
pub const DEFAULT_COLORS: [Color; 3] = [[255, 0, 0], [0, 255, 0], [0, 0, 255]];

/// Look up the color for `threshold`.
///
/// Finds the first position of `threshold` in `thresholds`; if that position
/// is inside `colors` the color there is returned, otherwise [`DEFAULT_COLOR`].
/// Slices of different lengths are accepted.
pub fn threshold_color(thresholds: &[f64], colors: &[Color], threshold: f64) -> Color {
    thresholds
        .iter()
        .position(|&t| t == threshold)
        .and_then(|i| colors.get(i))
        .copied()
        .unwrap_or(DEFAULT_COLOR)
}

/// Validated thresholds with one color per threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawThresholdTable", into = "RawThresholdTable")]
pub struct ThresholdTable {
    thresholds: Vec<f64>,
    colors: Vec<Color>,
}

#[derive(Serialize, Deserialize)]
struct RawThresholdTable {
    thresholds: Vec<f64>,
    colors: Vec<Color>,
}

impl TryFrom<RawThresholdTable> for ThresholdTable {
    type Error = ContourError;

    fn try_from(raw: RawThresholdTable) -> Result<Self, Self::Error> {
        ThresholdTable::new(raw.thresholds, raw.colors)
    }
}

impl From<ThresholdTable> for RawThresholdTable {
    fn from(table: ThresholdTable) -> Self {
        Self {
            thresholds: table.thresholds,
            colors: table.colors,
        }
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
            colors: DEFAULT_COLORS.to_vec(),
        }
    }
}

impl ThresholdTable {
    /// Build a table, checking lengths, ordering and finiteness.
    pub fn new(thresholds: Vec<f64>, colors: Vec<Color>) -> ContourResult<Self> {
        if thresholds.is_empty() {
            return Err(ContourError::InvalidThresholds(
                "at least one threshold is required".to_string(),
            ));
        }
        if thresholds.len() != colors.len() {
            return Err(ContourError::MismatchedColorTable {
                thresholds: thresholds.len(),
                colors: colors.len(),
            });
        }
        if let Some(bad) = thresholds.iter().find(|t| !t.is_finite()) {
            return Err(ContourError::InvalidThresholds(format!(
                "threshold {} is not finite",
                bad
            )));
        }
        if let Some(pair) = thresholds.windows(2).find(|w| w[0] >= w[1]) {
            return Err(ContourError::InvalidThresholds(format!(
                "thresholds must be strictly ascending ({} >= {})",
                pair[0], pair[1]
            )));
        }

        Ok(Self { thresholds, colors })
    }

    /// Parse a table from JSON: `{"thresholds": [...], "colors": [[r,g,b], ...]}`.
    ///
    /// Validation failures come back as the matching table error, not as a
    /// JSON error.
    pub fn from_json(json: &str) -> ContourResult<Self> {
        let raw: RawThresholdTable = serde_json::from_str(json)?;
        Self::new(raw.thresholds, raw.colors)
    }

    /// Build a table from an already parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> ContourResult<Self> {
        let raw: RawThresholdTable = serde_json::from_value(value)?;
        Self::new(raw.thresholds, raw.colors)
    }

    /// Load a table from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> ContourResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// Color for a contour drawn at `threshold`.
    pub fn color_for(&self, threshold: f64) -> Color {
        threshold_color(&self.thresholds, &self.colors, threshold)
    }
}

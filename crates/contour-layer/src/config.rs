//! Configuration for contour layers.

use aggregation::validate_cell_size;
use contour_common::{ContourError, ContourResult, ThresholdTable};
use serde::{Deserialize, Serialize};

use crate::props::{ContourLayerProps, DEFAULT_CELL_SIZE};

/// Layer settings a host can load from the environment or a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourLayerConfig {
    /// Cell size in meters.
    pub cell_size: f64,

    /// Aggregate on the compute pool.
    pub gpu_aggregation: bool,

    /// Compute pool size (0 = one thread per core).
    pub aggregation_threads: usize,

    /// Multiplier applied to line widths.
    pub width_scale: f32,

    /// Request 64-bit positions from the line sub-layer.
    pub fp64: bool,

    /// Iso-values and their colors.
    pub thresholds: ThresholdTable,
}

impl Default for ContourLayerConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            gpu_aggregation: false,
            aggregation_threads: 0,
            width_scale: 1.0,
            fp64: false,
            thresholds: ThresholdTable::default(),
        }
    }
}

impl ContourLayerConfig {
    /// Load configuration from environment variables.
    ///
    /// Unparseable values are ignored and the default is kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("CONTOUR_CELL_SIZE") {
            if let Ok(size) = val.parse() {
                config.cell_size = size;
            }
        }

        if let Ok(val) = std::env::var("CONTOUR_GPU_AGGREGATION") {
            config.gpu_aggregation = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("CONTOUR_AGGREGATION_THREADS") {
            if let Ok(threads) = val.parse() {
                config.aggregation_threads = threads;
            }
        }

        if let Ok(val) = std::env::var("CONTOUR_WIDTH_SCALE") {
            if let Ok(scale) = val.parse() {
                config.width_scale = scale;
            }
        }

        if let Ok(val) = std::env::var("CONTOUR_FP64") {
            config.fp64 = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    /// Parse configuration from a JSON string. Missing fields take defaults.
    pub fn from_json(json: &str) -> ContourResult<Self> {
        let mut value: serde_json::Value = serde_json::from_str(json)?;
        // The table is built separately so its validation errors keep their type
        let thresholds = value
            .as_object_mut()
            .and_then(|fields| fields.remove("thresholds"));

        let mut config: Self = serde_json::from_value(value)?;
        if let Some(thresholds) = thresholds {
            config.thresholds = ThresholdTable::from_value(thresholds)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ContourResult<()> {
        validate_cell_size(self.cell_size)?;

        if !(self.width_scale.is_finite() && self.width_scale >= 0.0) {
            return Err(ContourError::InvalidConfig {
                param: "width_scale".to_string(),
                message: "must be a non-negative number".to_string(),
            });
        }

        Ok(())
    }

    /// Apply these settings to a set of props.
    pub fn apply<D>(&self, props: ContourLayerProps<D>) -> ContourLayerProps<D> {
        props
            .with_cell_size(self.cell_size)
            .with_gpu_aggregation(self.gpu_aggregation)
            .with_width_scale(self.width_scale)
            .with_fp64(self.fp64)
            .with_thresholds(self.thresholds.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::PointDatum;

    #[test]
    fn test_default_is_valid() {
        assert!(ContourLayerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = ContourLayerConfig::from_json(r#"{"cell_size": 250, "gpu_aggregation": true}"#)
            .unwrap();
        assert_eq!(config.cell_size, 250.0);
        assert!(config.gpu_aggregation);
        assert_eq!(config.thresholds, ThresholdTable::default());
    }

    #[test]
    fn test_from_json_rejects_zero_cell_size() {
        assert!(ContourLayerConfig::from_json(r#"{"cell_size": 0}"#).is_err());
    }

    #[test]
    fn test_from_json_rejects_bad_thresholds() {
        let json = r#"{"thresholds": {"thresholds": [1, 2], "colors": [[0, 0, 0]]}}"#;
        let err = ContourLayerConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ContourError::MismatchedColorTable { .. }));
        assert!(err.is_config_error());

        let json = r#"{"thresholds": {"thresholds": [2, 1], "colors": [[0, 0, 0], [1, 1, 1]]}}"#;
        let err = ContourLayerConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ContourError::InvalidThresholds(_)));
    }

    #[test]
    fn test_from_json_custom_thresholds() {
        let json = r#"{"cell_size": 500, "thresholds": {"thresholds": [3], "colors": [[7, 8, 9]]}}"#;
        let config = ContourLayerConfig::from_json(json).unwrap();
        assert_eq!(config.cell_size, 500.0);
        assert_eq!(config.thresholds.color_for(3.0), [7, 8, 9]);
    }

    #[test]
    fn test_validate_matches_aggregation_range() {
        let mut config = ContourLayerConfig {
            cell_size: aggregation::MAX_CELL_SIZE_METERS,
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        config.cell_size = aggregation::MAX_CELL_SIZE_METERS + 0.5;
        assert!(matches!(config.validate(), Err(ContourError::InvalidCellSize(_))));
    }

    #[test]
    fn test_apply() {
        let config = ContourLayerConfig {
            cell_size: 300.0,
            width_scale: 2.0,
            ..Default::default()
        };
        let props = config.apply(ContourLayerProps::new(vec![PointDatum::new(0.0, 0.0)]));
        assert_eq!(props.cell_size, 300.0);
        assert_eq!(props.width_scale, 2.0);
    }
}

//! Contour CLI library.
//!
//! Loads point records, runs them through a [`ContourLayer`] once and hands
//! back the line sub-layer the layer renders.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use contour_common::ThresholdTable;
use contour_layer::{
    ContourLayer, ContourLayerConfig, ContourLayerProps, Layer, LayerContext, LineSubLayer,
    PointDatum, UpdateParams,
};
use tracing::{debug, info};

/// Command-line overrides applied on top of the environment configuration.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub cell_size: Option<f64>,
    pub thresholds_file: Option<PathBuf>,
    pub gpu_aggregation: bool,
    pub threads: Option<usize>,
    pub width_scale: Option<f32>,
    pub fp64: bool,
}

/// Merge `overrides` into `base` and validate the result.
pub fn resolve_config(base: ContourLayerConfig, overrides: &Overrides) -> Result<ContourLayerConfig> {
    let mut config = base;

    if let Some(cell_size) = overrides.cell_size {
        config.cell_size = cell_size;
    }
    if let Some(path) = &overrides.thresholds_file {
        config.thresholds = ThresholdTable::from_file(path)
            .with_context(|| format!("Failed to load thresholds from {}", path.display()))?;
    }
    if overrides.gpu_aggregation {
        config.gpu_aggregation = true;
    }
    if let Some(threads) = overrides.threads {
        config.aggregation_threads = threads;
    }
    if let Some(width_scale) = overrides.width_scale {
        config.width_scale = width_scale;
    }
    if overrides.fp64 {
        config.fp64 = true;
    }

    config.validate().context("Invalid contour configuration")?;
    Ok(config)
}

/// Read a JSON array of point records.
pub fn load_points(path: &Path) -> Result<Vec<PointDatum>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let points: Vec<PointDatum> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse points from {}", path.display()))?;
    debug!(path = %path.display(), count = points.len(), "Loaded points");
    Ok(points)
}

/// Run one initialize/update/render cycle over `points`.
pub fn contour_points(
    layer_id: &str,
    points: Vec<PointDatum>,
    config: &ContourLayerConfig,
) -> Result<LineSubLayer> {
    let context = LayerContext::new(config.aggregation_threads)?;
    let props = config.apply(ContourLayerProps::new(points));

    let mut layer = ContourLayer::new(layer_id);
    layer.initialize(&context)?;
    layer
        .update(UpdateParams::initial(&props))
        .context("Contour layer update failed")?;

    let sub_layer = layer.render();
    let state = layer.state();
    if let Some(grid) = &state.grid {
        info!(
            layer = layer_id,
            points = props.data.len(),
            cols = grid.size.cols,
            rows = grid.size.rows,
            max_count = grid.max_count,
            lines = sub_layer.data.len(),
            "Generated contours"
        );
    }
    Ok(sub_layer)
}

/// Write the sub-layer as JSON to `output`, or stdout when `None`.
pub fn write_sub_layer(sub_layer: &LineSubLayer, output: Option<&Path>) -> Result<()> {
    let json = sub_layer.to_json()?;
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Wrote line layer");
        }
        None => println!("{}", json),
    }
    Ok(())
}

//! The contour layer.

use std::sync::Arc;

use aggregation::{point_to_density_grid, AggregationMode, AggregationRequest, GridAggregator};
use contour_common::{ContourError, ContourResult, DensityGrid};
use renderer::contour::{generate_contours, ContourSegment};
use tracing::{debug, warn};

use crate::layer::{Layer, LayerContext, UpdateParams};
use crate::props::ContourLayerProps;
use crate::state::{aggregation_needed, contour_regeneration_needed, ContourState};
use crate::sublayer::LineSubLayer;

/// Aggregates point data into a density grid and draws its contour lines.
pub struct ContourLayer<D> {
    id: String,
    props: Option<ContourLayerProps<D>>,
    aggregator: Option<GridAggregator>,
    state: Arc<ContourState>,
}

impl<D> std::fmt::Debug for ContourLayer<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContourLayer")
            .field("id", &self.id)
            .field("props", &self.props)
            .field("aggregator", &self.aggregator)
            .field("state", &self.state)
            .finish()
    }
}

impl<D> ContourLayer<D> {
    pub const LAYER_NAME: &'static str = "ContourLayer";

    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            props: None,
            aggregator: None,
            state: Arc::new(ContourState::default()),
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> Arc<ContourState> {
        Arc::clone(&self.state)
    }

    /// Props from the last successful update.
    pub fn props(&self) -> Option<&ContourLayerProps<D>> {
        self.props.as_ref()
    }

    pub fn aggregator(&self) -> Option<&GridAggregator> {
        self.aggregator.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.aggregator.is_some()
    }

    fn aggregate(
        aggregator: &GridAggregator,
        props: &ContourLayerProps<D>,
    ) -> ContourResult<DensityGrid> {
        point_to_density_grid(
            &AggregationRequest {
                data: &props.data,
                cell_size_meters: props.cell_size,
                get_position: &*props.get_position,
                mode: AggregationMode::from_gpu_flag(props.gpu_aggregation),
            },
            aggregator,
        )
    }

    /// Trace contours for `thresholds`. Without a grid there is nothing to
    /// trace and no segments are produced.
    fn trace_contours(&self, grid: Option<&DensityGrid>, thresholds: &[f64]) -> Vec<ContourSegment> {
        match grid {
            Some(grid) => generate_contours(thresholds, grid),
            None => {
                warn!(layer = %self.id, "Contour generation requested before aggregation");
                vec![]
            }
        }
    }
}

impl<D> Layer for ContourLayer<D> {
    type Props = ContourLayerProps<D>;
    type SubLayer = LineSubLayer;

    fn id(&self) -> &str {
        &self.id
    }

    fn initialize(&mut self, context: &LayerContext) -> ContourResult<()> {
        if self.aggregator.is_some() {
            return Err(ContourError::AlreadyInitialized(self.id.clone()));
        }

        let aggregator_id = format!("{}-grid-aggregator", self.id);
        debug!(layer = %self.id, aggregator = %aggregator_id, "Initializing contour layer");
        self.aggregator = Some(GridAggregator::new(aggregator_id, Arc::clone(context.pool())));
        self.state = Arc::new(ContourState::default());
        Ok(())
    }

    fn update(&mut self, params: UpdateParams<'_, Self::Props>) -> ContourResult<()> {
        let aggregator = self
            .aggregator
            .as_ref()
            .ok_or_else(|| ContourError::NotInitialized(self.id.clone()))?;
        let props = params.props;
        props.validate()?;

        let mut next = (*self.state).clone();

        let aggregate = aggregation_needed(
            params.old_props,
            props,
            &params.change_flags,
            next.grid.is_some(),
        );
        if aggregate {
            let grid = Self::aggregate(aggregator, props)?;
            next.grid = Some(Arc::new(grid));
            next.aggregation_passes += 1;
        }

        if contour_regeneration_needed(params.old_props, props, aggregate) {
            let contours = self.trace_contours(next.grid.as_deref(), props.thresholds.thresholds());
            next.contours = Arc::new(contours);
            next.contour_passes += 1;
            next.contours_from_pass = next.aggregation_passes;
        }

        debug!(
            layer = %self.id,
            aggregated = aggregate,
            aggregation_passes = next.aggregation_passes,
            contour_passes = next.contour_passes,
            segments = next.contours.len(),
            "Updated contour layer"
        );

        self.state = Arc::new(next);
        self.props = Some(props.clone());
        Ok(())
    }

    fn render(&self) -> LineSubLayer {
        let thresholds = self
            .props
            .as_ref()
            .map(|p| p.thresholds.clone())
            .unwrap_or_default();
        let mut sub_layer = LineSubLayer::new(&self.id, &self.state.contours, &thresholds);
        if let Some(props) = &self.props {
            sub_layer.width_scale = props.width_scale;
            sub_layer.visible = props.visible;
            sub_layer.fp64 = props.fp64;
        }
        sub_layer
    }
}

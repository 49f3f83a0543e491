//! Lifecycle tests for the contour layer.

use std::sync::Arc;

use contour_common::{ContourError, ThresholdTable};
use contour_layer::{
    ChangeFlags, ContourLayer, ContourLayerProps, Layer, LayerContext, PointDatum, UpdateParams,
};
use test_utils::fixtures::{bbox, cell_size, thresholds};
use test_utils::{create_cluster_positions, create_uniform_positions};

fn context() -> LayerContext {
    LayerContext::new(2).unwrap()
}

fn points(positions: Vec<[f64; 3]>) -> Vec<PointDatum> {
    positions.into_iter().map(PointDatum::from).collect()
}

fn uniform_points(count: usize) -> Vec<PointDatum> {
    points(create_uniform_positions(count, bbox::SAN_FRANCISCO, 11))
}

fn initialized_layer(props: &ContourLayerProps<PointDatum>) -> ContourLayer<PointDatum> {
    let mut layer = ContourLayer::new("contours");
    layer.initialize(&context()).unwrap();
    layer.update(UpdateParams::initial(props)).unwrap();
    layer
}

/// Host-style update: diff the props and pass the flags along.
fn host_update(
    layer: &mut ContourLayer<PointDatum>,
    old: &ContourLayerProps<PointDatum>,
    new: &ContourLayerProps<PointDatum>,
) -> Result<(), ContourError> {
    layer.update(UpdateParams {
        old_props: Some(old),
        props: new,
        change_flags: ChangeFlags::between(Some(old), new),
    })
}

// ============================================================================
// Lifecycle tests
// ============================================================================

#[test]
fn test_initialize_binds_aggregator() {
    let mut layer: ContourLayer<PointDatum> = ContourLayer::new("density");
    assert!(!layer.is_initialized());

    layer.initialize(&context()).unwrap();

    let aggregator = layer.aggregator().unwrap();
    assert_eq!(aggregator.id(), "density-grid-aggregator");
    assert_eq!(aggregator.runs(), 0);

    let state = layer.state();
    assert!(state.grid.is_none());
    assert!(state.contours.is_empty());
}

#[test]
fn test_initialize_twice_fails() {
    let mut layer: ContourLayer<PointDatum> = ContourLayer::new("density");
    layer.initialize(&context()).unwrap();
    let err = layer.initialize(&context()).unwrap_err();
    assert!(matches!(err, ContourError::AlreadyInitialized(_)));
}

#[test]
fn test_layer_name() {
    assert_eq!(ContourLayer::<PointDatum>::LAYER_NAME, "ContourLayer");
}

// ============================================================================
// Aggregation ordering tests
// ============================================================================

#[test]
fn test_data_change_aggregates_once_before_contours() {
    let props = ContourLayerProps::new(uniform_points(100));
    let mut layer = initialized_layer(&props);
    assert_eq!(layer.aggregator().unwrap().runs(), 1);

    let new_props = props.with_data(uniform_points(120));
    assert!(!props.same_data(&new_props));
    host_update(&mut layer, &props, &new_props).unwrap();

    let state = layer.state();
    assert_eq!(layer.aggregator().unwrap().runs(), 2);
    assert_eq!(state.aggregation_passes, 2);
    assert_eq!(state.contour_passes, 2);
    // Contours were traced from the grid produced in this cycle
    assert!(state.contours_current());
    assert_eq!(state.grid.as_ref().unwrap().total_count(), 120.0);
}

#[test]
fn test_cell_size_change_reaggregates() {
    let props = ContourLayerProps::new(uniform_points(100));
    let mut layer = initialized_layer(&props);
    let coarse = layer.state().grid.clone().unwrap();

    let finer = props.clone().with_cell_size(cell_size::FINE);
    host_update(&mut layer, &props, &finer).unwrap();

    let state = layer.state();
    assert_eq!(layer.aggregator().unwrap().runs(), 2);
    assert!(state.contours_current());

    let fine = state.grid.as_ref().unwrap();
    assert!(fine.size.len() > coarse.size.len());
    assert_eq!(fine.total_count(), coarse.total_count());
}

#[test]
fn test_threshold_change_retraces_without_aggregation() {
    let props = ContourLayerProps::new(uniform_points(100));
    let mut layer = initialized_layer(&props);

    let table = ThresholdTable::new(vec![0.5, 2.5], vec![[1, 1, 1], [2, 2, 2]]).unwrap();
    let retinted = props.clone().with_thresholds(table);
    host_update(&mut layer, &props, &retinted).unwrap();

    let state = layer.state();
    assert_eq!(layer.aggregator().unwrap().runs(), 1);
    assert_eq!(state.contour_passes, 2);
    for segment in state.contours.iter() {
        assert!(segment.threshold == 0.5 || segment.threshold == 2.5);
    }
}

#[test]
fn test_style_change_keeps_state() {
    let props = ContourLayerProps::new(uniform_points(100));
    let mut layer = initialized_layer(&props);
    let before = layer.state();

    let wider = props.clone().with_width_scale(4.0);
    host_update(&mut layer, &props, &wider).unwrap();

    assert_eq!(layer.state(), before);
    assert_eq!(layer.render().width_scale, 4.0);
}

#[test]
fn test_style_accessor_swap_skips_aggregation() {
    let props = ContourLayerProps::new(uniform_points(100));
    let mut layer = initialized_layer(&props);
    let before = layer.state();

    let mut recolored = props.clone();
    recolored.get_color = Arc::new(|_: &PointDatum| [1, 2, 3]);
    recolored.get_threshold = Arc::new(|_: &PointDatum| Some(10.0));
    host_update(&mut layer, &props, &recolored).unwrap();

    assert_eq!(layer.aggregator().unwrap().runs(), 1);
    assert_eq!(layer.state(), before);
}

#[test]
fn test_position_accessor_swap_reaggregates() {
    let props = ContourLayerProps::new(uniform_points(100));
    let mut layer = initialized_layer(&props);

    let mut shifted = props.clone();
    shifted.get_position =
        Arc::new(|d: &PointDatum| [d.position[0] + 0.5, d.position[1], d.position[2]]);
    host_update(&mut layer, &props, &shifted).unwrap();

    let state = layer.state();
    assert_eq!(layer.aggregator().unwrap().runs(), 2);
    assert!(state.contours_current());
    assert!(state.grid.as_ref().unwrap().origin[0] > -122.0);
}

// ============================================================================
// Idempotence tests
// ============================================================================

#[test]
fn test_unchanged_update_keeps_output() {
    let props = ContourLayerProps::new(uniform_points(100));
    let mut layer = initialized_layer(&props);
    let first = layer.render();

    host_update(&mut layer, &props, &props).unwrap();
    host_update(&mut layer, &props, &props).unwrap();

    let state = layer.state();
    assert_eq!(state.aggregation_passes, 1);
    assert_eq!(state.contour_passes, 1);
    assert_eq!(layer.render(), first);
}

#[test]
fn test_forced_regeneration_is_deterministic() {
    let props = ContourLayerProps::new(uniform_points(100));
    let mut layer = initialized_layer(&props);
    let first = layer.state().contours.clone();

    // Host reports a data change without replacing the data
    layer
        .update(UpdateParams {
            old_props: Some(&props),
            props: &props,
            change_flags: ChangeFlags {
                data_changed: true,
                ..Default::default()
            },
        })
        .unwrap();

    let state = layer.state();
    assert_eq!(state.aggregation_passes, 2);
    assert_eq!(state.contours, first);
}

// ============================================================================
// Color tests
// ============================================================================

#[test]
fn test_rendered_colors_follow_threshold_table() {
    let props = ContourLayerProps::new(points(create_cluster_positions(
        2000,
        (-122.45, 37.755),
        0.02,
        5,
    )));
    let layer = initialized_layer(&props);
    let sub_layer = layer.render();
    assert!(!sub_layer.data.is_empty());

    for line in &sub_layer.data {
        let i = thresholds::DEFAULT
            .iter()
            .position(|&t| t == line.threshold)
            .expect("threshold from the table");
        assert_eq!(line.color, thresholds::DEFAULT_COLORS[i]);
    }
}

#[test]
fn test_render_uses_fixed_line_style() {
    let props = ContourLayerProps::new(uniform_points(100));
    let layer = initialized_layer(&props);
    let sub_layer = layer.render();

    assert_eq!(sub_layer.id, "contours-contour-line-layer");
    assert_eq!(sub_layer.layer_type, "LineLayer");
    assert_eq!(sub_layer.opacity, 0.6);
    assert_eq!(sub_layer.stroke_width, 5.0);
    assert!(sub_layer.pickable);
    assert_eq!(sub_layer.data.len(), layer.state().contours.len());

    for (line, segment) in sub_layer.data.iter().zip(layer.state().contours.iter()) {
        assert_eq!(line.source_position, segment.start);
        assert_eq!(line.target_position, segment.end);
    }
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[test]
fn test_uniform_points_scenario() {
    let props = ContourLayerProps::new(uniform_points(100)).with_cell_size(cell_size::DEFAULT);
    let layer = initialized_layer(&props);

    let state = layer.state();
    let grid = state.grid.as_ref().unwrap();
    assert!(grid.counts.iter().any(|&c| c > 0.0));
    assert!(grid.max_count >= 1.0);
    assert_eq!(grid.total_count(), 100.0);

    for segment in state.contours.iter() {
        assert!(thresholds::DEFAULT.contains(&segment.threshold));
    }
}

#[test]
fn test_empty_dataset_scenario() {
    let props = ContourLayerProps::new(Vec::<PointDatum>::new());
    let layer = initialized_layer(&props);

    let state = layer.state();
    let grid = state.grid.as_ref().unwrap();
    assert!(grid.is_all_zero());
    assert!(state.contours.is_empty());
    assert!(layer.render().data.is_empty());
}

#[test]
fn test_coincident_points_scenario() {
    let data = points(create_uniform_positions(7, bbox::POINT, 1));
    let table = ThresholdTable::new(thresholds::OUTLINE.to_vec(), vec![[9, 9, 9]]).unwrap();
    let props = ContourLayerProps::new(data).with_thresholds(table);
    let layer = initialized_layer(&props);

    let state = layer.state();
    let grid = state.grid.as_ref().unwrap();
    assert_eq!(grid.size.len(), 1);
    assert_eq!(grid.max_count, 7.0);
    // The single occupied cell is outlined by a closed diamond
    assert_eq!(state.contours.len(), 4);
    assert!(layer.render().data.iter().all(|line| line.color == [9, 9, 9]));
}

#[test]
fn test_high_latitude_cells_widen() {
    let props = ContourLayerProps::new(points(create_uniform_positions(200, bbox::TROMSO, 4)));
    let layer = initialized_layer(&props);

    let state = layer.state();
    let grid = state.grid.as_ref().unwrap();
    // Near 69.65 degrees north a 1 km cell spans almost three times as many
    // degrees of longitude as of latitude
    let ratio = grid.cell_offset[0] / grid.cell_offset[1];
    assert!(ratio > 2.8 && ratio < 2.95, "ratio {ratio}");
    assert_eq!(grid.total_count(), 200.0);
}

#[test]
fn test_gpu_aggregation_matches_serial() {
    let data: Arc<[PointDatum]> = points(create_uniform_positions(20_000, bbox::EQUATOR, 9)).into();
    let serial = initialized_layer(&ContourLayerProps::new(Arc::clone(&data)));
    let parallel =
        initialized_layer(&ContourLayerProps::new(data).with_gpu_aggregation(true));

    assert_eq!(serial.state().grid, parallel.state().grid);
    assert_eq!(serial.state().contours, parallel.state().contours);
}

// ============================================================================
// Error propagation tests
// ============================================================================

#[test]
fn test_invalid_position_propagates_and_keeps_state() {
    let props = ContourLayerProps::new(uniform_points(50));
    let mut layer = initialized_layer(&props);
    let before = layer.state();

    let mut bad = uniform_points(50);
    bad[7].position[1] = f64::NAN;
    let bad_props = props.with_data(bad);

    let err = host_update(&mut layer, &props, &bad_props).unwrap_err();
    assert!(matches!(err, ContourError::InvalidPosition { index: 7 }));
    assert_eq!(layer.state(), before);
}

#[test]
fn test_zero_cell_size_fails_aggregation() {
    let props = ContourLayerProps::new(uniform_points(10)).with_cell_size(0.0);
    let mut layer = ContourLayer::new("contours");
    layer.initialize(&context()).unwrap();

    let err = layer.update(UpdateParams::initial(&props)).unwrap_err();
    assert!(matches!(err, ContourError::InvalidCellSize(_)));
}

#[test]
fn test_out_of_range_cell_size_rejected() {
    let props = ContourLayerProps::new(uniform_points(10)).with_cell_size(5000.0);
    let mut layer = ContourLayer::new("contours");
    layer.initialize(&context()).unwrap();
    assert!(layer.update(UpdateParams::initial(&props)).is_err());
    assert!(layer.props().is_none());
}

// ============================================================================
// Custom datum tests
// ============================================================================

struct Sensor {
    lon: f64,
    lat: f64,
}

#[test]
fn test_custom_position_accessor() {
    let sensors: Vec<Sensor> = create_uniform_positions(100, bbox::SAN_FRANCISCO, 2)
        .into_iter()
        .map(|p| Sensor { lon: p[0], lat: p[1] })
        .collect();
    let props = ContourLayerProps::with_position_accessor(sensors, |s: &Sensor| [s.lon, s.lat, 0.0]);

    let mut layer = ContourLayer::new("sensors");
    layer.initialize(&context()).unwrap();
    layer.update(UpdateParams::initial(&props)).unwrap();

    assert_eq!(layer.state().grid.as_ref().unwrap().total_count(), 100.0);
    let style = props.datum_style(&props.data[0]);
    assert_eq!(style.color, thresholds::MAGENTA);
    assert_eq!(style.width, 1.0);
}

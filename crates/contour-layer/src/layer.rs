//! Host-facing layer lifecycle.

use std::sync::Arc;

use contour_common::{ContourError, ContourResult};
use rayon::ThreadPool;

use crate::props::ContourLayerProps;

/// Shared resources a host hands to its layers.
#[derive(Debug, Clone)]
pub struct LayerContext {
    pool: Arc<ThreadPool>,
}

impl LayerContext {
    /// Build a context with a dedicated compute pool. `threads == 0` lets
    /// rayon choose.
    pub fn new(threads: usize) -> ContourResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("contour-aggregation-{}", i))
            .build()
            .map_err(|e| ContourError::ComputePool(e.to_string()))?;
        Ok(Self::with_pool(Arc::new(pool)))
    }

    pub fn with_pool(pool: Arc<ThreadPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<ThreadPool> {
        &self.pool
    }
}

/// What changed since the previous update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeFlags {
    /// The dataset was replaced
    pub data_changed: bool,
    /// Any non-data prop differs
    pub props_changed: bool,
    /// An accessor was replaced
    pub update_triggers_changed: bool,
}

impl ChangeFlags {
    /// Everything changed; used for the first update.
    pub fn all() -> Self {
        Self {
            data_changed: true,
            props_changed: true,
            update_triggers_changed: true,
        }
    }

    /// Diff two prop sets the way a host would before calling `update`.
    pub fn between<D>(old: Option<&ContourLayerProps<D>>, new: &ContourLayerProps<D>) -> Self {
        let Some(old) = old else {
            return Self::all();
        };

        Self {
            data_changed: !Arc::ptr_eq(&old.data, &new.data),
            props_changed: old.cell_size != new.cell_size
                || old.gpu_aggregation != new.gpu_aggregation
                || old.fp64 != new.fp64
                || old.width_scale != new.width_scale
                || old.visible != new.visible
                || old.thresholds != new.thresholds,
            update_triggers_changed: !Arc::ptr_eq(&old.get_position, &new.get_position)
                || !Arc::ptr_eq(&old.get_threshold, &new.get_threshold)
                || !Arc::ptr_eq(&old.get_color, &new.get_color)
                || !Arc::ptr_eq(&old.get_width, &new.get_width),
        }
    }

    pub fn any(&self) -> bool {
        self.data_changed || self.props_changed || self.update_triggers_changed
    }
}

/// Arguments of one `update` call.
#[derive(Debug)]
pub struct UpdateParams<'a, P> {
    /// Props from the previous update, `None` on the first one
    pub old_props: Option<&'a P>,
    pub props: &'a P,
    pub change_flags: ChangeFlags,
}

impl<'a, P> UpdateParams<'a, P> {
    /// Parameters for the first update after `initialize`.
    pub fn initial(props: &'a P) -> Self {
        Self {
            old_props: None,
            props,
            change_flags: ChangeFlags::all(),
        }
    }
}

/// Lifecycle a host drives on every layer it owns.
///
/// Calls are made from one thread, in order: `initialize` once, then any
/// number of `update`/`render` pairs.
pub trait Layer {
    type Props;
    type SubLayer;

    /// Unique layer id.
    fn id(&self) -> &str;

    /// Allocate per-layer resources from the host context.
    fn initialize(&mut self, context: &LayerContext) -> ContourResult<()>;

    /// React to new props.
    fn update(&mut self, params: UpdateParams<'_, Self::Props>) -> ContourResult<()>;

    /// Describe what should be drawn for the current state.
    fn render(&self) -> Self::SubLayer;
}

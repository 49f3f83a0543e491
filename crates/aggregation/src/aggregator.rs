//! Grid aggregator: bins positions into a fixed grid layout.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use contour_common::{ContourError, ContourResult, DensityGrid, GridSize, Position};
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Below this many points the parallel path falls back to a serial pass.
const MIN_PARALLEL_POINTS: usize = 4096;

/// How counts are accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Single pass on the calling thread.
    #[default]
    Serial,
    /// Chunked data-parallel pass on the aggregator's thread pool.
    Parallel,
}

impl AggregationMode {
    /// Map the layer's `gpu_aggregation` flag to a mode.
    pub fn from_gpu_flag(gpu_aggregation: bool) -> Self {
        if gpu_aggregation {
            Self::Parallel
        } else {
            Self::Serial
        }
    }
}

/// Placement of the grid in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub size: GridSize,
    pub origin: [f64; 2],
    pub cell_offset: [f64; 2],
}

impl GridLayout {
    /// Cell containing a position. Positions on the far edge of the grid
    /// land in the last column/row; positions outside return `None`.
    pub fn cell_of(&self, position: &Position) -> Option<(usize, usize)> {
        let fx = (position[0] - self.origin[0]) / self.cell_offset[0];
        let fy = (position[1] - self.origin[1]) / self.cell_offset[1];
        if !(fx >= 0.0 && fy >= 0.0) {
            return None;
        }

        let col = (fx.floor() as usize).min(self.size.cols.saturating_sub(1));
        let row = (fy.floor() as usize).min(self.size.rows.saturating_sub(1));
        if fx > self.size.cols as f64 || fy > self.size.rows as f64 {
            return None;
        }
        Some((col, row))
    }
}

/// Aggregator instance bound to a compute pool.
///
/// One aggregator belongs to one layer; `runs()` counts completed passes.
pub struct GridAggregator {
    id: String,
    pool: Arc<ThreadPool>,
    runs: AtomicU64,
}

impl std::fmt::Debug for GridAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridAggregator")
            .field("id", &self.id)
            .field("threads", &self.pool.current_num_threads())
            .field("runs", &self.runs())
            .finish()
    }
}

impl GridAggregator {
    pub fn new(id: impl Into<String>, pool: Arc<ThreadPool>) -> Self {
        Self {
            id: id.into(),
            pool,
            runs: AtomicU64::new(0),
        }
    }

    /// Create an aggregator with its own pool. `threads == 0` lets rayon pick.
    pub fn with_threads(id: impl Into<String>, threads: usize) -> ContourResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| ContourError::ComputePool(e.to_string()))?;
        Ok(Self::new(id, Arc::new(pool)))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of aggregation passes run so far.
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }

    /// Count positions per cell of `layout`.
    pub fn aggregate(
        &self,
        positions: &[Position],
        layout: &GridLayout,
        mode: AggregationMode,
    ) -> ContourResult<DensityGrid> {
        let cells = layout.size.len();
        let counts = match mode {
            AggregationMode::Parallel if positions.len() >= MIN_PARALLEL_POINTS => {
                self.count_parallel(positions, layout)
            }
            _ => count_serial(positions, layout),
        };

        if counts.len() != cells {
            return Err(ContourError::InternalError(format!(
                "aggregator '{}' produced {} cells, expected {}",
                self.id,
                counts.len(),
                cells
            )));
        }

        let max_count = counts.iter().copied().max().unwrap_or(0);
        self.runs.fetch_add(1, Ordering::Relaxed);

        debug!(
            aggregator = %self.id,
            ?mode,
            points = positions.len(),
            cols = layout.size.cols,
            rows = layout.size.rows,
            max_count = max_count,
            "Aggregated points"
        );

        Ok(DensityGrid {
            counts: counts.into_iter().map(|c| c as f32).collect(),
            max_count: max_count as f32,
            size: layout.size,
            origin: layout.origin,
            cell_offset: layout.cell_offset,
        })
    }

    fn count_parallel(&self, positions: &[Position], layout: &GridLayout) -> Vec<u32> {
        let cells = layout.size.len();
        self.pool.install(|| {
            let chunk_size = (positions.len() / rayon::current_num_threads()).max(1024);
            positions
                .par_chunks(chunk_size)
                .map(|chunk| count_serial(chunk, layout))
                .reduce(
                    || vec![0u32; cells],
                    |mut acc, local| {
                        for (a, b) in acc.iter_mut().zip(local) {
                            *a += b;
                        }
                        acc
                    },
                )
        })
    }
}

fn count_serial(positions: &[Position], layout: &GridLayout) -> Vec<u32> {
    let mut counts = vec![0u32; layout.size.len()];
    for position in positions {
        if let Some((col, row)) = layout.cell_of(position) {
            counts[row * layout.size.cols + col] += 1;
        }
    }
    counts
}

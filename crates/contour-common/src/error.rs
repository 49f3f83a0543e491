//! Error types for the contour layer crates.

use thiserror::Error;

/// Result type alias using ContourError.
pub type ContourResult<T> = Result<T, ContourError>;

/// Primary error type for aggregation, contouring and layer lifecycle.
#[derive(Debug, Error)]
pub enum ContourError {
    // === Configuration Errors ===
    #[error("Invalid cell size: {0} (expected a finite value in (0, 1000])")]
    InvalidCellSize(f64),

    #[error("Invalid threshold table: {0}")]
    InvalidThresholds(String),

    #[error("Threshold table has {thresholds} thresholds but {colors} colors")]
    MismatchedColorTable { thresholds: usize, colors: usize },

    #[error("Invalid configuration value for '{param}': {message}")]
    InvalidConfig { param: String, message: String },

    // === Data Errors ===
    #[error("Datum {index} has a non-finite position")]
    InvalidPosition { index: usize },

    #[error("Aggregation grid too large: {cols}x{rows} cells (limit {limit})")]
    GridTooLarge { cols: usize, rows: usize, limit: usize },

    // === Lifecycle Errors ===
    #[error("Layer '{0}' has not been initialized")]
    NotInitialized(String),

    #[error("Layer '{0}' is already initialized")]
    AlreadyInitialized(String),

    // === Infrastructure Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Compute pool error: {0}")]
    ComputePool(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ContourError {
    /// Whether the error was caused by caller-supplied configuration rather
    /// than by the data or the runtime.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ContourError::InvalidCellSize(_)
                | ContourError::InvalidThresholds(_)
                | ContourError::MismatchedColorTable { .. }
                | ContourError::InvalidConfig { .. }
        )
    }
}

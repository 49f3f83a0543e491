//! Test helpers shared by the contour crates.
//!
//! - [`generators`]: deterministic point sets and value grids
//! - [`fixtures`]: bounding boxes, threshold tables and cell sizes
//! - tolerance assertions for scalars and world positions
//!
//! ```ignore
//! use test_utils::{create_uniform_positions, fixtures::bbox};
//!
//! let points = create_uniform_positions(100, bbox::SAN_FRANCISCO, 1);
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;

/// Assert two numbers differ by at most `epsilon`. Both sides are compared
/// as `f64`.
///
/// ```ignore
/// assert_approx_eq!(segment.start[0], -122.45, 1e-9);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right, epsilon) = ($left as f64, $right as f64, $epsilon as f64);
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "values not within tolerance: {:?} vs {:?} (diff {:?}, epsilon {:?})",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Assert two `[x, y]` world positions match component-wise within `epsilon`.
#[macro_export]
macro_rules! assert_position_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right): ([f64; 2], [f64; 2]) = ($left, $right);
        $crate::assert_approx_eq!(left[0], right[0], $epsilon);
        $crate::assert_approx_eq!(left[1], right[1], $epsilon);
    }};
}

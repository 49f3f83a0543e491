//! Test data generators for point sets and density-like grids.
//!
//! All generators are deterministic so assertions can rely on exact output.

/// A position `[x, y, z]`, matching the layer's position type.
pub type TestPosition = [f64; 3];

/// Creates `count` positions spread uniformly over a bounding box.
///
/// Uses a hash of the point index and `seed`, so the same arguments always
/// produce the same points.
///
/// # Arguments
///
/// * `count` - Number of positions
/// * `bbox` - `(min_lon, min_lat, max_lon, max_lat)`
/// * `seed` - Seed value for deterministic generation
///
/// # Example
///
/// ```
/// use test_utils::create_uniform_positions;
///
/// let points = create_uniform_positions(100, (-122.5, 37.7, -122.4, 37.8), 7);
/// assert_eq!(points.len(), 100);
/// assert!(points.iter().all(|p| p[0] >= -122.5 && p[0] <= -122.4));
/// ```
pub fn create_uniform_positions(
    count: usize,
    bbox: (f64, f64, f64, f64),
    seed: u32,
) -> Vec<TestPosition> {
    let (min_x, min_y, max_x, max_y) = bbox;
    (0..count)
        .map(|i| {
            let fx = unit_float(simple_hash(i as u32, 0, seed));
            let fy = unit_float(simple_hash(i as u32, 1, seed));
            [
                min_x + fx * (max_x - min_x),
                min_y + fy * (max_y - min_y),
                0.0,
            ]
        })
        .collect()
}

/// Creates `count` positions packed around a center point.
///
/// Points fall inside a square of half-width `radius` (degrees) around
/// `center`, denser towards the middle.
pub fn create_cluster_positions(
    count: usize,
    center: (f64, f64),
    radius: f64,
    seed: u32,
) -> Vec<TestPosition> {
    (0..count)
        .map(|i| {
            // Product of two uniforms in [-1, 1] concentrates near zero
            let a = unit_float(simple_hash(i as u32, 0, seed)) * 2.0 - 1.0;
            let b = unit_float(simple_hash(i as u32, 1, seed));
            let c = unit_float(simple_hash(i as u32, 2, seed)) * 2.0 - 1.0;
            let d = unit_float(simple_hash(i as u32, 3, seed));
            [center.0 + a * b * radius, center.1 + c * d * radius, 0.0]
        })
        .collect()
}

/// Creates a grid with a single smooth peak in the middle.
///
/// The center cell holds `peak`; values fall off linearly to 0 at the
/// grid's edges.
///
/// # Returns
///
/// A `Vec<f32>` in row-major order.
pub fn create_peak_grid(width: usize, height: usize, peak: f32) -> Vec<f32> {
    let center_x = (width as f32 - 1.0) / 2.0;
    let center_y = (height as f32 - 1.0) / 2.0;
    let max_dist = center_x.max(center_y).max(1.0);

    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let dx = col as f32 - center_x;
            let dy = row as f32 - center_y;
            let dist = (dx * dx + dy * dy).sqrt();
            data.push((peak * (1.0 - dist / max_dist)).max(0.0));
        }
    }
    data
}

/// Creates a grid filled with a constant value.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Creates a grid with NaN values at specified positions.
///
/// # Arguments
///
/// * `width` - Number of columns
/// * `height` - Number of rows
/// * `nan_positions` - List of (col, row) positions that should be NaN
///
/// # Returns
///
/// A `Vec<f32>` with NaN at specified positions, zeros elsewhere.
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    nan_positions: &[(usize, usize)],
) -> Vec<f32> {
    let mut data = vec![0.0f32; width * height];
    for &(col, row) in nan_positions {
        if col < width && row < height {
            data[row * width + col] = f32::NAN;
        }
    }
    data
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

/// Map a hash to `[0, 1]`.
fn unit_float(h: u32) -> f64 {
    h as f64 / u32::MAX as f64
}

//! Common test fixtures for contour layer tests.

/// Common bounding box definitions, as `(min_lon, min_lat, max_lon, max_lat)`.
pub mod bbox {
    /// Roughly 4.4 km x 5.5 km around central San Francisco
    pub const SAN_FRANCISCO: (f64, f64, f64, f64) = (-122.475, 37.73, -122.425, 37.78);

    /// Small box on the equator, about 11 km on a side
    pub const EQUATOR: (f64, f64, f64, f64) = (0.0, 0.0, 0.1, 0.1);

    /// High latitude box where longitude offsets stretch
    pub const TROMSO: (f64, f64, f64, f64) = (18.9, 69.6, 19.1, 69.7);

    /// Single point (degenerate bbox)
    pub const POINT: (f64, f64, f64, f64) = (0.0, 0.0, 0.0, 0.0);
}

/// Threshold/color tables used across tests.
pub mod thresholds {
    /// The layer's default iso-values
    pub const DEFAULT: [f64; 3] = [0.999, 10.0, 20.0];

    /// The layer's default colors
    pub const DEFAULT_COLORS: [[u8; 3]; 3] = [[255, 0, 0], [0, 255, 0], [0, 0, 255]];

    /// Fallback color for unknown thresholds
    pub const MAGENTA: [u8; 3] = [255, 0, 255];

    /// A single low iso-value that traces the outline of any occupied cell
    pub const OUTLINE: [f64; 1] = [0.5];
}

/// Cell sizes in meters.
pub mod cell_size {
    pub const DEFAULT: f64 = 1000.0;
    pub const FINE: f64 = 250.0;
}

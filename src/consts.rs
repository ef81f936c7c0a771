//! Constants describing the Vu8 sensor and its observed filter configuration.

/// Number of segments (beams) reported in one Vu8 frame.
pub const VU8_BEAM_COUNT: usize = 8;

/// Number of calibrated values averaged per beam.
pub const DEFAULT_WINDOW_SIZE: usize = 5;

/// Largest deviation from the neighbor average, in meters, kept as-is by the spike filter.
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 0.1;

/// Mirrored beam pairs of the Vu8 fan. A flat target is seen symmetrically by both beams.
pub const VU8_MIRRORED_PAIRS: [(usize, usize); 4] = [(0, 7), (1, 6), (2, 5), (3, 4)];

/// Reference baseline capture, in meters, taken against a flat wall.
pub const VU8_REFERENCE_BASELINE: [[f64; VU8_BEAM_COUNT]; 3] = [
    [2.65, 2.37, 2.18, 2.08, 2.08, 2.25, 2.49, 2.9],
    [2.66, 2.38, 2.17, 2.09, 2.08, 2.26, 2.48, 2.89],
    [2.64, 2.36, 2.19, 2.08, 2.09, 2.24, 2.50, 2.91],
];

//! Echo records as delivered by the sensor SDK and their conversion into raw frames.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One detection on one segment.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Echo {
    /// Segment (beam) index.
    pub indices: usize,
    /// Measured distance in meters.
    pub distances: f64,
    #[serde(default)]
    pub amplitudes: f64,
    #[serde(default)]
    pub flags: u16,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    /// Acquisition timestamp, microseconds.
    #[serde(default)]
    pub timestamps: u64,
}

/// Orders `echoes` by segment and extracts one distance per beam.
///
/// A batch of the wrong size is reported as [`Error::ShapeMismatch`]. A batch that does
/// not hold every segment of `0..beam_count` exactly once is reported as
/// [`Error::SegmentMismatch`] at the first segment out of place.
pub fn raw_frame(echoes: &[Echo], beam_count: usize) -> Result<Vec<f64>> {
    if echoes.len() != beam_count {
        return Err(Error::ShapeMismatch {
            expected: beam_count,
            actual: echoes.len(),
        });
    }

    let ordered = echoes.iter().sorted_by_key(|echo| echo.indices).collect_vec();
    if let Some((segment, echo)) = ordered
        .iter()
        .enumerate()
        .find(|(segment, echo)| echo.indices != *segment)
    {
        return Err(Error::SegmentMismatch {
            expected: segment,
            actual: echo.indices,
        });
    }

    Ok(ordered.iter().map(|echo| echo.distances).collect())
}

//! Filter parameters and calibration files.
//!
//! A calibration file is a TOML document holding the baseline capture and, optionally,
//! a `[filter]` table. Missing filter keys fall back to the Vu8 defaults:
//!
//! ```toml
//! baseline = [
//!     [2.65, 2.37, 2.18, 2.08, 2.08, 2.25, 2.49, 2.9],
//!     [2.66, 2.38, 2.17, 2.09, 2.08, 2.26, 2.48, 2.89],
//! ]
//!
//! [filter]
//! window_size = 5
//! outlier_threshold = 0.1
//! ```

use std::{collections::HashSet, fs, path::Path};

use anyhow::Context;
use derivative::Derivative;
use serde::{Deserialize, Serialize};

use crate::consts;
use crate::error::{Error, Result};
use crate::filter::BeamCalibrationFilter;

/// Shape and tuning of a [`BeamCalibrationFilter`].
#[derive(Derivative, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[derivative(Default)]
#[serde(default)]
pub struct FilterConfig {
    /// Number of beams per frame.
    #[derivative(Default(value = "consts::VU8_BEAM_COUNT"))]
    pub beam_count: usize,
    /// Mirrored beam pairs forced to a shared baseline.
    #[derivative(Default(value = "consts::VU8_MIRRORED_PAIRS.to_vec()"))]
    pub pairs: Vec<(usize, usize)>,
    /// Moving-average window length per beam.
    #[derivative(Default(value = "consts::DEFAULT_WINDOW_SIZE"))]
    pub window_size: usize,
    /// Spike threshold, same unit as the distances.
    #[derivative(Default(value = "consts::DEFAULT_OUTLIER_THRESHOLD"))]
    pub outlier_threshold: f64,
}

impl FilterConfig {
    /// Mirrored pairing `(i, n - 1 - i)` for a fan of `n` beams.
    pub fn default_pairs(beam_count: usize) -> Vec<(usize, usize)> {
        (0..beam_count / 2)
            .map(|i| (i, beam_count - 1 - i))
            .collect()
    }

    /// Default configuration for a fan of `beam_count` beams with mirrored pairing.
    pub fn with_beam_count(beam_count: usize) -> Self {
        Self {
            beam_count,
            pairs: Self::default_pairs(beam_count),
            ..Self::default()
        }
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_outlier_threshold(mut self, threshold: f64) -> Self {
        self.outlier_threshold = threshold;
        self
    }

    pub fn with_pairs(mut self, pairs: Vec<(usize, usize)>) -> Self {
        self.pairs = pairs;
        self
    }

    /// Checks the configuration on its own, without any baseline samples.
    pub fn validate(&self) -> Result<()> {
        if self.beam_count == 0 {
            return Err(Error::configuration("beam count must be positive"));
        }
        if self.beam_count % 2 != 0 {
            return Err(Error::configuration(format!(
                "beam count must be even for mirrored pairing, got {}",
                self.beam_count
            )));
        }
        if self.window_size == 0 {
            return Err(Error::configuration("window size must be at least 1"));
        }
        if !self.outlier_threshold.is_finite() || self.outlier_threshold < 0.0 {
            return Err(Error::configuration(format!(
                "outlier threshold must be finite and non-negative, got {}",
                self.outlier_threshold
            )));
        }

        let mut seen = HashSet::with_capacity(self.beam_count);
        for &(i, j) in &self.pairs {
            if i >= self.beam_count || j >= self.beam_count {
                return Err(Error::configuration(format!(
                    "pair ({}, {}) out of range for {} beams",
                    i, j, self.beam_count
                )));
            }
            if i == j {
                return Err(Error::configuration(format!(
                    "beam {} cannot be paired with itself",
                    i
                )));
            }
            for beam in [i, j] {
                if !seen.insert(beam) {
                    return Err(Error::configuration(format!(
                        "beam {} appears in more than one pair",
                        beam
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Baseline capture plus filter parameters, as stored on disk.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CalibrationFile {
    #[serde(default)]
    pub filter: FilterConfig,
    /// Frames captured against a flat target, one distance per beam each.
    pub baseline: Vec<Vec<f64>>,
}

impl CalibrationFile {
    /// Built-in Vu8 reference capture with default filter parameters.
    pub fn reference() -> Self {
        Self {
            filter: FilterConfig::default(),
            baseline: consts::VU8_REFERENCE_BASELINE
                .iter()
                .map(|sample| sample.to_vec())
                .collect(),
        }
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let file = toml::from_str(s).context("malformed calibration file")?;
        Ok(file)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read calibration file {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("cannot parse calibration file {}", path.display()))
    }

    /// Builds a fresh filter from this capture.
    pub fn build_filter(&self) -> Result<BeamCalibrationFilter> {
        BeamCalibrationFilter::new(&self.baseline, self.filter.clone())
    }
}

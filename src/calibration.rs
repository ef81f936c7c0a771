//! Fixed per-beam offsets derived from a flat-target baseline capture.
//!
//! A flat wall seen by a mirrored fan produces the same distance on beam `i` and on its
//! mirror `j`. Whatever the capture shows beyond that symmetry is treated as systematic
//! per-beam bias and becomes the beam's offset.

use log::debug;

use crate::config::FilterConfig;
use crate::error::{Error, Result};

/// Average, symmetrized baseline and offsets of one capture.
#[derive(Clone, Debug, PartialEq)]
pub struct BaselineCalibration {
    average: Vec<f64>,
    symmetrized: Vec<f64>,
    offsets: Vec<f64>,
}

impl BaselineCalibration {
    /// Derives the calibration from `samples`, each holding `config.beam_count` distances.
    ///
    /// The configuration is validated first, so an odd beam count or a malformed pair
    /// list fails here as well.
    pub fn from_samples<S: AsRef<[f64]>>(samples: &[S], config: &FilterConfig) -> Result<Self> {
        config.validate()?;

        if samples.is_empty() {
            return Err(Error::configuration("at least one baseline sample is required"));
        }
        let n = config.beam_count;
        let samples: Vec<&[f64]> = samples.iter().map(AsRef::as_ref).collect();
        if let Some((index, sample)) = samples
            .iter()
            .enumerate()
            .find(|(_, sample)| sample.len() != n)
        {
            return Err(Error::configuration(format!(
                "baseline sample {} has {} beams, expected {}",
                index,
                sample.len(),
                n
            )));
        }

        let count = samples.len() as f64;
        let mut average = vec![0.0; n];
        for sample in &samples {
            for (acc, value) in average.iter_mut().zip(sample.iter()) {
                *acc += value;
            }
        }
        for value in average.iter_mut() {
            *value /= count;
        }

        let mut symmetrized = average.clone();
        for &(i, j) in &config.pairs {
            let mean = (average[i] + average[j]) / 2.0;
            symmetrized[i] = mean;
            symmetrized[j] = mean;
        }

        let offsets = average
            .iter()
            .zip(&symmetrized)
            .map(|(avg, sym)| avg - sym)
            .collect::<Vec<_>>();

        debug!(
            "baseline calibration from {} samples, offsets {:?}",
            samples.len(),
            offsets
        );

        Ok(Self {
            average,
            symmetrized,
            offsets,
        })
    }

    pub fn average(&self) -> &[f64] {
        &self.average
    }

    pub fn symmetrized(&self) -> &[f64] {
        &self.symmetrized
    }

    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    /// Subtracts each beam's offset. `raw` must hold one value per beam.
    pub(crate) fn apply(&self, raw: &[f64]) -> Vec<f64> {
        raw.iter()
            .zip(&self.offsets)
            .map(|(value, offset)| value - offset)
            .collect()
    }
}

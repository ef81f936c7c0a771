//! Calibration, spike rejection and smoothing of multi-beam distance frames.

use itertools::Itertools;
use log::trace;

use crate::calibration::BaselineCalibration;
use crate::config::FilterConfig;
use crate::error::{Error, Result};
use crate::window::BeamWindow;

/// Stateful per-beam processor for one sensor.
///
/// Offsets are fixed at construction. The only state that changes afterwards is the
/// smoothing window of each beam, so frames must be fed in arrival order through a single
/// `&mut` owner. Separate instances share nothing.
#[derive(Clone, Debug)]
pub struct BeamCalibrationFilter {
    config: FilterConfig,
    calibration: BaselineCalibration,
    windows: Vec<BeamWindow>,
}

impl BeamCalibrationFilter {
    /// Builds a filter from a flat-target baseline capture.
    ///
    /// Fails with [`Error::Configuration`] if `config` is invalid, if there are no
    /// samples, or if any sample does not hold exactly `config.beam_count` distances.
    pub fn new<S: AsRef<[f64]>>(baseline_samples: &[S], config: FilterConfig) -> Result<Self> {
        let calibration = BaselineCalibration::from_samples(baseline_samples, &config)?;
        let windows = (0..config.beam_count)
            .map(|_| BeamWindow::new(config.window_size))
            .collect();

        Ok(Self {
            config,
            calibration,
            windows,
        })
    }

    /// Calibrates, de-spikes and smooths one raw frame.
    ///
    /// A frame of the wrong width is rejected with [`Error::ShapeMismatch`] before any
    /// window is touched.
    pub fn process(&mut self, raw: &[f64]) -> Result<Vec<f64>> {
        let calibrated = self.calibrate(raw)?;
        let filtered = reject_outliers(&calibrated, self.config.outlier_threshold);

        let smoothed = self
            .windows
            .iter_mut()
            .zip(filtered)
            .map(|(window, value)| window.push(value))
            .collect();

        Ok(smoothed)
    }

    /// Offset subtraction only. Does not touch the smoothing windows.
    pub fn calibrate(&self, raw: &[f64]) -> Result<Vec<f64>> {
        self.check_shape(raw)?;
        Ok(self.calibration.apply(raw))
    }

    fn check_shape(&self, frame: &[f64]) -> Result<()> {
        if frame.len() != self.config.beam_count {
            return Err(Error::ShapeMismatch {
                expected: self.config.beam_count,
                actual: frame.len(),
            });
        }
        Ok(())
    }

    pub fn beam_count(&self) -> usize {
        self.config.beam_count
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn offsets(&self) -> &[f64] {
        self.calibration.offsets()
    }

    pub fn average_baseline(&self) -> &[f64] {
        self.calibration.average()
    }

    pub fn symmetrized_baseline(&self) -> &[f64] {
        self.calibration.symmetrized()
    }

    /// Number of values currently held for `beam`, `None` if out of range.
    pub fn window_len(&self, beam: usize) -> Option<usize> {
        self.windows.get(beam).map(BeamWindow::len)
    }
}

/// Replaces interior spikes with the average of their two neighbors.
///
/// A beam is a spike when it differs from its neighbor average by more than `threshold`.
/// Every decision reads the input slice, never an already replaced value, so two adjacent
/// spikes are both judged against the original readings. The first and last beams have a
/// single neighbor and are kept as-is.
pub fn reject_outliers(calibrated: &[f64], threshold: f64) -> Vec<f64> {
    let mut filtered = calibrated.to_vec();

    for (i, (prev, current, next)) in calibrated.iter().copied().tuple_windows().enumerate() {
        let neighbor_avg = 0.5 * (prev + next);
        if (current - neighbor_avg).abs() > threshold {
            trace!(
                "beam {}: spike {} replaced by neighbor average {}",
                i + 1,
                current,
                neighbor_avg
            );
            filtered[i + 1] = neighbor_avg;
        }
    }

    filtered
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::consts::VU8_REFERENCE_BASELINE;

    fn flat_filter(config: FilterConfig) -> BeamCalibrationFilter {
        let baseline = vec![vec![1.0; config.beam_count]];
        BeamCalibrationFilter::new(&baseline, config).unwrap()
    }

    #[test]
    fn flat_baseline_has_zero_offsets() {
        let filter = flat_filter(FilterConfig::default());
        assert!(filter.offsets().iter().all(|&offset| offset == 0.0));
    }

    fn reject_outliers_in_place(values: &[f64], threshold: f64) -> Vec<f64> {
        let mut out = values.to_vec();
        for i in 1..out.len().saturating_sub(1) {
            let neighbor_avg = 0.5 * (out[i - 1] + out[i + 1]);
            if (out[i] - neighbor_avg).abs() > threshold {
                out[i] = neighbor_avg;
            }
        }
        out
    }

    #[test]
    fn single_spike_is_replaced() {
        // The spike also pulls the neighbor average of beams 2 and 4 to 3.
        let out = reject_outliers(&[1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0], 0.1);
        assert_eq!(out, vec![1.0, 1.0, 3.0, 1.0, 3.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn adjacent_spikes_use_original_neighbors() {
        let frame = [1.0, 1.0, 5.0, 5.0, 1.0, 1.0, 1.0, 1.0];
        let out = reject_outliers(&frame, 0.1);
        assert_eq!(out, vec![1.0, 3.0, 3.0, 3.0, 3.0, 1.0, 1.0, 1.0]);

        let in_place = reject_outliers_in_place(&frame, 0.1);
        assert_eq!(in_place[2], 4.0);
        assert_ne!(out, in_place);
    }

    #[test]
    fn boundary_beams_are_never_replaced() {
        let out = reject_outliers(&[9.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, -4.0], 0.1);
        assert_eq!(out[0], 9.0);
        assert_eq!(out[7], -4.0);
    }

    #[test]
    fn deviation_at_threshold_is_kept() {
        let out = reject_outliers(&[1.0, 1.5, 1.0], 0.5);
        assert_eq!(out, vec![1.0, 1.5, 1.0]);
        let out = reject_outliers(&[1.0, 1.75, 1.0], 0.5);
        assert_eq!(out, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn short_frames_pass_through() {
        assert_eq!(reject_outliers(&[3.0, 9.0], 0.1), vec![3.0, 9.0]);
        assert!(reject_outliers(&[], 0.1).is_empty());
    }

    #[test]
    fn process_rejects_spike_before_smoothing() {
        let mut filter = flat_filter(FilterConfig::default());
        let out = filter
            .process(&[1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0])
            .unwrap();
        assert_eq!(out, vec![1.0, 1.0, 3.0, 1.0, 3.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn wrong_width_leaves_state_untouched() {
        let mut filter = flat_filter(FilterConfig::default());
        filter.process(&[2.0; 8]).unwrap();

        let err = filter.process(&[2.0; 7]).unwrap_err();
        assert_eq!(
            err,
            Error::ShapeMismatch {
                expected: 8,
                actual: 7
            }
        );
        assert!(filter.process(&[2.0; 9]).is_err());
        assert!(filter.calibrate(&[]).is_err());

        for beam in 0..8 {
            assert_eq!(filter.window_len(beam), Some(1));
        }
        assert_eq!(filter.window_len(8), None);
    }

    #[test]
    fn smoothing_converges_on_constant_input() {
        let mut filter = flat_filter(FilterConfig::default());
        filter.process(&[4.0; 8]).unwrap();
        let mut out = Vec::new();
        for _ in 0..5 {
            out = filter.process(&[2.5; 8]).unwrap();
        }
        for value in out {
            assert_relative_eq!(value, 2.5);
        }
    }

    #[test]
    fn oldest_value_is_evicted() {
        let mut filter = flat_filter(FilterConfig::default().with_window_size(3));
        let mut out = Vec::new();
        for value in [1.0, 2.0, 3.0, 4.0] {
            out = filter.process(&[value; 8]).unwrap();
        }
        for value in out {
            assert_relative_eq!(value, 3.0);
        }
        assert_eq!(filter.window_len(0), Some(3));
    }

    #[test]
    fn beams_are_smoothed_independently() {
        let mut filter = flat_filter(FilterConfig::with_beam_count(2));
        filter.process(&[1.0, 10.0]).unwrap();
        let out = filter.process(&[3.0, 20.0]).unwrap();
        assert_eq!(out, vec![2.0, 15.0]);
    }

    #[test]
    fn reference_offsets_are_exposed() {
        let filter =
            BeamCalibrationFilter::new(&VU8_REFERENCE_BASELINE, FilterConfig::default()).unwrap();
        assert_eq!(filter.beam_count(), 8);
        assert_eq!(filter.config(), &FilterConfig::default());
        let sym = filter.symmetrized_baseline();
        for i in 0..4 {
            assert_eq!(sym[i], sym[7 - i]);
        }
        assert_relative_eq!(filter.average_baseline()[6], 2.49, epsilon = 1e-9);
    }

    #[test]
    fn odd_beam_count_fails_construction() {
        let baseline = vec![vec![1.0; 7]];
        let err =
            BeamCalibrationFilter::new(&baseline, FilterConfig::with_beam_count(7)).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn filter_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BeamCalibrationFilter>();
    }
}

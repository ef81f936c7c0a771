//! Per-beam moving average.

use std::collections::VecDeque;

/// Bounded FIFO of the most recent calibrated values of one beam.
#[derive(Clone, Debug)]
pub struct BeamWindow {
    values: VecDeque<f64>,
    capacity: usize,
}

impl BeamWindow {
    /// A window holding at most `capacity` values. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `value`, evicting the oldest entry when full, and returns the new mean.
    pub fn push(&mut self, value: f64) -> f64 {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
        self.mean()
    }

    fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }
}

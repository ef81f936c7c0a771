//! Error types for the beam calibration filter.

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or running a [`crate::BeamCalibrationFilter`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Malformed configuration or baseline samples. No filter is produced.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A frame did not carry exactly one distance per beam. Filter state is unchanged.
    #[error("Shape mismatch: expected {expected} beams, got {actual}")]
    ShapeMismatch {
        /// Beam count the filter was built for
        expected: usize,
        /// Length of the rejected frame
        actual: usize,
    },

    /// An echo batch had the right size but a duplicate or missing segment.
    #[error("Segment mismatch: expected segment {expected}, got {actual}")]
    SegmentMismatch {
        /// Segment index due at this position of the ordered batch
        expected: usize,
        /// Segment index found there
        actual: usize,
    },
}

impl Error {
    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }
}

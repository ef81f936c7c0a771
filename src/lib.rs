//! Per-beam calibration and filtering for 8-segment Leddar Vu8 distance frames.
//!
//! ```
//! use leddar_vu8::{BeamCalibrationFilter, FilterConfig, consts::VU8_REFERENCE_BASELINE};
//!
//! let mut filter =
//!     BeamCalibrationFilter::new(&VU8_REFERENCE_BASELINE, FilterConfig::default()).unwrap();
//! let out = filter
//!     .process(&[2.68, 2.35, 2.16, 2.09, 2.10, 2.26, 2.51, 2.89])
//!     .unwrap();
//! assert_eq!(out.len(), 8);
//! ```

pub mod calibration;
pub mod config;
pub mod consts;
pub mod echo;
pub mod error;
pub mod filter;
pub mod window;

pub use calibration::BaselineCalibration;
pub use config::{CalibrationFile, FilterConfig};
pub use echo::{raw_frame, Echo};
pub use error::{Error, Result};
pub use filter::{reject_outliers, BeamCalibrationFilter};
pub use window::BeamWindow;

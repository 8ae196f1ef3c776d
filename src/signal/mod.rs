//! Signal processing for tracked landmarks
//!
//! This module turns raw detector output into stable control values:
//! - Metric extraction (reference points, lip gap, pinch, palm height)
//! - Raw control composition across subject kinds
//! - Per-channel exponential smoothing

pub mod extractor;
pub mod smoother;

pub use extractor::{compose_raw_controls, FaceMetrics, HandMetrics, MetricExtractor};
pub use smoother::{ControlMemory, ControlSmoother};

//! Signal-processing settings: extractor calibration and smoothing factors
//!
//! The thresholds here are tuned empirically against a typical webcam at
//! arm's length. They are calibration parameters, not physical constants,
//! which is why they live in config rather than in the extractor.
//!
//! # Main Types
//!
//! - [`CalibrationConfig`] - Landmark indices, jaw clamp, pinch window
//! - [`SmoothingConfig`] - Per-channel exponential smoothing factors

use crate::error::{Result, StageError};
use crate::tracking::landmarks;
use serde::{Deserialize, Serialize};

/// Metric extractor calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Upper bound for the lip-gap distance (normalized units)
    pub jaw_max: f32,

    /// Thumb/index distance at or above which pinch reads 0
    pub pinch_open_distance: f32,

    /// Thumb/index distance at or below which pinch reads 1
    pub pinch_closed_distance: f32,

    /// Face reference landmark candidates, first available wins
    pub face_reference_indices: Vec<usize>,

    /// Upper inner lip landmark
    pub upper_lip_index: usize,

    /// Lower inner lip landmark
    pub lower_lip_index: usize,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            jaw_max: 0.1,
            pinch_open_distance: 0.15,
            pinch_closed_distance: 0.03,
            face_reference_indices: vec![
                landmarks::FACE_NOSE_TIP,
                landmarks::FACE_NOSE_BOTTOM,
                landmarks::FACE_UPPER_LIP_CENTER,
            ],
            upper_lip_index: landmarks::FACE_UPPER_LIP_INNER,
            lower_lip_index: landmarks::FACE_LOWER_LIP_INNER,
        }
    }
}

impl CalibrationConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.jaw_max > 0.0) {
            return Err(StageError::Config(format!(
                "calibration.jaw_max must be positive, got {}",
                self.jaw_max
            )));
        }
        if !(self.pinch_closed_distance >= 0.0)
            || !(self.pinch_closed_distance < self.pinch_open_distance)
        {
            return Err(StageError::Config(format!(
                "calibration pinch window must satisfy 0 <= closed < open, got closed={} open={}",
                self.pinch_closed_distance, self.pinch_open_distance
            )));
        }
        if self.face_reference_indices.is_empty() {
            return Err(StageError::Config(
                "calibration.face_reference_indices must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Exponential smoothing factors, one per channel (and tracking state).
///
/// Each factor is the fraction of the remaining distance to the raw value
/// covered per tick, so the error shrinks by `(1 - alpha)` per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub tilt_lift_alpha: f32,
    pub jaw_alpha: f32,
    pub pinch_tracked_alpha: f32,
    pub pinch_untracked_alpha: f32,
    pub presence_alpha: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            tilt_lift_alpha: 0.25,
            jaw_alpha: 0.2,
            pinch_tracked_alpha: 0.4,
            pinch_untracked_alpha: 0.1,
            presence_alpha: 0.15,
        }
    }
}

impl SmoothingConfig {
    fn alphas(&self) -> [(&'static str, f32); 5] {
        [
            ("tilt_lift_alpha", self.tilt_lift_alpha),
            ("jaw_alpha", self.jaw_alpha),
            ("pinch_tracked_alpha", self.pinch_tracked_alpha),
            ("pinch_untracked_alpha", self.pinch_untracked_alpha),
            ("presence_alpha", self.presence_alpha),
        ]
    }

    /// Smallest factor across all channels (slowest convergence).
    pub fn min_alpha(&self) -> f32 {
        self.alphas()
            .iter()
            .map(|(_, a)| *a)
            .fold(f32::INFINITY, f32::min)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, alpha) in self.alphas() {
            if !(alpha > 0.0 && alpha <= 1.0) {
                return Err(StageError::Config(format!(
                    "smoothing.{} must be in (0, 1], got {}",
                    name, alpha
                )));
            }
        }
        Ok(())
    }
}

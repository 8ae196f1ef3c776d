//! Metric extraction
//!
//! Reduces subject point sets to a handful of named scalars. Extraction is
//! a pure function of the point sets and the calibration: the same input
//! always yields the same metrics, and an empty input yields the documented
//! defaults rather than an error.
//!
//! When several instances of a kind are tracked, the first one drives the
//! metrics and the rest only contribute to `count`.

use crate::config::CalibrationConfig;
use crate::tracking::landmarks;
use crate::types::{ControlValues, SubjectPointSet, TILT_RANGE};
use serde::{Deserialize, Serialize};

/// Face measurements for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceMetrics {
    /// Number of faces tracked this frame
    pub count: usize,
    /// Reference point x, `0.5` when untracked
    pub nose_x: f32,
    /// Reference point y, `0.5` when untracked
    pub nose_y: f32,
    /// Lip gap clamped to `[0, jaw_max]`, `0` when untracked
    pub jaw: f32,
}

impl Default for FaceMetrics {
    fn default() -> Self {
        Self {
            count: 0,
            nose_x: 0.5,
            nose_y: 0.5,
            jaw: 0.0,
        }
    }
}

impl FaceMetrics {
    pub fn is_tracked(&self) -> bool {
        self.count > 0
    }
}

/// Hand measurements for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandMetrics {
    /// Number of hands tracked this frame
    pub count: usize,
    /// Thumb/index closure in `[0, 1]`, `0` when untracked
    pub pinch: f32,
    /// Wrist y, `0.5` when untracked
    pub palm_y: f32,
}

impl Default for HandMetrics {
    fn default() -> Self {
        Self {
            count: 0,
            pinch: 0.0,
            palm_y: 0.5,
        }
    }
}

impl HandMetrics {
    pub fn is_tracked(&self) -> bool {
        self.count > 0
    }
}

/// Calibrated metric extractor.
#[derive(Debug, Clone, Default)]
pub struct MetricExtractor {
    calibration: CalibrationConfig,
}

impl MetricExtractor {
    pub fn new(calibration: CalibrationConfig) -> Self {
        Self { calibration }
    }

    pub fn calibration(&self) -> &CalibrationConfig {
        &self.calibration
    }

    pub fn jaw_max(&self) -> f32 {
        self.calibration.jaw_max
    }

    /// Face metrics from the tracked faces of one frame.
    pub fn extract_face(&self, faces: &[SubjectPointSet]) -> FaceMetrics {
        let mut metrics = FaceMetrics {
            count: faces.len(),
            ..FaceMetrics::default()
        };
        let Some(face) = faces.first() else {
            return metrics;
        };

        if let Some(reference) = self
            .calibration
            .face_reference_indices
            .iter()
            .find_map(|&index| face.get(index))
        {
            metrics.nose_x = reference.x;
            metrics.nose_y = reference.y;
        }

        if let (Some(upper), Some(lower)) = (
            face.get(self.calibration.upper_lip_index),
            face.get(self.calibration.lower_lip_index),
        ) {
            metrics.jaw = upper.distance(&lower).clamp(0.0, self.calibration.jaw_max);
        }

        metrics
    }

    /// Hand metrics from the tracked hands of one frame.
    pub fn extract_hand(&self, hands: &[SubjectPointSet]) -> HandMetrics {
        let mut metrics = HandMetrics {
            count: hands.len(),
            ..HandMetrics::default()
        };
        let Some(hand) = hands.first() else {
            return metrics;
        };

        if let (Some(thumb), Some(index)) = (
            hand.get(landmarks::THUMB_TIP),
            hand.get(landmarks::INDEX_TIP),
        ) {
            metrics.pinch = self.pinch_from_distance(thumb.distance(&index));
        }
        if let Some(wrist) = hand.get(landmarks::WRIST) {
            metrics.palm_y = wrist.y;
        }

        metrics
    }

    /// Map a thumb/index distance through the calibrated linear window.
    ///
    /// At or above the open threshold reads 0, at or below the closed
    /// threshold reads 1.
    pub fn pinch_from_distance(&self, distance: f32) -> f32 {
        let open = self.calibration.pinch_open_distance;
        let closed = self.calibration.pinch_closed_distance;
        let span = open - closed;
        if !(span > 0.0) || !distance.is_finite() {
            return 0.0;
        }
        ((open - distance) / span).clamp(0.0, 1.0)
    }
}

/// Combine per-kind metrics into the raw (unsmoothed) control vector.
pub fn compose_raw_controls(face: &FaceMetrics, hand: &HandMetrics) -> ControlValues {
    let tracked = face.is_tracked() || hand.is_tracked();
    ControlValues {
        tilt: (face.nose_x - 0.5).clamp(TILT_RANGE.0, TILT_RANGE.1),
        lift: ((0.5 - hand.palm_y) * 2.0).clamp(0.0, 1.0),
        pinch: hand.pinch,
        jaw: face.jaw,
        presence: if tracked { 1.0 } else { 0.0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::synthetic::{synthetic_face, synthetic_hand};
    use crate::types::Landmark;

    fn extractor() -> MetricExtractor {
        MetricExtractor::new(CalibrationConfig::default())
    }

    #[test]
    fn test_empty_input_yields_defaults() {
        let ex = extractor();
        assert_eq!(ex.extract_face(&[]), FaceMetrics::default());
        assert_eq!(ex.extract_hand(&[]), HandMetrics::default());

        let face = ex.extract_face(&[]);
        assert_eq!((face.count, face.nose_x, face.nose_y, face.jaw), (0, 0.5, 0.5, 0.0));
        let hand = ex.extract_hand(&[]);
        assert_eq!((hand.count, hand.pinch, hand.palm_y), (0, 0.0, 0.5));
    }

    #[test]
    fn test_face_reference_and_jaw() {
        let metrics = extractor().extract_face(&[synthetic_face((0.62, 0.4), 0.04)]);
        assert_eq!(metrics.count, 1);
        assert!((metrics.nose_x - 0.62).abs() < 1e-6);
        assert!((metrics.nose_y - 0.4).abs() < 1e-6);
        assert!((metrics.jaw - 0.04).abs() < 1e-5);
    }

    #[test]
    fn test_jaw_clamped_to_max() {
        let metrics = extractor().extract_face(&[synthetic_face((0.5, 0.5), 0.5)]);
        assert_eq!(metrics.jaw, 0.1);
    }

    #[test]
    fn test_reference_falls_back_through_preference_list() {
        let mut face = synthetic_face((0.3, 0.3), 0.0);
        face.points[landmarks::FACE_NOSE_TIP] = Landmark::new(f32::NAN, 0.3);
        face.points[landmarks::FACE_NOSE_BOTTOM] = Landmark::new(0.35, 0.32);
        let metrics = extractor().extract_face(&[face]);
        assert_eq!(metrics.nose_x, 0.35);
        assert_eq!(metrics.nose_y, 0.32);
    }

    #[test]
    fn test_short_model_variant_keeps_defaults() {
        // Only the upper-lip center exists
        let face = SubjectPointSet::new(vec![Landmark::new(0.7, 0.6)]);
        let metrics = extractor().extract_face(&[face]);
        assert_eq!(metrics.count, 1);
        assert_eq!(metrics.nose_x, 0.7);
        assert_eq!(metrics.jaw, 0.0);
    }

    #[test]
    fn test_pinch_window() {
        let ex = extractor();
        assert_eq!(ex.pinch_from_distance(0.3), 0.0);
        assert_eq!(ex.pinch_from_distance(0.15), 0.0);
        assert_eq!(ex.pinch_from_distance(0.03), 1.0);
        assert_eq!(ex.pinch_from_distance(0.0), 1.0);
        assert!((ex.pinch_from_distance(0.09) - 0.5).abs() < 1e-5);
        assert_eq!(ex.pinch_from_distance(f32::NAN), 0.0);
    }

    #[test]
    fn test_pinch_at_open_threshold() {
        let ex = extractor();
        let open = ex.calibration().pinch_open_distance;
        assert_eq!(ex.pinch_from_distance(open), 0.0);
        assert!(ex.pinch_from_distance(open - 0.012) > 0.09);

        // Landmark geometry lands within float noise of the threshold
        let at_threshold = ex.extract_hand(&[synthetic_hand((0.5, 0.25), open)]);
        assert!(at_threshold.pinch < 1e-5);
        let wide = ex.extract_hand(&[synthetic_hand((0.5, 0.25), 0.2)]);
        assert_eq!(wide.pinch, 0.0);
    }

    #[test]
    fn test_hand_metrics() {
        let metrics = extractor().extract_hand(&[
            synthetic_hand((0.5, 0.3), 0.03),
            synthetic_hand((0.1, 0.9), 0.3),
        ]);
        assert_eq!(metrics.count, 2);
        assert!((metrics.pinch - 1.0).abs() < 1e-5);
        assert!((metrics.palm_y - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_compose_neutral_when_untracked() {
        let raw = compose_raw_controls(&FaceMetrics::default(), &HandMetrics::default());
        assert_eq!(raw, ControlValues::NEUTRAL);
    }

    #[test]
    fn test_compose_formulas() {
        let face = FaceMetrics {
            count: 1,
            nose_x: 0.7,
            nose_y: 0.5,
            jaw: 0.05,
        };
        let hand = HandMetrics {
            count: 1,
            pinch: 0.6,
            palm_y: 0.25,
        };
        let raw = compose_raw_controls(&face, &hand);
        assert!((raw.tilt - 0.2).abs() < 1e-6);
        assert!((raw.lift - 0.5).abs() < 1e-6);
        assert_eq!(raw.pinch, 0.6);
        assert_eq!(raw.jaw, 0.05);
        assert_eq!(raw.presence, 1.0);

        let low_hand = HandMetrics {
            palm_y: 0.9,
            ..hand
        };
        assert_eq!(compose_raw_controls(&face, &low_hand).lift, 0.0);
    }
}

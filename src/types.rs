//! Core data types for kinetic-stage
//!
//! # Main Types
//!
//! - [`Landmark`] - A normalized 2-D tracked point
//! - [`SubjectKind`] - Which detector a point set came from (face or hand)
//! - [`SubjectPointSet`] - The ordered landmarks of one tracked instance
//! - [`ControlValues`] - The smoothed control vector driving the stage
//! - [`Frame`] - One camera image with its capture timestamp
//!
//! Landmarks are always copied out of detection results; nothing in this
//! module borrows from the detector.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// A normalized 2-D point, `x, y ∈ [0, 1]` relative to frame dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in normalized frame units.
    #[inline]
    pub fn distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Whether both coordinates are finite numbers.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// The kinds of subject the landmark source can track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubjectKind {
    Face,
    Hand,
}

impl SubjectKind {
    /// All subject kinds, in detector invocation order.
    pub fn all() -> &'static [SubjectKind] {
        &[SubjectKind::Face, SubjectKind::Hand]
    }

    /// Number of landmarks a full point set of this kind carries.
    pub fn landmark_count(&self) -> usize {
        match self {
            SubjectKind::Face => crate::tracking::landmarks::FACE_LANDMARK_COUNT,
            SubjectKind::Hand => crate::tracking::landmarks::HAND_LANDMARK_COUNT,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SubjectKind::Face => "Face",
            SubjectKind::Hand => "Hand",
        }
    }
}

impl std::fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// The ordered landmarks of one tracked face or hand for one frame.
///
/// The length is fixed by the subject kind for a given model, but model
/// variants may ship fewer points, so lookups go through [`get`](Self::get).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubjectPointSet {
    pub points: Vec<Landmark>,
}

impl SubjectPointSet {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    /// Landmark at `index`, or `None` if missing or non-finite.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Landmark> {
        self.points.get(index).copied().filter(Landmark::is_finite)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Detector output for one tick, one list per subject kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detections {
    pub faces: Vec<SubjectPointSet>,
    pub hands: Vec<SubjectPointSet>,
}

impl Detections {
    pub fn for_kind(&self, kind: SubjectKind) -> &[SubjectPointSet] {
        match kind {
            SubjectKind::Face => &self.faces,
            SubjectKind::Hand => &self.hands,
        }
    }

    pub fn set(&mut self, kind: SubjectKind, sets: Vec<SubjectPointSet>) {
        match kind {
            SubjectKind::Face => self.faces = sets,
            SubjectKind::Hand => self.hands = sets,
        }
    }

    /// True when no subject of any kind was tracked.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty() && self.hands.is_empty()
    }
}

/// Tilt range (symmetric around zero).
pub const TILT_RANGE: (f32, f32) = (-0.5, 0.5);

/// The canonical cross-subject control vector.
///
/// This is the only state carried across frames: created neutral at
/// runtime start, advanced by the smoother every live frame, and reset to
/// neutral on stop.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlValues {
    /// Head tilt, `[-0.5, 0.5]`.
    pub tilt: f32,
    /// Hand height, `[0, 1]`.
    pub lift: f32,
    /// Thumb/index pinch closure, `[0, 1]`.
    pub pinch: f32,
    /// Mouth opening, `[0, jaw_max]`.
    pub jaw: f32,
    /// Whether anyone is in front of the camera, `[0, 1]`.
    pub presence: f32,
}

impl ControlValues {
    /// The neutral zero vector.
    pub const NEUTRAL: ControlValues = ControlValues {
        tilt: 0.0,
        lift: 0.0,
        pinch: 0.0,
        jaw: 0.0,
        presence: 0.0,
    };

    /// Channel names in display order.
    pub const CHANNELS: [&'static str; 5] = ["tilt", "lift", "pinch", "jaw", "presence"];

    /// Clamp every channel to its documented range.
    pub fn clamped(self, jaw_max: f32) -> Self {
        Self {
            tilt: self.tilt.clamp(TILT_RANGE.0, TILT_RANGE.1),
            lift: self.lift.clamp(0.0, 1.0),
            pinch: self.pinch.clamp(0.0, 1.0),
            jaw: self.jaw.clamp(0.0, jaw_max),
            presence: self.presence.clamp(0.0, 1.0),
        }
    }

    /// Channel values normalized to `[0, 1]` for bar-chart display.
    pub fn normalized(&self, jaw_max: f32) -> [f32; 5] {
        let jaw = if jaw_max > 0.0 { self.jaw / jaw_max } else { 0.0 };
        [
            (self.tilt - TILT_RANGE.0) / (TILT_RANGE.1 - TILT_RANGE.0),
            self.lift,
            self.pinch,
            jaw,
            self.presence,
        ]
    }

    /// Largest absolute channel difference to `other`.
    pub fn max_abs_diff(&self, other: &ControlValues) -> f32 {
        [
            self.tilt - other.tilt,
            self.lift - other.lift,
            self.pinch - other.pinch,
            self.jaw - other.jaw,
            self.presence - other.presence,
        ]
        .iter()
        .fold(0.0f32, |acc, d| acc.max(d.abs()))
    }
}

/// One camera frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbaImage,
    /// Capture time in milliseconds (monotonic, source-relative).
    pub timestamp_ms: u64,
}

impl Frame {
    pub fn new(image: RgbaImage, timestamp_ms: u64) -> Self {
        Self {
            image,
            timestamp_ms,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_distance() {
        let a = Landmark::new(0.0, 0.0);
        let b = Landmark::new(0.3, 0.4);
        assert!((a.distance(&b) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_point_set_get_skips_missing_and_nan() {
        let set = SubjectPointSet::new(vec![
            Landmark::new(0.1, 0.2),
            Landmark::new(f32::NAN, 0.5),
        ]);
        assert_eq!(set.get(0), Some(Landmark::new(0.1, 0.2)));
        assert_eq!(set.get(1), None);
        assert_eq!(set.get(5), None);
    }

    #[test]
    fn test_controls_clamped() {
        let c = ControlValues {
            tilt: 0.9,
            lift: -0.2,
            pinch: 1.5,
            jaw: 0.4,
            presence: 2.0,
        }
        .clamped(0.1);
        assert_eq!(c.tilt, 0.5);
        assert_eq!(c.lift, 0.0);
        assert_eq!(c.pinch, 1.0);
        assert_eq!(c.jaw, 0.1);
        assert_eq!(c.presence, 1.0);
    }

    #[test]
    fn test_controls_normalized() {
        let n = ControlValues::NEUTRAL.normalized(0.1);
        assert_eq!(n, [0.5, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_detections_for_kind() {
        let mut d = Detections::default();
        assert!(d.is_empty());
        d.set(SubjectKind::Hand, vec![SubjectPointSet::default()]);
        assert_eq!(d.for_kind(SubjectKind::Hand).len(), 1);
        assert!(d.for_kind(SubjectKind::Face).is_empty());
        assert!(!d.is_empty());
    }
}

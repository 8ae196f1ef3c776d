//! Mock construction helpers

use kinetic_stage::tracking::{HandPattern, MotionPattern, SyntheticLandmarkSource};
use kinetic_stage::{ControlValues, Frame, StageRenderer};
use image::RgbaImage;
use std::sync::{Arc, Mutex};

/// What a [`RecordingStage`] saw on one render call.
#[derive(Debug, Clone, PartialEq)]
pub struct StageCall {
    /// Dimensions of the frame, if one was passed
    pub frame: Option<(u32, u32)>,
    pub controls: ControlValues,
}

/// Stage renderer that only records its inputs.
///
/// The log is shared so a test can keep reading it after the stage has been
/// boxed into a scheduler.
#[derive(Clone, Default)]
pub struct RecordingStage {
    pub calls: Arc<Mutex<Vec<StageCall>>>,
}

impl RecordingStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Vec<StageCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl StageRenderer for RecordingStage {
    fn render(&mut self, frame: Option<&Frame>, controls: &ControlValues) {
        self.calls.lock().unwrap().push(StageCall {
            frame: frame.map(Frame::dimensions),
            controls: *controls,
        });
    }

    fn last_output(&self) -> Option<&RgbaImage> {
        None
    }
}

/// Detector with a still face at `(x, y)` and no hand.
pub fn still_face(x: f32, y: f32) -> SyntheticLandmarkSource {
    SyntheticLandmarkSource::new().with_face(MotionPattern::Still { x, y })
}

/// Detector whose face follows `nose_x` per call (last entry repeats), no hand.
pub fn scripted_face_x(nose_x: &[Option<f32>]) -> SyntheticLandmarkSource {
    SyntheticLandmarkSource::new().with_face(MotionPattern::Script(
        nose_x.iter().map(|x| x.map(|x| (x, 0.5))).collect(),
    ))
}

/// Detector with a scripted hand and no face.
pub fn scripted_hand(steps: Vec<Option<((f32, f32), f32)>>) -> SyntheticLandmarkSource {
    SyntheticLandmarkSource::new().with_hand(HandPattern::Script(steps))
}

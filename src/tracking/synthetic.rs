//! Synthetic camera and landmark sources
//!
//! These stand in for real hardware in the demo binary and in tests. They
//! are fully deterministic: every value is a function of the frame
//! timestamp or the call count, so repeated runs produce identical
//! control sequences.
//!
//! # Motion Patterns
//!
//! - [`MotionPattern::Absent`] - Nobody in frame
//! - [`MotionPattern::Still`] - Fixed position
//! - [`MotionPattern::Sway`] - Horizontal sinusoidal sway
//! - [`MotionPattern::Script`] - Explicit per-call sequence (last entry repeats)
//!
//! # Example
//!
//! ```ignore
//! let detector = SyntheticLandmarkSource::new()
//!     .with_face(MotionPattern::Sway { center: (0.5, 0.45), amplitude: 0.15, period_ms: 4000 })
//!     .with_hand(HandPattern::Pinching { wrist: (0.6, 0.4), period_ms: 1500 });
//! ```

use crate::error::{AcquisitionError, Result, StageError};
use crate::tracking::landmarks::{self, FACE_LANDMARK_COUNT, HAND_LANDMARK_COUNT};
use crate::tracking::{FrameSource, LandmarkSource};
use crate::types::{Frame, Landmark, SubjectKind, SubjectPointSet};
use image::{Rgba, RgbaImage};
use std::f32::consts::TAU;

/// Position pattern for a synthetic face.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionPattern {
    /// Nobody in frame
    Absent,
    /// Fixed nose position
    Still { x: f32, y: f32 },
    /// Horizontal sway around a center point
    Sway {
        center: (f32, f32),
        amplitude: f32,
        period_ms: u64,
    },
    /// One entry per detect call; `None` means no face that call
    Script(Vec<Option<(f32, f32)>>),
}

impl MotionPattern {
    fn position(&self, timestamp_ms: u64, call: usize) -> Option<(f32, f32)> {
        match self {
            MotionPattern::Absent => None,
            MotionPattern::Still { x, y } => Some((*x, *y)),
            MotionPattern::Sway {
                center,
                amplitude,
                period_ms,
            } => {
                let phase = phase(timestamp_ms, *period_ms);
                Some((center.0 + amplitude * (phase * TAU).sin(), center.1))
            }
            MotionPattern::Script(steps) => script_step(steps, call),
        }
    }
}

/// Pattern for a synthetic hand.
#[derive(Debug, Clone, PartialEq)]
pub enum HandPattern {
    /// No hand in frame
    Absent,
    /// Fixed wrist position and thumb/index distance
    Fixed { wrist: (f32, f32), pinch_distance: f32 },
    /// Thumb and index open and close periodically
    Pinching { wrist: (f32, f32), period_ms: u64 },
    /// One entry per detect call: `(wrist, pinch_distance)`
    Script(Vec<Option<((f32, f32), f32)>>),
}

impl HandPattern {
    fn pose(&self, timestamp_ms: u64, call: usize) -> Option<((f32, f32), f32)> {
        match self {
            HandPattern::Absent => None,
            HandPattern::Fixed {
                wrist,
                pinch_distance,
            } => Some((*wrist, *pinch_distance)),
            HandPattern::Pinching { wrist, period_ms } => {
                let phase = phase(timestamp_ms, *period_ms);
                let open = 0.5 + 0.5 * (phase * TAU).cos();
                Some((*wrist, 0.01 + 0.19 * open))
            }
            HandPattern::Script(steps) => script_step(steps, call),
        }
    }
}

fn phase(timestamp_ms: u64, period_ms: u64) -> f32 {
    if period_ms == 0 {
        return 0.0;
    }
    (timestamp_ms % period_ms) as f32 / period_ms as f32
}

fn script_step<T: Clone>(steps: &[Option<T>], call: usize) -> Option<T> {
    steps
        .get(call)
        .or_else(|| steps.last())
        .cloned()
        .flatten()
}

/// Build a full face point set around a nose position.
pub fn synthetic_face(nose: (f32, f32), mouth_open: f32) -> SubjectPointSet {
    let (x, y) = nose;
    let mut points = vec![Landmark::new(x, y); FACE_LANDMARK_COUNT];
    points[landmarks::FACE_NOSE_BOTTOM] = Landmark::new(x, y + 0.02);
    points[landmarks::FACE_UPPER_LIP_CENTER] = Landmark::new(x, y + 0.045);
    points[landmarks::FACE_UPPER_LIP_INNER] = Landmark::new(x, y + 0.05);
    points[landmarks::FACE_LOWER_LIP_INNER] = Landmark::new(x, y + 0.05 + mouth_open);
    points[landmarks::FACE_CHIN] = Landmark::new(x, y + 0.14 + mouth_open);
    points[landmarks::FACE_FOREHEAD] = Landmark::new(x, y - 0.16);
    points[landmarks::FACE_LEFT_CHEEK] = Landmark::new(x - 0.1, y);
    points[landmarks::FACE_RIGHT_CHEEK] = Landmark::new(x + 0.1, y);
    SubjectPointSet::new(points)
}

/// Build a full hand point set from a wrist position and thumb/index gap.
pub fn synthetic_hand(wrist: (f32, f32), pinch_distance: f32) -> SubjectPointSet {
    let (wx, wy) = wrist;
    let mut points = vec![Landmark::new(wx, wy); HAND_LANDMARK_COUNT];
    // Finger bases fan out above the wrist; joints step towards the tip.
    for finger in 0..5usize {
        let base = 1 + finger * 4;
        let spread = (finger as f32 - 2.0) * 0.03;
        for joint in 0..4usize {
            let t = (joint + 1) as f32 / 4.0;
            points[base + joint] = Landmark::new(wx + spread * t, wy - 0.16 * t);
        }
    }
    let tip_y = wy - 0.16;
    points[landmarks::THUMB_TIP] = Landmark::new(wx - pinch_distance / 2.0, tip_y);
    points[landmarks::INDEX_TIP] = Landmark::new(wx + pinch_distance / 2.0, tip_y);
    SubjectPointSet::new(points)
}

/// Deterministic landmark source driven by motion patterns.
#[derive(Debug, Clone)]
pub struct SyntheticLandmarkSource {
    face: MotionPattern,
    mouth_open: f32,
    hand: HandPattern,
    load_error: Option<String>,
    /// Fail every n-th detect call (transient errors)
    fail_every: Option<usize>,
    loaded: bool,
    calls: usize,
    face_calls: usize,
    hand_calls: usize,
    timestamps: Vec<u64>,
}

impl Default for SyntheticLandmarkSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticLandmarkSource {
    pub fn new() -> Self {
        Self {
            face: MotionPattern::Absent,
            mouth_open: 0.0,
            hand: HandPattern::Absent,
            load_error: None,
            fail_every: None,
            loaded: false,
            calls: 0,
            face_calls: 0,
            hand_calls: 0,
            timestamps: Vec::new(),
        }
    }

    pub fn with_face(mut self, pattern: MotionPattern) -> Self {
        self.face = pattern;
        self
    }

    pub fn with_mouth_open(mut self, gap: f32) -> Self {
        self.mouth_open = gap;
        self
    }

    pub fn with_hand(mut self, pattern: HandPattern) -> Self {
        self.hand = pattern;
        self
    }

    /// Make `load` fail with the given reason.
    pub fn with_load_error(mut self, reason: impl Into<String>) -> Self {
        self.load_error = Some(reason.into());
        self
    }

    /// Make every n-th detect call fail.
    pub fn with_transient_failures(mut self, every: usize) -> Self {
        self.fail_every = Some(every.max(1));
        self
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Total detect calls so far.
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Timestamps passed to detect, in call order.
    pub fn timestamps(&self) -> &[u64] {
        &self.timestamps
    }
}

impl LandmarkSource for SyntheticLandmarkSource {
    fn load(&mut self) -> std::result::Result<(), AcquisitionError> {
        if let Some(reason) = &self.load_error {
            return Err(AcquisitionError::ModelUnavailable(reason.clone()));
        }
        self.loaded = true;
        Ok(())
    }

    fn detect(
        &mut self,
        _frame: &Frame,
        timestamp_ms: u64,
        kind: SubjectKind,
    ) -> Result<Vec<SubjectPointSet>> {
        if !self.loaded {
            return Err(StageError::Detection("model not loaded".to_string()));
        }
        self.calls += 1;
        self.timestamps.push(timestamp_ms);
        if let Some(every) = self.fail_every {
            if self.calls % every == 0 {
                return Err(StageError::Detection(format!(
                    "simulated {} detector hiccup",
                    kind
                )));
            }
        }

        let sets = match kind {
            SubjectKind::Face => {
                let call = self.face_calls;
                self.face_calls += 1;
                self.face
                    .position(timestamp_ms, call)
                    .map(|nose| synthetic_face(nose, self.mouth_open))
            }
            SubjectKind::Hand => {
                let call = self.hand_calls;
                self.hand_calls += 1;
                self.hand
                    .pose(timestamp_ms, call)
                    .map(|(wrist, gap)| synthetic_hand(wrist, gap))
            }
        };
        Ok(sets.into_iter().collect())
    }

    fn unload(&mut self) {
        self.loaded = false;
    }
}

/// Camera stand-in producing a moving gradient.
#[derive(Debug, Clone)]
pub struct SyntheticFrameSource {
    width: u32,
    height: u32,
    frame_interval_ms: u64,
    /// Calls that return no frame after opening
    warmup_frames: u64,
    open_error: Option<String>,
    /// Report the camera lost after this many frames
    lose_after: Option<u64>,
    open: bool,
    polls: u64,
    frames: u64,
}

impl SyntheticFrameSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame_interval_ms: 16,
            warmup_frames: 0,
            open_error: None,
            lose_after: None,
            open: false,
            polls: 0,
            frames: 0,
        }
    }

    pub fn with_frame_interval(mut self, interval_ms: u64) -> Self {
        self.frame_interval_ms = interval_ms;
        self
    }

    pub fn with_warmup(mut self, frames: u64) -> Self {
        self.warmup_frames = frames;
        self
    }

    pub fn with_open_error(mut self, reason: impl Into<String>) -> Self {
        self.open_error = Some(reason.into());
        self
    }

    pub fn with_loss_after(mut self, frames: u64) -> Self {
        self.lose_after = Some(frames);
        self
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Frames delivered since the last open.
    pub fn frames_delivered(&self) -> u64 {
        self.frames
    }

    fn render(&self, index: u64) -> RgbaImage {
        let shift = (index * 3 % 256) as u32;
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let r = ((x * 255 / self.width.max(1)) + shift) % 256;
            let g = (y * 255 / self.height.max(1)) % 256;
            Rgba([r as u8, g as u8, 96, 255])
        })
    }
}

impl FrameSource for SyntheticFrameSource {
    fn open(&mut self) -> std::result::Result<(u32, u32), AcquisitionError> {
        if let Some(reason) = &self.open_error {
            return Err(AcquisitionError::CameraUnavailable(reason.clone()));
        }
        self.open = true;
        self.polls = 0;
        self.frames = 0;
        Ok((self.width, self.height))
    }

    fn latest_frame(&mut self) -> std::result::Result<Option<Frame>, AcquisitionError> {
        if !self.open {
            return Ok(None);
        }
        self.polls += 1;
        if self.polls <= self.warmup_frames {
            return Ok(None);
        }
        if let Some(limit) = self.lose_after {
            if self.frames >= limit {
                self.open = false;
                return Err(AcquisitionError::CameraLost(
                    "synthetic device unplugged".to_string(),
                ));
            }
        }
        let index = self.frames;
        self.frames += 1;
        Ok(Some(Frame::new(
            self.render(index),
            index * self.frame_interval_ms,
        )))
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        self.open.then_some((self.width, self.height))
    }

    fn close(&mut self) {
        self.open = false;
    }
}

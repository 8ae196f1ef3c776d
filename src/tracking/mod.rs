//! Capture capabilities consumed by the frame scheduler
//!
//! Two external collaborators feed the runtime:
//!
//! - [`FrameSource`] - the camera. It exposes the newest frame and signals
//!   "not yet available" instead of blocking.
//! - [`LandmarkSource`] - the landmark detector. Given a frame, a
//!   timestamp and a subject kind it returns zero or more point sets.
//!
//! Both are singly owned by the runtime context for the duration of a live
//! session. Implementations for real hardware live outside this crate; the
//! [`synthetic`] module provides synthetic ones for demos and tests.
//!
//! # Example
//!
//! ```ignore
//! fn detect_all(source: &mut dyn LandmarkSource, frame: &Frame, ts: u64) -> Detections {
//!     let mut detections = Detections::default();
//!     for &kind in SubjectKind::all() {
//!         detections.set(kind, source.detect(frame, ts, kind).unwrap_or_default());
//!     }
//!     detections
//! }
//! ```

pub mod landmarks;
pub mod synthetic;

pub use synthetic::{HandPattern, SyntheticLandmarkSource, MotionPattern, SyntheticFrameSource};

use crate::error::{AcquisitionError, Result};
use crate::types::{Frame, SubjectKind, SubjectPointSet};

/// Camera capability.
#[cfg_attr(test, mockall::automock)]
pub trait FrameSource {
    /// Acquire the device. Returns the pixel dimensions on success.
    fn open(&mut self) -> std::result::Result<(u32, u32), AcquisitionError>;

    /// Newest frame, `Ok(None)` if none is available yet.
    ///
    /// Must never block waiting for the device. An `Err` means the device
    /// is gone and the live session has to end.
    fn latest_frame(&mut self) -> std::result::Result<Option<Frame>, AcquisitionError>;

    /// Pixel dimensions of the stream, if open.
    fn dimensions(&self) -> Option<(u32, u32)>;

    /// Release the device. Safe to call when already closed.
    fn close(&mut self);
}

/// Landmark detector capability.
#[cfg_attr(test, mockall::automock)]
pub trait LandmarkSource {
    /// Load the model(s). Called once per live session start.
    fn load(&mut self) -> std::result::Result<(), AcquisitionError>;

    /// Detect subjects of `kind` in `frame`.
    ///
    /// Called at most once per subject kind per tick, with a timestamp that
    /// never decreases. An empty list means nobody is tracked, which is a
    /// normal value. An `Err` is a transient failure for this call only.
    fn detect(
        &mut self,
        frame: &Frame,
        timestamp_ms: u64,
        kind: SubjectKind,
    ) -> Result<Vec<SubjectPointSet>>;

    /// Release model resources.
    fn unload(&mut self) {}
}

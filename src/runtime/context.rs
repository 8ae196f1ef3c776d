//! Runtime context: the camera, the detector and the live-session state
//!
//! One context owns everything that lives for a session. Nothing here is
//! global, so independent contexts can run side by side in tests.
//!
//! Lifecycle: `create → start → (tick)* → stop → dispose`.

use crate::error::AcquisitionError;
use crate::runtime::state::{SchedulerState, StatusReport};
use crate::signal::ControlMemory;
use crate::tracking::{FrameSource, LandmarkSource};

pub struct RuntimeContext {
    camera: Box<dyn FrameSource>,
    detector: Box<dyn LandmarkSource>,
    state: SchedulerState,
    status: StatusReport,
    controls: ControlMemory,
    frame_size: Option<(u32, u32)>,
    /// Held resources; release touches only these
    camera_open: bool,
    detector_loaded: bool,
    last_timestamp_ms: Option<u64>,
    ticks: u64,
}

impl RuntimeContext {
    pub fn create(camera: Box<dyn FrameSource>, detector: Box<dyn LandmarkSource>) -> Self {
        Self {
            camera,
            detector,
            state: SchedulerState::Idle,
            status: StatusReport::new(SchedulerState::Idle, None),
            controls: ControlMemory::new(),
            frame_size: None,
            camera_open: false,
            detector_loaded: false,
            last_timestamp_ms: None,
            ticks: 0,
        }
    }

    fn transition(&mut self, next: SchedulerState, message: Option<String>) -> bool {
        if !self.state.can_transition_to(next) {
            tracing::debug!("Ignoring transition {} -> {}", self.state, next);
            return false;
        }
        tracing::info!("Scheduler {} -> {}", self.state, next);
        self.state = next;
        self.status = StatusReport::new(next, message);
        true
    }

    /// Load the detector and open the camera.
    ///
    /// Allowed from `Idle` and, as a retry, from `Error`. On failure every
    /// acquired resource is released again and the context is left in
    /// `Error`.
    pub fn start(&mut self) -> Result<(), AcquisitionError> {
        if self.state.is_live() {
            return Ok(());
        }
        if !self.transition(SchedulerState::Loading, None) {
            return Err(AcquisitionError::InvalidState(self.state));
        }

        if let Err(e) = self.detector.load() {
            tracing::warn!("Detector unavailable: {}", e);
            self.transition(SchedulerState::Error, Some(e.to_string()));
            return Err(e);
        }
        self.detector_loaded = true;

        match self.camera.open() {
            Ok(size) => {
                self.camera_open = true;
                self.frame_size = Some(size);
            }
            Err(e) => {
                tracing::warn!("Camera unavailable: {}", e);
                self.release();
                self.transition(SchedulerState::Error, Some(e.to_string()));
                return Err(e);
            }
        }

        self.controls.reset();
        self.last_timestamp_ms = None;
        self.ticks = 0;
        self.transition(SchedulerState::Live, None);
        Ok(())
    }

    /// End the session and release the camera. No-op when already idle.
    pub fn stop(&mut self) {
        match self.state {
            SchedulerState::Live | SchedulerState::Error => {
                self.release();
                self.controls.reset();
                self.transition(SchedulerState::Idle, None);
            }
            _ => {}
        }
    }

    /// Live session failure: release the camera and park in `Error`.
    pub fn fail(&mut self, error: &AcquisitionError) {
        if self.state.is_live() {
            tracing::warn!("Live session failed: {}", error);
            self.release();
            self.transition(SchedulerState::Error, Some(error.to_string()));
        }
    }

    pub fn dispose(&mut self) {
        self.stop();
        self.transition(SchedulerState::Disposed, None);
    }

    fn release(&mut self) {
        if std::mem::take(&mut self.camera_open) {
            self.camera.close();
        }
        if std::mem::take(&mut self.detector_loaded) {
            self.detector.unload();
        }
        self.frame_size = None;
    }

    /// Clamp a frame timestamp so the detector never sees time go backwards.
    pub fn next_timestamp(&mut self, frame_ts: u64) -> u64 {
        let ts = match self.last_timestamp_ms {
            Some(last) if frame_ts < last => {
                tracing::trace!("Frame timestamp {} behind {}, holding", frame_ts, last);
                last
            }
            _ => frame_ts,
        };
        self.last_timestamp_ms = Some(ts);
        ts
    }

    /// Bump and return the tick index.
    pub(crate) fn begin_tick(&mut self) -> u64 {
        let tick = self.ticks;
        self.ticks += 1;
        self.controls.begin_tick();
        tick
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_live(&self) -> bool {
        self.state.is_live()
    }

    pub fn status(&self) -> &StatusReport {
        &self.status
    }

    pub fn frame_size(&self) -> Option<(u32, u32)> {
        self.frame_size
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn controls(&self) -> &ControlMemory {
        &self.controls
    }

    pub(crate) fn camera_mut(&mut self) -> &mut dyn FrameSource {
        self.camera.as_mut()
    }

    /// Split borrow for a tick: the detector and the control memory at once.
    pub(crate) fn detector_and_controls(
        &mut self,
    ) -> (&mut dyn LandmarkSource, &mut ControlMemory) {
        (self.detector.as_mut(), &mut self.controls)
    }
}

impl Drop for RuntimeContext {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::{MockFrameSource, MockLandmarkSource, SyntheticLandmarkSource};

    fn open_camera() -> MockFrameSource {
        let mut camera = MockFrameSource::new();
        camera.expect_open().returning(|| Ok((64, 48)));
        camera.expect_close().return_const(());
        camera
    }

    #[test]
    fn test_start_stop() {
        let mut ctx =
            RuntimeContext::create(Box::new(open_camera()), Box::new(SyntheticLandmarkSource::new()));
        assert_eq!(ctx.state(), SchedulerState::Idle);

        ctx.start().unwrap();
        assert_eq!(ctx.state(), SchedulerState::Live);
        assert_eq!(ctx.frame_size(), Some((64, 48)));

        ctx.stop();
        assert_eq!(ctx.state(), SchedulerState::Idle);
        assert_eq!(ctx.frame_size(), None);

        ctx.dispose();
        assert_eq!(ctx.state(), SchedulerState::Disposed);
        assert_eq!(
            ctx.start(),
            Err(AcquisitionError::InvalidState(SchedulerState::Disposed))
        );
        assert_eq!(ctx.state(), SchedulerState::Disposed);
    }

    #[test]
    fn test_model_failure_then_retry() {
        let mut detector = MockLandmarkSource::new();
        let mut attempts = 0;
        detector.expect_load().returning(move || {
            attempts += 1;
            if attempts == 1 {
                Err(AcquisitionError::ModelUnavailable("weights missing".into()))
            } else {
                Ok(())
            }
        });
        detector.expect_unload().return_const(());

        let mut ctx = RuntimeContext::create(Box::new(open_camera()), Box::new(detector));
        let err = ctx.start().unwrap_err();
        assert!(matches!(err, AcquisitionError::ModelUnavailable(_)));
        assert_eq!(ctx.state(), SchedulerState::Error);
        assert!(ctx.status().message.as_deref().unwrap().contains("weights missing"));

        ctx.start().unwrap();
        assert_eq!(ctx.state(), SchedulerState::Live);
    }

    #[test]
    fn test_camera_failure_unloads_detector() {
        let mut camera = MockFrameSource::new();
        camera
            .expect_open()
            .returning(|| Err(AcquisitionError::CameraUnavailable("permission denied".into())));
        let mut detector = MockLandmarkSource::new();
        detector.expect_load().returning(|| Ok(()));
        detector.expect_unload().times(1).return_const(());

        let mut ctx = RuntimeContext::create(Box::new(camera), Box::new(detector));
        assert!(ctx.start().is_err());
        assert_eq!(ctx.state(), SchedulerState::Error);
    }

    #[test]
    fn test_fail_releases_camera() {
        let mut camera = MockFrameSource::new();
        camera.expect_open().returning(|| Ok((8, 8)));
        camera.expect_close().times(1).return_const(());
        let mut ctx = RuntimeContext::create(Box::new(camera), Box::new(SyntheticLandmarkSource::new()));
        ctx.start().unwrap();

        ctx.fail(&AcquisitionError::CameraLost("unplugged".into()));
        assert_eq!(ctx.state(), SchedulerState::Error);
        // A second failure report is ignored
        ctx.fail(&AcquisitionError::CameraLost("again".into()));
        assert_eq!(ctx.status().message.as_deref(), Some("Camera lost: unplugged"));
    }

    #[test]
    fn test_stop_after_failure_releases_once() {
        let mut camera = MockFrameSource::new();
        camera.expect_open().returning(|| Ok((8, 8)));
        camera.expect_close().times(1).return_const(());
        let mut detector = MockLandmarkSource::new();
        detector.expect_load().returning(|| Ok(()));
        detector.expect_unload().times(1).return_const(());

        let mut ctx = RuntimeContext::create(Box::new(camera), Box::new(detector));
        ctx.start().unwrap();
        ctx.fail(&AcquisitionError::CameraLost("unplugged".into()));
        ctx.stop();
        assert_eq!(ctx.state(), SchedulerState::Idle);
        ctx.dispose();
    }

    #[test]
    fn test_stop_after_model_failure_touches_nothing() {
        let mut camera = MockFrameSource::new();
        camera.expect_open().times(0);
        camera.expect_close().times(0);
        let mut detector = MockLandmarkSource::new();
        detector
            .expect_load()
            .returning(|| Err(AcquisitionError::ModelUnavailable("weights missing".into())));
        detector.expect_unload().times(0);

        let mut ctx = RuntimeContext::create(Box::new(camera), Box::new(detector));
        assert!(ctx.start().is_err());
        ctx.stop();
        assert_eq!(ctx.state(), SchedulerState::Idle);
    }

    #[test]
    fn test_timestamps_never_decrease() {
        let mut ctx =
            RuntimeContext::create(Box::new(open_camera()), Box::new(SyntheticLandmarkSource::new()));
        assert_eq!(ctx.next_timestamp(100), 100);
        assert_eq!(ctx.next_timestamp(90), 100);
        assert_eq!(ctx.next_timestamp(100), 100);
        assert_eq!(ctx.next_timestamp(133), 133);
    }
}

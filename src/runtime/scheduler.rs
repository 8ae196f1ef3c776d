//! Frame scheduler: one synchronous pass over the graph per display refresh.
//!
//! A tick, in order:
//!
//! 1. Take the newest frame without blocking. No frame yet means the tick is
//!    skipped; a lost camera ends the session.
//! 2. Run the detector once per subject kind that has a tracker node, all
//!    with the same (monotonic) timestamp.
//! 3. Walk the graph in topological order.
//! 4. Hand the stage sink's inputs to the [`StageRenderer`].
//! 5. Render previews for observed nodes only.
//!
//! The scheduler keeps at most one tick request outstanding. A callback that
//! arrives after the session left `Live` does nothing.

use crate::config::StageConfig;
use crate::error::{AcquisitionError, Result};
use crate::graph::nodes::stage_output::{CONTROLS_INPUT, FRAME_INPUT};
use crate::graph::{DataflowGraph, GraphError, NodeId, NodeType, PortValue, TickEnv};
use crate::preview::{FrameState, PreviewImage, PreviewMaterializer};
use crate::runtime::bridge::{RuntimeCommand, RuntimeLink, RuntimeMessage};
use crate::runtime::context::RuntimeContext;
use crate::runtime::state::{SchedulerState, StatusReport};
use crate::runtime::stats::TickStats;
use crate::runtime::ticker::{FrameClock, ManualTicker, TickRequester};
use crate::signal::{ControlSmoother, MetricExtractor};
use crate::stage::StageRenderer;
use crate::types::{ControlValues, Detections};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Summary of a completed tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    /// Timestamp handed to the detector
    pub timestamp_ms: u64,
    /// Controls handed to the stage
    pub controls: ControlValues,
    pub faces: usize,
    pub hands: usize,
    /// Stage sink used, if the graph has one
    pub sink: Option<NodeId>,
    pub previews: usize,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Session not live; the callback was a no-op.
    Inactive,
    /// No frame available yet.
    Skipped,
    /// The camera failed and the session moved to `Error`.
    Failed(AcquisitionError),
    Completed(TickReport),
}

pub struct FrameScheduler<T: TickRequester> {
    context: RuntimeContext,
    graph: DataflowGraph,
    extractor: MetricExtractor,
    smoother: ControlSmoother,
    materializer: PreviewMaterializer,
    stage: Box<dyn StageRenderer>,
    ticker: T,
    tick_pending: bool,
    stats: TickStats,
    previews: Vec<PreviewImage>,
    link: Option<RuntimeLink>,
}

impl<T: TickRequester> FrameScheduler<T> {
    pub fn new(
        config: &StageConfig,
        context: RuntimeContext,
        graph: DataflowGraph,
        stage: Box<dyn StageRenderer>,
        ticker: T,
    ) -> Self {
        let extractor = MetricExtractor::new(config.calibration.clone());
        let smoother = ControlSmoother::new(config.smoothing.clone(), extractor.jaw_max());
        Self {
            context,
            graph,
            extractor,
            smoother,
            materializer: PreviewMaterializer::new(&config.preview),
            stage,
            ticker,
            tick_pending: false,
            stats: TickStats::default(),
            previews: Vec::new(),
            link: None,
        }
    }

    /// Attach the runtime side of a [`RuntimeBridge`](crate::runtime::RuntimeBridge).
    pub fn with_link(mut self, link: RuntimeLink) -> Self {
        self.link = Some(link);
        self
    }

    // ── Lifecycle ──

    /// Acquire the detector and camera and schedule the first tick.
    pub fn start(&mut self) -> Result<()> {
        if self.context.is_live() {
            return Ok(());
        }
        let result = self.context.start();
        self.publish_state();
        result?;

        self.graph.start_all();
        self.stats.reset();
        self.previews.clear();
        self.request_next_tick();
        Ok(())
    }

    /// Leave `Live` (or `Error`) and release the camera. Ticks already
    /// requested become no-ops.
    pub fn stop(&mut self) {
        let before = self.context.state();
        self.context.stop();
        if self.context.state() != before {
            self.graph.stop_all();
            self.previews.clear();
            self.publish_state();
        }
    }

    pub fn dispose(&mut self) {
        self.stop();
        self.context.dispose();
        self.publish_state();
    }

    fn request_next_tick(&mut self) {
        if !self.tick_pending {
            self.ticker.request_tick();
            self.tick_pending = true;
        }
    }

    // ── Ticking ──

    /// Entry point for the frame callback requested through the ticker.
    pub fn on_frame_callback(&mut self) -> TickOutcome {
        self.tick_pending = false;
        self.process_commands();

        if !self.context.is_live() {
            self.stats.record_inactive();
            tracing::trace!("Frame callback while {}, ignoring", self.context.state());
            return TickOutcome::Inactive;
        }

        let outcome = self.tick();
        if self.context.is_live() {
            self.request_next_tick();
        }
        outcome
    }

    fn tick(&mut self) -> TickOutcome {
        let started = Instant::now();

        let frame = match self.context.camera_mut().latest_frame() {
            Ok(Some(frame)) => Arc::new(frame),
            Ok(None) => {
                self.stats.record_skip();
                tracing::trace!("No frame available yet, skipping tick");
                return TickOutcome::Skipped;
            }
            Err(e) => {
                self.context.fail(&e);
                self.graph.stop_all();
                self.previews.clear();
                self.publish_state();
                return TickOutcome::Failed(e);
            }
        };

        let tick = self.context.begin_tick();
        let timestamp_ms = self.context.next_timestamp(frame.timestamp_ms);
        let kinds = self.graph.tracked_kinds();

        let (detector, controls) = self.context.detector_and_controls();
        let mut detections = Detections::default();
        for kind in kinds {
            match detector.detect(&frame, timestamp_ms, kind) {
                Ok(sets) => detections.set(kind, sets),
                Err(e) => {
                    self.stats.record_detector_failure();
                    tracing::warn!(
                        "{} detection failed at {} ms: {}",
                        kind.display_name(),
                        timestamp_ms,
                        e
                    );
                }
            }
        }

        self.graph.evaluate(TickEnv {
            frame: Some(Arc::clone(&frame)),
            detections: &detections,
            extractor: &self.extractor,
            smoother: &self.smoother,
            controls,
            tick,
            timestamp_ms,
        });

        // First stage sink in execution order; without one the stage still
        // gets the canonical controls
        let memory = self.context.controls().current();
        let sink = self.graph.nodes_of_type(NodeType::StageOutput).first().copied();
        let (sink_frame, sink_controls) = match sink.and_then(|id| self.graph.resolve_inputs(id)) {
            Some(inputs) => (
                inputs.get(FRAME_INPUT).and_then(PortValue::as_frame).cloned(),
                inputs
                    .get(CONTROLS_INPUT)
                    .and_then(PortValue::as_controls)
                    .copied()
                    .unwrap_or(memory),
            ),
            None => (None, memory),
        };
        self.stage.render(sink_frame.as_deref(), &sink_controls);

        self.previews = self.materializer.materialize_observed(
            &self.graph,
            &FrameState {
                frame: Some(&*frame),
                controls: memory,
                jaw_max: self.extractor.jaw_max(),
                stage_output: self.stage.last_output(),
            },
        );

        let duration = started.elapsed();
        self.stats.record_tick(duration, self.previews.len());
        tracing::trace!(
            "Tick {} at {} ms: {} face(s), {} hand(s), {} preview(s) in {:?}",
            tick,
            timestamp_ms,
            detections.faces.len(),
            detections.hands.len(),
            self.previews.len(),
            duration
        );

        TickOutcome::Completed(TickReport {
            tick,
            timestamp_ms,
            controls: sink_controls,
            faces: detections.faces.len(),
            hands: detections.hands.len(),
            sink,
            previews: self.previews.len(),
            duration,
        })
    }

    // ── Commands ──

    /// Drain and apply pending editing-surface commands.
    ///
    /// Called at the start of every frame callback; hosts that are idle
    /// (no ticks scheduled) call it directly.
    pub fn process_commands(&mut self) {
        let commands = match &self.link {
            Some(link) => link.pending_commands(),
            None => return,
        };
        for cmd in commands {
            self.handle_command(cmd);
        }
    }

    fn handle_command(&mut self, cmd: RuntimeCommand) {
        match cmd {
            RuntimeCommand::Start => {
                if let Err(e) = self.start() {
                    tracing::warn!("Start failed: {}", e);
                }
            }
            RuntimeCommand::Stop => self.stop(),
            RuntimeCommand::AddNode(node_type) => {
                let id = self.graph.add_node(node_type);
                self.publish(RuntimeMessage::NodeAdded { id, node_type });
            }
            RuntimeCommand::AddEdge {
                from,
                out_port,
                to,
                in_port,
            } => match self.graph.add_edge(from, out_port, to, in_port) {
                Ok(id) => self.publish(RuntimeMessage::EdgeAdded(id)),
                Err(e) => self.reject(e),
            },
            RuntimeCommand::RemoveNode(id) => match self.graph.remove_node(id) {
                Ok(()) => self.publish(RuntimeMessage::NodeRemoved(id)),
                Err(e) => self.reject(e),
            },
            RuntimeCommand::RemoveEdge(id) => match self.graph.remove_edge(id) {
                Ok(()) => self.publish(RuntimeMessage::EdgeRemoved(id)),
                Err(e) => self.reject(e),
            },
            RuntimeCommand::SetObserved { node, observed } => {
                if let Err(e) = self.graph.set_observed(node, observed) {
                    self.reject(e);
                }
            }
            RuntimeCommand::Configure { node, key, value } => {
                match self.graph.configure(node, &key, &value) {
                    Ok(accepted) => self.publish(RuntimeMessage::Configured {
                        node,
                        key,
                        accepted,
                    }),
                    Err(e) => self.reject(e),
                }
            }
            RuntimeCommand::RequestTopology => {
                let snapshot = self.graph.snapshot();
                self.publish(RuntimeMessage::Topology(snapshot));
            }
            RuntimeCommand::RequestStats => {
                let stats = self.stats.clone();
                self.publish(RuntimeMessage::Stats(stats));
            }
        }
    }

    fn reject(&mut self, error: GraphError) {
        tracing::warn!("Graph edit rejected: {}", error);
        self.publish(RuntimeMessage::GraphError(error));
    }

    fn publish_state(&mut self) {
        let status = self.context.status().clone();
        self.publish(RuntimeMessage::StateChanged(status));
    }

    fn publish(&mut self, msg: RuntimeMessage) {
        let Some(link) = &self.link else {
            return;
        };
        let important = matches!(
            msg,
            RuntimeMessage::GraphError(_) | RuntimeMessage::StateChanged(_)
        );
        if !link.publish(msg) {
            self.stats.record_dropped_message();
            if important {
                tracing::warn!("Editing surface disconnected, status or edit error not delivered");
            } else {
                tracing::debug!("Runtime message dropped");
            }
        }
    }

    // ── Accessors ──

    pub fn state(&self) -> SchedulerState {
        self.context.state()
    }

    pub fn status(&self) -> &StatusReport {
        self.context.status()
    }

    /// Canonical control vector.
    pub fn controls(&self) -> ControlValues {
        self.context.controls().current()
    }

    pub fn context(&self) -> &RuntimeContext {
        &self.context
    }

    pub fn graph(&self) -> &DataflowGraph {
        &self.graph
    }

    /// Direct graph access for hosts without a bridge.
    pub fn graph_mut(&mut self) -> &mut DataflowGraph {
        &mut self.graph
    }

    pub fn extractor(&self) -> &MetricExtractor {
        &self.extractor
    }

    pub fn smoother(&self) -> &ControlSmoother {
        &self.smoother
    }

    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// Previews rendered by the last completed tick.
    pub fn previews(&self) -> &[PreviewImage] {
        &self.previews
    }

    pub fn stage(&self) -> &dyn StageRenderer {
        self.stage.as_ref()
    }

    pub fn is_tick_pending(&self) -> bool {
        self.tick_pending
    }

    pub fn ticker(&self) -> &T {
        &self.ticker
    }
}

impl FrameScheduler<ManualTicker> {
    /// Run the pending callback, if one was requested.
    pub fn pump(&mut self) -> Option<TickOutcome> {
        if self.ticker.take_pending() {
            Some(self.on_frame_callback())
        } else {
            None
        }
    }
}

impl FrameScheduler<FrameClock> {
    /// Wait for the next frame boundary and run the callback. `None` when no
    /// tick is scheduled.
    pub fn pump_paced(&mut self) -> Option<TickOutcome> {
        if self.ticker.wait() {
            Some(self.on_frame_callback())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StageRenderConfig;
    use crate::error::StageError;
    use crate::graph::build_default_graph;
    use crate::runtime::bridge::RuntimeBridge;
    use crate::stage::ReactiveStage;
    use crate::tracking::synthetic::synthetic_face;
    use crate::tracking::{MockFrameSource, MockLandmarkSource, SyntheticLandmarkSource};
    use crate::types::{Frame, SubjectKind};
    use image::RgbaImage;
    use std::sync::Mutex;

    fn frame(ts: u64) -> Frame {
        Frame::new(RgbaImage::new(32, 24), ts)
    }

    /// Camera yielding `None` for `warmup` calls, then frames at the given timestamps.
    fn camera(warmup: usize, timestamps: Vec<u64>) -> MockFrameSource {
        let mut camera = MockFrameSource::new();
        camera.expect_open().returning(|| Ok((32, 24)));
        camera.expect_close().return_const(());
        let mut calls = 0usize;
        camera.expect_latest_frame().returning(move || {
            calls += 1;
            if calls <= warmup {
                return Ok(None);
            }
            let i = (calls - warmup - 1).min(timestamps.len().saturating_sub(1));
            Ok(timestamps.get(i).map(|&ts| frame(ts)))
        });
        camera
    }

    fn scheduler(
        camera: MockFrameSource,
        detector: Box<dyn crate::tracking::LandmarkSource>,
    ) -> FrameScheduler<ManualTicker> {
        let config = StageConfig::default();
        let (graph, _) = build_default_graph().unwrap();
        let stage = ReactiveStage::new(StageRenderConfig::default(), config.calibration.jaw_max);
        FrameScheduler::new(
            &config,
            RuntimeContext::create(Box::new(camera), detector),
            graph,
            Box::new(stage),
            ManualTicker::new(),
        )
    }

    #[test]
    fn test_skip_until_first_frame() {
        let mut detector = MockLandmarkSource::new();
        detector.expect_load().returning(|| Ok(()));
        detector.expect_unload().return_const(());
        detector.expect_detect().times(2).returning(|_, _, _| Ok(Vec::new()));

        let mut s = scheduler(camera(2, vec![0]), Box::new(detector));
        s.start().unwrap();
        assert_eq!(s.pump(), Some(TickOutcome::Skipped));
        assert_eq!(s.pump(), Some(TickOutcome::Skipped));
        assert!(matches!(s.pump(), Some(TickOutcome::Completed(_))));
        assert_eq!(s.stats().skipped_ticks, 2);
        assert_eq!(s.stats().ticks, 1);
    }

    #[test]
    fn test_detector_once_per_kind_with_shared_monotonic_timestamp() {
        let calls: Arc<Mutex<Vec<(u64, SubjectKind)>>> = Arc::default();
        let seen = Arc::clone(&calls);
        let mut detector = MockLandmarkSource::new();
        detector.expect_load().returning(|| Ok(()));
        detector.expect_unload().return_const(());
        detector.expect_detect().returning(move |_, ts, kind| {
            seen.lock().unwrap().push((ts, kind));
            Ok(Vec::new())
        });

        // Second frame reports an earlier timestamp
        let mut s = scheduler(camera(0, vec![100, 80, 150]), Box::new(detector));
        s.start().unwrap();
        for _ in 0..3 {
            s.pump();
        }

        let calls = calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                (100, SubjectKind::Face),
                (100, SubjectKind::Hand),
                (100, SubjectKind::Face),
                (100, SubjectKind::Hand),
                (150, SubjectKind::Face),
                (150, SubjectKind::Hand),
            ]
        );
    }

    #[test]
    fn test_detector_skips_kinds_without_tracker() {
        let mut detector = MockLandmarkSource::new();
        detector.expect_load().returning(|| Ok(()));
        detector.expect_unload().return_const(());
        detector
            .expect_detect()
            .withf(|_, _, kind| *kind == SubjectKind::Face)
            .times(1)
            .returning(|_, _, _| Ok(Vec::new()));

        let mut s = scheduler(camera(0, vec![0]), Box::new(detector));
        let hand = s.graph_mut().nodes_of_type(NodeType::HandTracker)[0];
        s.graph_mut().remove_node(hand).unwrap();
        s.start().unwrap();
        assert!(matches!(s.pump(), Some(TickOutcome::Completed(r)) if r.hands == 0));
    }

    #[test]
    fn test_detector_failure_is_zero_subjects() {
        let mut detector = MockLandmarkSource::new();
        detector.expect_load().returning(|| Ok(()));
        detector.expect_unload().return_const(());
        detector
            .expect_detect()
            .returning(|_, _, kind| match kind {
                SubjectKind::Face => Ok(vec![synthetic_face((0.7, 0.5), 0.0)]),
                SubjectKind::Hand => Err(StageError::Detection("model hiccup".into())),
            });

        let mut s = scheduler(camera(0, vec![0]), Box::new(detector));
        s.start().unwrap();
        match s.pump() {
            Some(TickOutcome::Completed(report)) => {
                assert_eq!(report.faces, 1);
                assert_eq!(report.hands, 0);
                assert!(report.controls.tilt > 0.0);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(s.stats().detector_failures, 1);
        assert_eq!(s.state(), SchedulerState::Live);
    }

    #[test]
    fn test_camera_loss_moves_to_error() {
        let mut camera = MockFrameSource::new();
        camera.expect_open().returning(|| Ok((32, 24)));
        camera.expect_close().times(1).return_const(());
        camera
            .expect_latest_frame()
            .returning(|| Err(AcquisitionError::CameraLost("unplugged".into())));

        let mut s = scheduler(camera, Box::new(SyntheticLandmarkSource::new()));
        s.start().unwrap();
        assert!(matches!(
            s.pump(),
            Some(TickOutcome::Failed(AcquisitionError::CameraLost(_)))
        ));
        assert_eq!(s.state(), SchedulerState::Error);
        assert!(!s.is_tick_pending());
        assert_eq!(s.pump(), None);
        assert_eq!(s.on_frame_callback(), TickOutcome::Inactive);
    }

    #[test]
    fn test_start_failure_surfaces_status() {
        let mut detector = MockLandmarkSource::new();
        detector
            .expect_load()
            .returning(|| Err(AcquisitionError::ModelUnavailable("no weights".into())));

        let (bridge, link) = RuntimeBridge::new();
        let mut s = scheduler(camera(0, vec![0]), Box::new(detector)).with_link(link);
        assert!(s.start().is_err());
        assert_eq!(s.state(), SchedulerState::Error);
        assert_eq!(s.ticker().requests(), 0);

        let msgs = bridge.drain();
        assert!(msgs.iter().any(|m| matches!(
            m,
            RuntimeMessage::StateChanged(StatusReport { state: SchedulerState::Error, .. })
        )));
    }

    #[test]
    fn test_single_pending_request_and_stop_noop() {
        let mut s = scheduler(camera(0, vec![0]), Box::new(SyntheticLandmarkSource::new()));
        s.start().unwrap();
        s.start().unwrap();
        assert_eq!(s.ticker().requests(), 1);

        s.stop();
        assert_eq!(s.state(), SchedulerState::Idle);
        // The callback requested before stop still fires, and does nothing
        assert_eq!(s.pump(), Some(TickOutcome::Inactive));
        assert_eq!(s.pump(), None);
        assert_eq!(s.controls(), ControlValues::NEUTRAL);
    }

    #[test]
    fn test_commands_apply_at_tick_boundary() {
        let (bridge, link) = RuntimeBridge::new();
        let mut s = scheduler(camera(0, vec![0]), Box::new(SyntheticLandmarkSource::new()))
            .with_link(link);
        let stage_node = s.graph_mut().nodes_of_type(NodeType::StageOutput)[0];

        bridge.set_observed(stage_node, true);
        bridge.add_edge(NodeId(0), 0, stage_node, 0);
        bridge.start();
        assert!(!s.graph().is_observed(stage_node));

        s.process_commands();
        assert!(s.graph().is_observed(stage_node));
        assert_eq!(s.state(), SchedulerState::Live);
        assert!(bridge.drain().iter().any(|m| matches!(
            m,
            RuntimeMessage::GraphError(GraphError::PortOccupied { .. })
        )));

        assert!(matches!(s.pump(), Some(TickOutcome::Completed(r)) if r.previews == 1));
        assert_eq!(s.previews().len(), 1);

        bridge.request_stats();
        s.pump();
        assert!(bridge
            .drain()
            .iter()
            .any(|m| matches!(m, RuntimeMessage::Stats(stats) if stats.ticks == 1)));
    }
}

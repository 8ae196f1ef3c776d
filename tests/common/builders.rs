//! Test data builders for creating test objects

use kinetic_stage::config::StageConfig;
use kinetic_stage::graph::{build_default_graph, DataflowGraph, DefaultNodeIds};
use kinetic_stage::runtime::{FrameScheduler, ManualTicker, RuntimeContext, RuntimeLink};
use kinetic_stage::tracking::{SyntheticFrameSource, SyntheticLandmarkSource};
use kinetic_stage::{ReactiveStage, StageRenderer};

/// Builder for a manually ticked scheduler over the default graph.
pub struct SchedulerBuilder {
    config: StageConfig,
    camera: SyntheticFrameSource,
    detector: SyntheticLandmarkSource,
    stage: Option<Box<dyn StageRenderer>>,
    link: Option<RuntimeLink>,
}

impl SchedulerBuilder {
    pub fn new() -> Self {
        Self {
            config: StageConfig::default(),
            camera: SyntheticFrameSource::new(64, 36),
            detector: SyntheticLandmarkSource::new(),
            stage: None,
            link: None,
        }
    }

    pub fn config(mut self, config: StageConfig) -> Self {
        self.config = config;
        self
    }

    pub fn camera(mut self, camera: SyntheticFrameSource) -> Self {
        self.camera = camera;
        self
    }

    pub fn detector(mut self, detector: SyntheticLandmarkSource) -> Self {
        self.detector = detector;
        self
    }

    pub fn stage(mut self, stage: impl StageRenderer + 'static) -> Self {
        self.stage = Some(Box::new(stage));
        self
    }

    pub fn link(mut self, link: RuntimeLink) -> Self {
        self.link = Some(link);
        self
    }

    /// Build over a caller-supplied graph.
    pub fn build_with_graph(self, graph: DataflowGraph) -> FrameScheduler<ManualTicker> {
        let stage = self.stage.unwrap_or_else(|| {
            Box::new(ReactiveStage::new(
                self.config.stage,
                self.config.calibration.jaw_max,
            ))
        });
        let context = RuntimeContext::create(Box::new(self.camera), Box::new(self.detector));
        let scheduler =
            FrameScheduler::new(&self.config, context, graph, stage, ManualTicker::new());
        match self.link {
            Some(link) => scheduler.with_link(link),
            None => scheduler,
        }
    }

    pub fn build(self) -> (FrameScheduler<ManualTicker>, DefaultNodeIds) {
        let (graph, ids) = build_default_graph().unwrap();
        (self.build_with_graph(graph), ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinetic_stage::SchedulerState;

    #[test]
    fn test_scheduler_builder() {
        let (scheduler, ids) = SchedulerBuilder::new().build();
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert!(scheduler.graph().contains(ids.stage_output));
        assert_eq!(scheduler.graph().node_count(), 6);
    }
}

//! Node type enumeration for dynamic node creation.
//!
//! The editing surface spawns nodes by `NodeType`; `NodeFactory` turns a
//! type into a concrete node.

use crate::graph::node::{NodeKind, PreviewRecipe};
use serde::{Deserialize, Serialize};

/// Types of built-in nodes that can be instantiated at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// Publishes the current camera frame.
    CameraSource,
    /// Runs face metrics over the detector's face point sets.
    FaceTracker,
    /// Runs hand metrics over the detector's hand point sets.
    HandTracker,
    /// Combines face and hand metrics into smoothed controls.
    ControlComposer,
    /// Rescales or inverts control channels.
    ControlMapper,
    /// Terminal node handing frame and controls to the stage.
    StageOutput,
}

impl NodeType {
    pub fn display_name(&self) -> &'static str {
        match self {
            NodeType::CameraSource => "Camera Source",
            NodeType::FaceTracker => "Face Tracker",
            NodeType::HandTracker => "Hand Tracker",
            NodeType::ControlComposer => "Control Composer",
            NodeType::ControlMapper => "Control Mapper",
            NodeType::StageOutput => "Stage Output",
        }
    }

    pub fn all() -> &'static [NodeType] {
        &[
            NodeType::CameraSource,
            NodeType::FaceTracker,
            NodeType::HandTracker,
            NodeType::ControlComposer,
            NodeType::ControlMapper,
            NodeType::StageOutput,
        ]
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodeType::CameraSource => NodeKind::Source,
            NodeType::FaceTracker | NodeType::HandTracker => NodeKind::Extractor,
            NodeType::ControlComposer => NodeKind::Compositor,
            NodeType::ControlMapper => NodeKind::Mapper,
            NodeType::StageOutput => NodeKind::Sink,
        }
    }

    /// How this node's preview is drawn.
    pub fn preview_recipe(&self) -> PreviewRecipe {
        match self {
            NodeType::CameraSource => PreviewRecipe::RawFrame,
            NodeType::FaceTracker => PreviewRecipe::LandmarkOverlay,
            NodeType::HandTracker => PreviewRecipe::Skeleton,
            NodeType::ControlComposer | NodeType::ControlMapper => PreviewRecipe::ControlScope,
            NodeType::StageOutput => PreviewRecipe::SinkMirror,
        }
    }

    pub fn is_sink(&self) -> bool {
        self.kind() == NodeKind::Sink
    }

    pub fn description(&self) -> &'static str {
        match self {
            NodeType::CameraSource =>
                "Publishes the newest camera frame.\n\
                 No inputs; one frame output.",

            NodeType::FaceTracker =>
                "Reads the detector's face point sets.\n\
                 Outputs the point sets and face metrics\n\
                 (reference point, jaw opening).",

            NodeType::HandTracker =>
                "Reads the detector's hand point sets.\n\
                 Outputs the point sets and hand metrics\n\
                 (pinch closure, palm height).",

            NodeType::ControlComposer =>
                "Combines face and hand metrics into the\n\
                 smoothed control vector.",

            NodeType::ControlMapper =>
                "Applies per-channel gain to controls.\n\
                 Config: gain_<channel> (float), invert_tilt (bool).",

            NodeType::StageOutput =>
                "Hands the frame and controls to the\n\
                 stage renderer.",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_stage_output_is_sink() {
        let sinks: Vec<_> = NodeType::all().iter().filter(|t| t.is_sink()).collect();
        assert_eq!(sinks, vec![&NodeType::StageOutput]);
    }

    #[test]
    fn test_recipes() {
        assert_eq!(NodeType::HandTracker.preview_recipe(), PreviewRecipe::Skeleton);
        assert_eq!(
            NodeType::ControlMapper.preview_recipe(),
            PreviewRecipe::ControlScope
        );
    }
}

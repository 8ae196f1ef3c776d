//! Built-in graph node implementations.

pub mod camera_source;
pub mod control_composer;
pub mod control_mapper;
pub mod stage_output;
pub mod trackers;

pub use camera_source::CameraSourceNode;
pub use control_composer::ControlComposerNode;
pub use control_mapper::ControlMapperNode;
pub use stage_output::StageOutputNode;
pub use trackers::{FaceTrackerNode, HandTrackerNode};

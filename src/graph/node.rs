//! Node abstraction for the dataflow graph.
//!
//! Two-layer design:
//! - **`NodePlugin` trait** - for user-defined nodes inserted at runtime.
//! - **`BuiltinNode` enum** - for the built-in catalogue. Match arms are
//!   inlined, so the per-tick walk pays no dynamic dispatch for them.
//!
//! `AnyNode` wraps either variant so the graph can handle both uniformly.

use crate::graph::nodes::{
    CameraSourceNode, ControlComposerNode, ControlMapperNode, FaceTrackerNode, HandTrackerNode,
    StageOutputNode,
};
use crate::graph::node_type::NodeType;
use crate::graph::port::{self, PortDescriptor, PortType};
use crate::graph::value::{ConfigValue, PortValue};
use crate::signal::{ControlMemory, ControlSmoother, MetricExtractor};
use crate::types::{Detections, Frame};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Role of a node in the flow from camera to stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Source,
    Extractor,
    Compositor,
    Mapper,
    Sink,
}

/// How a node's diagnostic preview is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PreviewRecipe {
    /// The frame alone.
    RawFrame,
    /// Frame with key landmarks dotted on.
    LandmarkOverlay,
    /// Frame with the landmark connection skeleton.
    Skeleton,
    /// Bar chart of the control channels.
    ControlScope,
    /// The stage renderer's last output.
    SinkMirror,
}

impl PreviewRecipe {
    /// Fallback recipe for nodes that do not name one.
    pub fn for_kind(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Source => PreviewRecipe::RawFrame,
            NodeKind::Extractor => PreviewRecipe::LandmarkOverlay,
            NodeKind::Compositor | NodeKind::Mapper => PreviewRecipe::ControlScope,
            NodeKind::Sink => PreviewRecipe::SinkMirror,
        }
    }
}

/// Context passed to a node each tick.
pub struct NodeContext<'a> {
    /// Resolved inputs, one per input port (`Empty` when unconnected).
    pub inputs: &'a [PortValue],
    /// Output cache, one per output port, cleared before the call.
    pub outputs: &'a mut [PortValue],
    /// The frame acquired for this tick.
    pub frame: Option<&'a Arc<Frame>>,
    /// Detector output for this tick.
    pub detections: &'a Detections,
    pub extractor: &'a MetricExtractor,
    pub smoother: &'a ControlSmoother,
    /// The canonical control vector carried across ticks.
    pub controls: &'a mut ControlMemory,
    /// Monotonic tick counter.
    pub tick: u64,
    /// Timestamp handed to the detector this tick.
    pub timestamp_ms: u64,
}

impl NodeContext<'_> {
    /// Input at `port`, `Empty` if out of range.
    pub fn input(&self, port: usize) -> &PortValue {
        self.inputs.get(port).unwrap_or(&PortValue::Empty)
    }

    /// Write an output; out-of-range ports are ignored.
    pub fn set_output(&mut self, port: usize, value: PortValue) {
        if let Some(slot) = self.outputs.get_mut(port) {
            *slot = value;
        }
    }
}

/// Trait for pluggable/user-defined nodes.
pub trait NodePlugin {
    /// Human-readable name of this node.
    fn name(&self) -> &str;

    fn kind(&self) -> NodeKind;

    /// Port descriptors for this node.
    fn ports(&self) -> &[PortDescriptor];

    fn preview_recipe(&self) -> PreviewRecipe {
        PreviewRecipe::for_kind(self.kind())
    }

    /// Called when a live session starts.
    fn on_start(&mut self) {}

    /// Called every live tick, in topological order.
    fn on_tick(&mut self, ctx: &mut NodeContext);

    /// Called when a live session stops.
    fn on_stop(&mut self) {}

    /// Apply a config value. Returns `false` if the key is not recognized.
    fn on_config_change(&mut self, _key: &str, _value: &ConfigValue) -> bool {
        false
    }
}

/// Enum dispatch for built-in nodes.
pub enum BuiltinNode {
    CameraSource(CameraSourceNode),
    FaceTracker(FaceTrackerNode),
    HandTracker(HandTrackerNode),
    ControlComposer(ControlComposerNode),
    ControlMapper(ControlMapperNode),
    StageOutput(StageOutputNode),
}

impl BuiltinNode {
    pub fn node_type(&self) -> NodeType {
        match self {
            BuiltinNode::CameraSource(_) => NodeType::CameraSource,
            BuiltinNode::FaceTracker(_) => NodeType::FaceTracker,
            BuiltinNode::HandTracker(_) => NodeType::HandTracker,
            BuiltinNode::ControlComposer(_) => NodeType::ControlComposer,
            BuiltinNode::ControlMapper(_) => NodeType::ControlMapper,
            BuiltinNode::StageOutput(_) => NodeType::StageOutput,
        }
    }

    pub fn name(&self) -> &str {
        self.node_type().display_name()
    }

    pub fn ports(&self) -> &[PortDescriptor] {
        match self {
            BuiltinNode::CameraSource(n) => n.ports(),
            BuiltinNode::FaceTracker(n) => n.ports(),
            BuiltinNode::HandTracker(n) => n.ports(),
            BuiltinNode::ControlComposer(n) => n.ports(),
            BuiltinNode::ControlMapper(n) => n.ports(),
            BuiltinNode::StageOutput(n) => n.ports(),
        }
    }

    pub fn on_tick(&mut self, ctx: &mut NodeContext) {
        match self {
            BuiltinNode::CameraSource(n) => n.on_tick(ctx),
            BuiltinNode::FaceTracker(n) => n.on_tick(ctx),
            BuiltinNode::HandTracker(n) => n.on_tick(ctx),
            BuiltinNode::ControlComposer(n) => n.on_tick(ctx),
            BuiltinNode::ControlMapper(n) => n.on_tick(ctx),
            BuiltinNode::StageOutput(n) => n.on_tick(ctx),
        }
    }

    pub fn on_config_change(&mut self, key: &str, value: &ConfigValue) -> bool {
        match self {
            BuiltinNode::ControlMapper(n) => n.on_config_change(key, value),
            _ => false,
        }
    }
}

/// Wrapper that holds either a built-in node (enum dispatch) or a plugin (trait object).
pub enum AnyNode {
    Builtin(BuiltinNode),
    Plugin(Box<dyn NodePlugin>),
}

impl AnyNode {
    pub fn name(&self) -> &str {
        match self {
            AnyNode::Builtin(n) => n.name(),
            AnyNode::Plugin(n) => n.name(),
        }
    }

    pub fn node_type(&self) -> Option<NodeType> {
        match self {
            AnyNode::Builtin(n) => Some(n.node_type()),
            AnyNode::Plugin(_) => None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            AnyNode::Builtin(n) => n.node_type().kind(),
            AnyNode::Plugin(n) => n.kind(),
        }
    }

    pub fn ports(&self) -> &[PortDescriptor] {
        match self {
            AnyNode::Builtin(n) => n.ports(),
            AnyNode::Plugin(n) => n.ports(),
        }
    }

    pub fn preview_recipe(&self) -> PreviewRecipe {
        match self {
            AnyNode::Builtin(n) => n.node_type().preview_recipe(),
            AnyNode::Plugin(n) => n.preview_recipe(),
        }
    }

    pub fn on_start(&mut self) {
        if let AnyNode::Plugin(n) = self {
            n.on_start();
        }
    }

    pub fn on_tick(&mut self, ctx: &mut NodeContext) {
        match self {
            AnyNode::Builtin(n) => n.on_tick(ctx),
            AnyNode::Plugin(n) => n.on_tick(ctx),
        }
    }

    pub fn on_stop(&mut self) {
        if let AnyNode::Plugin(n) = self {
            n.on_stop();
        }
    }

    pub fn on_config_change(&mut self, key: &str, value: &ConfigValue) -> bool {
        match self {
            AnyNode::Builtin(n) => n.on_config_change(key, value),
            AnyNode::Plugin(n) => n.on_config_change(key, value),
        }
    }
}

/// A slot holding a node, its port layout and its last-output cache.
pub struct NodeSlot {
    pub node: AnyNode,
    pub input_types: Vec<PortType>,
    pub output_types: Vec<PortType>,
    /// Last computed value per output port.
    pub outputs: Vec<PortValue>,
    /// Whether this node has been removed (slot is a tombstone).
    pub deleted: bool,
}

impl NodeSlot {
    pub fn new(node: AnyNode) -> Self {
        let input_types = port::input_types(node.ports());
        let output_types = port::output_types(node.ports());
        let outputs = vec![PortValue::Empty; output_types.len()];
        Self {
            node,
            input_types,
            output_types,
            outputs,
            deleted: false,
        }
    }

    pub fn is_source(&self) -> bool {
        self.input_types.is_empty()
    }

    pub fn is_sink(&self) -> bool {
        self.output_types.is_empty()
    }

    pub fn clear_outputs(&mut self) {
        self.outputs.iter_mut().for_each(|o| *o = PortValue::Empty);
    }
}

//! CameraSourceNode - publishes the tick's frame.

use crate::graph::node::NodeContext;
use crate::graph::port::{PortDescriptor, PortType};
use crate::graph::value::PortValue;

static PORTS: &[PortDescriptor] = &[PortDescriptor::output("frame", PortType::Frame)];

/// Source node. The scheduler acquires the frame; this node only puts it
/// on the graph.
#[derive(Debug, Default)]
pub struct CameraSourceNode;

impl CameraSourceNode {
    pub fn new() -> Self {
        Self
    }

    pub fn ports(&self) -> &[PortDescriptor] {
        PORTS
    }

    pub fn on_tick(&mut self, ctx: &mut NodeContext) {
        if let Some(frame) = ctx.frame.cloned() {
            ctx.set_output(0, PortValue::Frame(frame));
        }
    }
}

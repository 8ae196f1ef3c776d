//! StageOutputNode - terminal node feeding the stage renderer.
//!
//! The node computes nothing. After the graph walk the scheduler resolves
//! this node's inputs and hands them to the `StageRenderer`.

use crate::graph::node::NodeContext;
use crate::graph::port::{PortDescriptor, PortType};

/// Input port carrying the frame.
pub const FRAME_INPUT: usize = 0;
/// Input port carrying the controls.
pub const CONTROLS_INPUT: usize = 1;

static PORTS: &[PortDescriptor] = &[
    PortDescriptor::input("frame", PortType::Frame),
    PortDescriptor::input("controls", PortType::Controls),
];

#[derive(Debug, Default)]
pub struct StageOutputNode;

impl StageOutputNode {
    pub fn new() -> Self {
        Self
    }

    pub fn ports(&self) -> &[PortDescriptor] {
        PORTS
    }

    pub fn on_tick(&mut self, _ctx: &mut NodeContext) {}
}

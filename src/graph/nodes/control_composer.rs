//! ControlComposerNode - face + hand metrics to smoothed controls.
//!
//! Unconnected inputs read as the untracked defaults. The first composer
//! in topological order advances the canonical control memory for the
//! tick; any later composer republishes the same vector.

use crate::graph::node::NodeContext;
use crate::graph::port::{PortDescriptor, PortType};
use crate::graph::value::PortValue;
use crate::signal::compose_raw_controls;

static PORTS: &[PortDescriptor] = &[
    PortDescriptor::input("face", PortType::FaceMetrics),
    PortDescriptor::input("hand", PortType::HandMetrics),
    PortDescriptor::output("controls", PortType::Controls),
];

#[derive(Debug, Default)]
pub struct ControlComposerNode;

impl ControlComposerNode {
    pub fn new() -> Self {
        Self
    }

    pub fn ports(&self) -> &[PortDescriptor] {
        PORTS
    }

    pub fn on_tick(&mut self, ctx: &mut NodeContext) {
        let face = ctx.input(0).as_face().copied().unwrap_or_default();
        let hand = ctx.input(1).as_hand().copied().unwrap_or_default();
        let raw = compose_raw_controls(&face, &hand);
        let controls = ctx.controls.advance(ctx.smoother, raw, hand.is_tracked());
        ctx.set_output(0, PortValue::Controls(controls));
    }
}

//! Tracker nodes - turn detector output into per-kind metrics.
//!
//! The scheduler runs the landmark source once per tracked subject kind
//! before the graph walk. A tracker picks its kind's point sets out of the
//! tick's detections and reduces them with the metric extractor. Without a
//! frame on its input it reports nothing tracked.

use crate::graph::node::NodeContext;
use crate::graph::port::{PortDescriptor, PortType};
use crate::graph::value::PortValue;
use crate::signal::{FaceMetrics, HandMetrics};
use crate::types::SubjectKind;
use std::sync::Arc;

/// Output port carrying the raw point sets.
pub const SUBJECTS_OUTPUT: usize = 0;
/// Output port carrying the metrics.
pub const METRICS_OUTPUT: usize = 1;

static FACE_PORTS: &[PortDescriptor] = &[
    PortDescriptor::input("frame", PortType::Frame),
    PortDescriptor::output("subjects", PortType::Subjects),
    PortDescriptor::output("face", PortType::FaceMetrics),
];

static HAND_PORTS: &[PortDescriptor] = &[
    PortDescriptor::input("frame", PortType::Frame),
    PortDescriptor::output("subjects", PortType::Subjects),
    PortDescriptor::output("hand", PortType::HandMetrics),
];

fn publish_subjects(ctx: &mut NodeContext, kind: SubjectKind, has_frame: bool) -> usize {
    let sets = if has_frame {
        ctx.detections.for_kind(kind).to_vec()
    } else {
        Vec::new()
    };
    let count = sets.len();
    ctx.set_output(
        SUBJECTS_OUTPUT,
        PortValue::Subjects {
            kind,
            sets: Arc::new(sets),
        },
    );
    count
}

#[derive(Debug, Default)]
pub struct FaceTrackerNode;

impl FaceTrackerNode {
    pub fn new() -> Self {
        Self
    }

    pub fn ports(&self) -> &[PortDescriptor] {
        FACE_PORTS
    }

    pub fn on_tick(&mut self, ctx: &mut NodeContext) {
        let has_frame = ctx.input(0).as_frame().is_some();
        publish_subjects(ctx, SubjectKind::Face, has_frame);
        let metrics = if has_frame {
            ctx.extractor.extract_face(&ctx.detections.faces)
        } else {
            FaceMetrics::default()
        };
        ctx.set_output(METRICS_OUTPUT, PortValue::Face(metrics));
    }
}

#[derive(Debug, Default)]
pub struct HandTrackerNode;

impl HandTrackerNode {
    pub fn new() -> Self {
        Self
    }

    pub fn ports(&self) -> &[PortDescriptor] {
        HAND_PORTS
    }

    pub fn on_tick(&mut self, ctx: &mut NodeContext) {
        let has_frame = ctx.input(0).as_frame().is_some();
        publish_subjects(ctx, SubjectKind::Hand, has_frame);
        let metrics = if has_frame {
            ctx.extractor.extract_hand(&ctx.detections.hands)
        } else {
            HandMetrics::default()
        };
        ctx.set_output(METRICS_OUTPUT, PortValue::Hand(metrics));
    }
}

//! Values carried on ports and sent to nodes as configuration.
//!
//! `PortValue` is what a node writes to its output cache each tick. Frames
//! and point sets sit behind `Arc` so fanning an output out to several
//! inputs never copies pixel or landmark data.

use crate::graph::port::PortType;
use crate::signal::{FaceMetrics, HandMetrics};
use crate::types::{ControlValues, Frame, SubjectKind, SubjectPointSet};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A value held in a node's output cache.
#[derive(Debug, Clone, Default)]
pub enum PortValue {
    /// Nothing computed (unconnected input, or the node has not run).
    #[default]
    Empty,
    Frame(Arc<Frame>),
    Subjects {
        kind: SubjectKind,
        sets: Arc<Vec<SubjectPointSet>>,
    },
    Face(FaceMetrics),
    Hand(HandMetrics),
    Controls(ControlValues),
    Scalar(f32),
}

impl PortValue {
    /// The port type this value belongs on, `None` for `Empty`.
    pub fn port_type(&self) -> Option<PortType> {
        match self {
            PortValue::Empty => None,
            PortValue::Frame(_) => Some(PortType::Frame),
            PortValue::Subjects { .. } => Some(PortType::Subjects),
            PortValue::Face(_) => Some(PortType::FaceMetrics),
            PortValue::Hand(_) => Some(PortType::HandMetrics),
            PortValue::Controls(_) => Some(PortType::Controls),
            PortValue::Scalar(_) => Some(PortType::Scalar),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, PortValue::Empty)
    }

    pub fn as_frame(&self) -> Option<&Arc<Frame>> {
        match self {
            PortValue::Frame(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn as_subjects(&self) -> Option<(SubjectKind, &[SubjectPointSet])> {
        match self {
            PortValue::Subjects { kind, sets } => Some((*kind, sets.as_slice())),
            _ => None,
        }
    }

    pub fn as_face(&self) -> Option<&FaceMetrics> {
        match self {
            PortValue::Face(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_hand(&self) -> Option<&HandMetrics> {
        match self {
            PortValue::Hand(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_controls(&self) -> Option<&ControlValues> {
        match self {
            PortValue::Controls(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            PortValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }
}

/// Configuration values that can be sent to nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl ConfigValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value; integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(v) => Some(*v),
            ConfigValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(v) => Some(v),
            _ => None,
        }
    }
}

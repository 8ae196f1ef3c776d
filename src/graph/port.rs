//! Port descriptors for the node system.
//!
//! Each node declares its ports via a static `PortDescriptor` array. Input
//! and output ports are numbered separately, in declaration order. The
//! graph uses the declared types to validate edges: an output may feed an
//! input only when both carry the same `PortType`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of data flowing through a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortType {
    /// A camera frame.
    Frame,
    /// Tracked point sets of one subject kind.
    Subjects,
    /// Face measurements.
    FaceMetrics,
    /// Hand measurements.
    HandMetrics,
    /// The control vector.
    Controls,
    /// A single scalar.
    Scalar,
}

impl PortType {
    pub fn display_name(&self) -> &'static str {
        match self {
            PortType::Frame => "Frame",
            PortType::Subjects => "Subjects",
            PortType::FaceMetrics => "Face Metrics",
            PortType::HandMetrics => "Hand Metrics",
            PortType::Controls => "Controls",
            PortType::Scalar => "Scalar",
        }
    }

    /// Whether an output of this type may feed an input of type `input`.
    #[inline]
    pub fn feeds(self, input: PortType) -> bool {
        self == input
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Whether a port is an input or output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    Input,
    Output,
}

/// Static descriptor for a node's port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDescriptor {
    pub name: &'static str,
    pub direction: PortDirection,
    pub ty: PortType,
}

impl PortDescriptor {
    pub const fn input(name: &'static str, ty: PortType) -> Self {
        Self {
            name,
            direction: PortDirection::Input,
            ty,
        }
    }

    pub const fn output(name: &'static str, ty: PortType) -> Self {
        Self {
            name,
            direction: PortDirection::Output,
            ty,
        }
    }
}

/// Types of the input ports, in input-index order.
pub fn input_types(ports: &[PortDescriptor]) -> Vec<PortType> {
    ports
        .iter()
        .filter(|p| p.direction == PortDirection::Input)
        .map(|p| p.ty)
        .collect()
}

/// Types of the output ports, in output-index order.
pub fn output_types(ports: &[PortDescriptor]) -> Vec<PortType> {
    ports
        .iter()
        .filter(|p| p.direction == PortDirection::Output)
        .map(|p| p.ty)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    static PORTS: &[PortDescriptor] = &[
        PortDescriptor::input("frame", PortType::Frame),
        PortDescriptor::output("subjects", PortType::Subjects),
        PortDescriptor::input("gain", PortType::Scalar),
        PortDescriptor::output("face", PortType::FaceMetrics),
    ];

    #[test]
    fn test_split_by_direction() {
        assert_eq!(input_types(PORTS), vec![PortType::Frame, PortType::Scalar]);
        assert_eq!(
            output_types(PORTS),
            vec![PortType::Subjects, PortType::FaceMetrics]
        );
    }

    #[test]
    fn test_compatibility_is_exact() {
        assert!(PortType::Controls.feeds(PortType::Controls));
        assert!(!PortType::FaceMetrics.feeds(PortType::HandMetrics));
        assert!(!PortType::Scalar.feeds(PortType::Controls));
    }
}

//! Graph structure errors.
//!
//! All of these are rejected synchronously at edit time. A failed edit
//! leaves the graph exactly as it was.

use crate::graph::id::{EdgeId, NodeId};
use crate::graph::port::{PortDirection, PortType};
use thiserror::Error;

/// Errors returned by graph-editing operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Port type mismatch: {output} output cannot feed {input} input")]
    TypeMismatch { output: PortType, input: PortType },

    #[error("Edge {from:?} -> {to:?} would create a cycle")]
    CycleDetected { from: NodeId, to: NodeId },

    #[error("Input port {port} of {node:?} already has an incoming edge")]
    PortOccupied { node: NodeId, port: usize },

    #[error("Unknown node {0:?}")]
    UnknownNode(NodeId),

    #[error("{node:?} has no {direction:?} port {port}")]
    InvalidPort {
        node: NodeId,
        port: usize,
        direction: PortDirection,
    },

    #[error("Unknown edge {0:?}")]
    UnknownEdge(EdgeId),
}

pub type GraphResult<T> = std::result::Result<T, GraphError>;

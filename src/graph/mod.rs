//! Node-based dataflow graph.
//!
//! Every tick the runtime walks the graph once: sources publish the frame,
//! trackers turn detector output into metrics, the composer folds metrics
//! into the smoothed control vector, and the stage sink consumes it.
//!
//! # Architecture
//!
//! ```text
//! [CameraSource] ─┬─► [FaceTracker] ─┐
//!                 ├─► [HandTracker] ─┴─► [ControlComposer] ─► [ControlMapper] ─┐
//!                 └────────────────────────────────────────────────────────────┴─► [StageOutput]
//! ```
//!
//! # Design
//!
//! - **Enum dispatch on hot path** - `BuiltinNode` enum for the built-in catalogue.
//! - **Typed ports** - an edge is accepted only when both ends carry the same `PortType`.
//! - **Acyclic by construction** - edits that would close a cycle are rejected.
//! - **Lazy compilation** - the `ExecutionPlan` is rebuilt only after the topology changes.
//! - **Stable ids** - removed nodes and edges leave tombstones; ids are never reused.

pub mod compiled_plan;
pub mod compiler;
pub mod dataflow;
pub mod error;
pub mod id;
pub mod node;
pub mod node_type;
pub mod nodes;
pub mod port;
pub mod value;

pub use compiled_plan::{ExecutionPlan, PlanStats};
pub use dataflow::{
    build_default_graph, DataflowGraph, DefaultNodeIds, Edge, EdgeSnapshot, NodeFactory,
    NodeSnapshot, TickEnv, TopologySnapshot,
};
pub use error::{GraphError, GraphResult};
pub use id::{EdgeId, NodeId};
pub use node::{AnyNode, BuiltinNode, NodeContext, NodeKind, NodePlugin, PreviewRecipe};
pub use node_type::NodeType;
pub use port::{PortDescriptor, PortDirection, PortType};
pub use value::{ConfigValue, PortValue};

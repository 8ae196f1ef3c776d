//! Channel boundary between the runtime and an editing surface.
//!
//! The surface sends [`RuntimeCommand`]s; the scheduler drains them at tick
//! boundaries (never mid-tick) and answers with [`RuntimeMessage`]s. The
//! surface never touches node output caches directly.

use crate::graph::{ConfigValue, EdgeId, GraphError, NodeId, NodeType, TopologySnapshot};
use crate::runtime::state::StatusReport;
use crate::runtime::stats::TickStats;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};

/// Commands sent from the editing surface to the runtime.
#[derive(Debug, Clone)]
pub enum RuntimeCommand {
    /// Start a live session.
    Start,
    /// Stop the live session.
    Stop,
    AddNode(NodeType),
    AddEdge {
        from: NodeId,
        out_port: usize,
        to: NodeId,
        in_port: usize,
    },
    RemoveNode(NodeId),
    RemoveEdge(EdgeId),
    /// Toggle a node's preview.
    SetObserved { node: NodeId, observed: bool },
    /// Send a config change to a specific node.
    Configure {
        node: NodeId,
        key: String,
        value: ConfigValue,
    },
    /// Request a topology snapshot.
    RequestTopology,
    RequestStats,
}

/// Messages sent from the runtime to the editing surface.
#[derive(Debug, Clone)]
pub enum RuntimeMessage {
    /// Scheduler state changed.
    StateChanged(StatusReport),
    /// An edit was rejected.
    GraphError(GraphError),
    NodeAdded { id: NodeId, node_type: NodeType },
    EdgeAdded(EdgeId),
    NodeRemoved(NodeId),
    EdgeRemoved(EdgeId),
    /// Config change applied (`accepted = false` if the node ignored the key).
    Configured {
        node: NodeId,
        key: String,
        accepted: bool,
    },
    Topology(TopologySnapshot),
    Stats(TickStats),
}

/// Channel capacity for commands (surface → runtime).
///
/// The surface and the scheduler share one thread, so a full queue must
/// reject instead of block: the only reader runs after the sender returns.
const CMD_CHANNEL_CAPACITY: usize = 256;

/// Surface-side handle.
pub struct RuntimeBridge {
    pub cmd_tx: Sender<RuntimeCommand>,
    pub msg_rx: Receiver<RuntimeMessage>,
}

/// Runtime-side endpoints, owned by the scheduler.
pub struct RuntimeLink {
    pub cmd_rx: Receiver<RuntimeCommand>,
    pub msg_tx: Sender<RuntimeMessage>,
}

impl RuntimeBridge {
    /// Create a connected pair: `(bridge_for_surface, link_for_runtime)`.
    ///
    /// Messages are unbounded: edit rejections and state changes must reach
    /// the surface even when it drains late.
    pub fn new() -> (Self, RuntimeLink) {
        let (cmd_tx, cmd_rx) = bounded(CMD_CHANNEL_CAPACITY);
        let (msg_tx, msg_rx) = unbounded();
        (Self { cmd_tx, msg_rx }, RuntimeLink { cmd_rx, msg_tx })
    }

    /// Drain all pending messages.
    pub fn drain(&self) -> Vec<RuntimeMessage> {
        self.msg_rx.try_iter().collect()
    }

    /// Try to receive a single message without blocking.
    pub fn try_recv(&self) -> Option<RuntimeMessage> {
        self.msg_rx.try_recv().ok()
    }

    /// Queue a command without blocking. Returns `false` if the queue is
    /// full or the runtime is gone; the command is not applied.
    pub fn send_command(&self, cmd: RuntimeCommand) -> bool {
        match self.cmd_tx.try_send(cmd) {
            Ok(()) => true,
            Err(TrySendError::Full(cmd)) => {
                tracing::warn!(
                    "Command queue full ({} pending), rejecting {:?}",
                    self.cmd_tx.len(),
                    cmd
                );
                false
            }
            Err(TrySendError::Disconnected(cmd)) => {
                tracing::debug!("Runtime gone, dropping {:?}", cmd);
                false
            }
        }
    }

    pub fn start(&self) -> bool {
        self.send_command(RuntimeCommand::Start)
    }

    pub fn stop(&self) -> bool {
        self.send_command(RuntimeCommand::Stop)
    }

    pub fn add_node(&self, node_type: NodeType) -> bool {
        self.send_command(RuntimeCommand::AddNode(node_type))
    }

    pub fn add_edge(&self, from: NodeId, out_port: usize, to: NodeId, in_port: usize) -> bool {
        self.send_command(RuntimeCommand::AddEdge {
            from,
            out_port,
            to,
            in_port,
        })
    }

    pub fn set_observed(&self, node: NodeId, observed: bool) -> bool {
        self.send_command(RuntimeCommand::SetObserved { node, observed })
    }

    pub fn configure(&self, node: NodeId, key: impl Into<String>, value: ConfigValue) -> bool {
        self.send_command(RuntimeCommand::Configure {
            node,
            key: key.into(),
            value,
        })
    }

    pub fn request_topology(&self) -> bool {
        self.send_command(RuntimeCommand::RequestTopology)
    }

    pub fn request_stats(&self) -> bool {
        self.send_command(RuntimeCommand::RequestStats)
    }
}

impl RuntimeLink {
    /// Pending commands, without blocking.
    pub fn pending_commands(&self) -> Vec<RuntimeCommand> {
        self.cmd_rx.try_iter().collect()
    }

    /// Publish a message. Returns `false` only if the surface is gone.
    pub fn publish(&self, msg: RuntimeMessage) -> bool {
        self.msg_tx.send(msg).is_ok()
    }
}

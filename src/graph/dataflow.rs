//! The dataflow graph - topology, edit validation and the per-tick walk.
//!
//! Nodes and edges live in flat arenas indexed by `NodeId` / `EdgeId`.
//! Removal tombstones a slot instead of shifting the arena, so ids stay
//! stable and are never reused. Any topology change bumps the generation
//! and marks the compiled plan dirty; the plan is rebuilt on next use.
//!
//! Every edit is validated up front. A rejected edit returns a
//! [`GraphError`] and leaves the graph untouched.

use crate::graph::compiled_plan::ExecutionPlan;
use crate::graph::compiler::GraphCompiler;
use crate::graph::error::{GraphError, GraphResult};
use crate::graph::id::{EdgeId, NodeId};
use crate::graph::node::{AnyNode, BuiltinNode, NodeContext, NodeKind, NodePlugin, NodeSlot, PreviewRecipe};
use crate::graph::node_type::NodeType;
use crate::graph::nodes::{
    CameraSourceNode, ControlComposerNode, ControlMapperNode, FaceTrackerNode, HandTrackerNode,
    StageOutputNode,
};
use crate::graph::port::{PortDescriptor, PortDirection};
use crate::graph::value::{ConfigValue, PortValue};
use crate::signal::{ControlMemory, ControlSmoother, MetricExtractor};
use crate::types::{Detections, Frame, SubjectKind};
use std::collections::BTreeSet;
use std::sync::Arc;

/// An edge from an output port of one node to an input port of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub from_port: usize,
    pub to: NodeId,
    pub to_port: usize,
}

/// Everything a graph walk needs besides the graph itself.
pub struct TickEnv<'a> {
    pub frame: Option<Arc<Frame>>,
    pub detections: &'a Detections,
    pub extractor: &'a MetricExtractor,
    pub smoother: &'a ControlSmoother,
    pub controls: &'a mut ControlMemory,
    pub tick: u64,
    pub timestamp_ms: u64,
}

/// Snapshot of a single node for the editing surface.
#[derive(Debug, Clone)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub name: String,
    pub node_type: Option<NodeType>,
    pub kind: NodeKind,
    pub ports: Vec<PortDescriptor>,
    pub observed: bool,
}

/// Snapshot of a single edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeSnapshot {
    pub id: EdgeId,
    pub from: NodeId,
    pub from_port: usize,
    pub to: NodeId,
    pub to_port: usize,
}

/// Complete topology snapshot of the graph.
#[derive(Debug, Clone)]
pub struct TopologySnapshot {
    pub nodes: Vec<NodeSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
    /// Execution order at snapshot time
    pub order: Vec<NodeId>,
}

/// The node/edge graph and its cached execution plan.
pub struct DataflowGraph {
    nodes: Vec<NodeSlot>,
    edges: Vec<Option<Edge>>,
    observed: BTreeSet<NodeId>,
    plan: ExecutionPlan,
    generation: u64,
    plan_dirty: bool,
}

impl Default for DataflowGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl DataflowGraph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            observed: BTreeSet::new(),
            plan: ExecutionPlan::default(),
            generation: 0,
            plan_dirty: true,
        }
    }

    // ── Graph building ──

    /// Add a built-in node. Returns its NodeId.
    pub fn add_node(&mut self, node_type: NodeType) -> NodeId {
        self.insert(NodeFactory::create(node_type))
    }

    /// Add a user-defined node.
    pub fn add_plugin(&mut self, plugin: Box<dyn NodePlugin>) -> NodeId {
        self.insert(AnyNode::Plugin(plugin))
    }

    fn insert(&mut self, node: AnyNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        tracing::info!("Added node {:?} ({})", id, node.name());
        self.nodes.push(NodeSlot::new(node));
        self.invalidate_plan();
        id
    }

    /// Connect output `out_port` of `from` to input `in_port` of `to`.
    ///
    /// Checks run in this order: both nodes exist, both ports exist, the
    /// edge is not a self-loop, the port types match, the input is free,
    /// and the edge closes no cycle.
    pub fn add_edge(
        &mut self,
        from: NodeId,
        out_port: usize,
        to: NodeId,
        in_port: usize,
    ) -> GraphResult<EdgeId> {
        let from_slot = self.live_slot(from)?;
        let to_slot = self.live_slot(to)?;

        let out_type = *from_slot
            .output_types
            .get(out_port)
            .ok_or(GraphError::InvalidPort {
                node: from,
                port: out_port,
                direction: PortDirection::Output,
            })?;
        let in_type = *to_slot
            .input_types
            .get(in_port)
            .ok_or(GraphError::InvalidPort {
                node: to,
                port: in_port,
                direction: PortDirection::Input,
            })?;

        if from == to {
            return Err(GraphError::CycleDetected { from, to });
        }
        if !out_type.feeds(in_type) {
            return Err(GraphError::TypeMismatch {
                output: out_type,
                input: in_type,
            });
        }
        if self.live_edges().any(|e| e.to == to && e.to_port == in_port) {
            return Err(GraphError::PortOccupied {
                node: to,
                port: in_port,
            });
        }
        if self.would_create_cycle(from, to) {
            return Err(GraphError::CycleDetected { from, to });
        }

        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Some(Edge {
            id,
            from,
            from_port: out_port,
            to,
            to_port: in_port,
        }));
        self.invalidate_plan();
        tracing::info!(
            "Added edge {:?}: {:?}.{} -> {:?}.{}",
            id,
            from,
            out_port,
            to,
            in_port
        );
        Ok(id)
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> GraphResult<()> {
        match self.edges.get_mut(id.index()) {
            Some(slot) if slot.is_some() => {
                *slot = None;
                self.invalidate_plan();
                tracing::info!("Removed edge {:?}", id);
                Ok(())
            }
            _ => Err(GraphError::UnknownEdge(id)),
        }
    }

    /// Remove a node and every edge touching it.
    pub fn remove_node(&mut self, id: NodeId) -> GraphResult<()> {
        self.live_slot(id)?;

        for slot in self.edges.iter_mut() {
            if slot.is_some_and(|e| e.from == id || e.to == id) {
                *slot = None;
            }
        }
        let node = &mut self.nodes[id.index()];
        node.deleted = true;
        node.clear_outputs();
        self.observed.remove(&id);
        self.invalidate_plan();

        tracing::info!("Removed node {:?}", id);
        Ok(())
    }

    /// Remove every node and edge. Ids issued before the reset stay invalid.
    pub fn reset(&mut self) {
        for slot in &mut self.nodes {
            slot.deleted = true;
            slot.clear_outputs();
        }
        self.edges.iter_mut().for_each(|e| *e = None);
        self.observed.clear();
        self.invalidate_plan();
        tracing::info!("Graph reset");
    }

    /// If `to` can already reach `from`, adding `from -> to` closes a cycle.
    fn would_create_cycle(&self, from: NodeId, to: NodeId) -> bool {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![to];

        while let Some(current) = stack.pop() {
            if current == from {
                return true;
            }
            let idx = current.index();
            if idx >= self.nodes.len() || visited[idx] {
                continue;
            }
            visited[idx] = true;

            for edge in self.live_edges() {
                if edge.from == current {
                    stack.push(edge.to);
                }
            }
        }
        false
    }

    // ── Plan ──

    fn invalidate_plan(&mut self) {
        self.plan_dirty = true;
        self.generation += 1;
    }

    /// The execution plan, recompiled if the topology changed.
    pub fn plan(&mut self) -> &ExecutionPlan {
        if self.plan_dirty {
            self.plan = GraphCompiler::compile(&self.nodes, &self.edges, self.generation);
            self.plan_dirty = false;

            tracing::debug!(
                "Graph recompiled: {} nodes, {} edges, {} reachable (gen {})",
                self.plan.stats.total_nodes,
                self.plan.stats.total_edges,
                self.plan.stats.reachable_nodes,
                self.plan.generation,
            );
            for &sink in &self.plan.unreachable_sinks {
                tracing::warn!(
                    "Sink node '{}' ({:?}) is disconnected from every source",
                    self.nodes[sink].node.name(),
                    NodeId(sink as u32)
                );
            }
        }
        &self.plan
    }

    /// Deterministic execution order of all live nodes.
    ///
    /// Dependencies first; among nodes that are ready at the same time the
    /// one created earlier comes first.
    pub fn topological_order(&mut self) -> Vec<NodeId> {
        self.plan()
            .order
            .iter()
            .map(|&i| NodeId(i as u32))
            .collect()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ── Queries ──

    fn live_slot(&self, id: NodeId) -> GraphResult<&NodeSlot> {
        self.nodes
            .get(id.index())
            .filter(|slot| !slot.deleted)
            .ok_or(GraphError::UnknownNode(id))
    }

    fn live_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().flatten()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.live_slot(id).is_ok()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|s| !s.deleted).count()
    }

    pub fn edge_count(&self) -> usize {
        self.live_edges().count()
    }

    pub fn edges(&self) -> Vec<Edge> {
        self.live_edges().copied().collect()
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        (0..self.nodes.len())
            .filter(|&i| !self.nodes[i].deleted)
            .map(|i| NodeId(i as u32))
            .collect()
    }

    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.live_slot(id).ok().map(|s| s.node.name())
    }

    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.live_slot(id).ok().and_then(|s| s.node.node_type())
    }

    pub fn node_kind(&self, id: NodeId) -> Option<NodeKind> {
        self.live_slot(id).ok().map(|s| s.node.kind())
    }

    pub fn preview_recipe(&self, id: NodeId) -> Option<PreviewRecipe> {
        self.live_slot(id).ok().map(|s| s.node.preview_recipe())
    }

    pub fn ports(&self, id: NodeId) -> Option<&[PortDescriptor]> {
        self.live_slot(id).ok().map(|s| s.node.ports())
    }

    /// Last computed outputs of a node. Read-only: only a graph walk
    /// writes these.
    pub fn outputs(&self, id: NodeId) -> Option<&[PortValue]> {
        self.live_slot(id).ok().map(|s| s.outputs.as_slice())
    }

    /// Current values on a node's inputs, read from upstream output caches.
    pub fn resolve_inputs(&self, id: NodeId) -> Option<Vec<PortValue>> {
        let slot = self.live_slot(id).ok()?;
        let mut inputs = vec![PortValue::Empty; slot.input_types.len()];
        for edge in self.live_edges().filter(|e| e.to == id) {
            let value = self
                .nodes
                .get(edge.from.index())
                .and_then(|s| s.outputs.get(edge.from_port))
                .cloned()
                .unwrap_or_default();
            if let Some(input) = inputs.get_mut(edge.to_port) {
                *input = value;
            }
        }
        Some(inputs)
    }

    /// Live nodes of a built-in type, in execution order.
    pub fn nodes_of_type(&mut self, node_type: NodeType) -> Vec<NodeId> {
        self.topological_order()
            .into_iter()
            .filter(|&id| self.node_type(id) == Some(node_type))
            .collect()
    }

    /// Subject kinds some tracker node consumes.
    pub fn tracked_kinds(&self) -> Vec<SubjectKind> {
        let has = |t: NodeType| {
            self.nodes
                .iter()
                .any(|s| !s.deleted && s.node.node_type() == Some(t))
        };
        let mut kinds = Vec::new();
        if has(NodeType::FaceTracker) {
            kinds.push(SubjectKind::Face);
        }
        if has(NodeType::HandTracker) {
            kinds.push(SubjectKind::Hand);
        }
        kinds
    }

    pub fn snapshot(&mut self) -> TopologySnapshot {
        let order = self.topological_order();
        let nodes = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.deleted)
            .map(|(i, slot)| {
                let id = NodeId(i as u32);
                NodeSnapshot {
                    id,
                    name: slot.node.name().to_string(),
                    node_type: slot.node.node_type(),
                    kind: slot.node.kind(),
                    ports: slot.node.ports().to_vec(),
                    observed: self.observed.contains(&id),
                }
            })
            .collect();
        let edges = self
            .live_edges()
            .map(|e| EdgeSnapshot {
                id: e.id,
                from: e.from,
                from_port: e.from_port,
                to: e.to,
                to_port: e.to_port,
            })
            .collect();
        TopologySnapshot {
            nodes,
            edges,
            order,
        }
    }

    // ── Observation ──

    pub fn set_observed(&mut self, id: NodeId, observed: bool) -> GraphResult<()> {
        self.live_slot(id)?;
        let changed = if observed {
            self.observed.insert(id)
        } else {
            self.observed.remove(&id)
        };
        if changed {
            tracing::debug!("Node {:?} observed = {}", id, observed);
        }
        Ok(())
    }

    pub fn is_observed(&self, id: NodeId) -> bool {
        self.observed.contains(&id)
    }

    /// Observed nodes in id order.
    pub fn observed_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.observed.iter().copied()
    }

    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }

    // ── Configuration ──

    /// Send a config value to a node. `Ok(false)` if the node ignores the key.
    pub fn configure(&mut self, id: NodeId, key: &str, value: &ConfigValue) -> GraphResult<bool> {
        self.live_slot(id)?;
        let accepted = self.nodes[id.index()].node.on_config_change(key, value);
        if accepted {
            tracing::info!("Configured {:?}: {} = {:?}", id, key, value);
        } else {
            tracing::warn!("Node {:?} ignored config key '{}'", id, key);
        }
        Ok(accepted)
    }

    // ── Execution ──

    pub(crate) fn start_all(&mut self) {
        for slot in self.nodes.iter_mut().filter(|s| !s.deleted) {
            slot.node.on_start();
        }
    }

    pub(crate) fn stop_all(&mut self) {
        for slot in self.nodes.iter_mut().filter(|s| !s.deleted) {
            slot.node.on_stop();
            slot.clear_outputs();
        }
    }

    /// Walk every live node once in topological order.
    pub(crate) fn evaluate(&mut self, env: TickEnv<'_>) {
        self.plan();
        let TickEnv {
            frame,
            detections,
            extractor,
            smoother,
            controls,
            tick,
            timestamp_ms,
        } = env;

        for &idx in &self.plan.order {
            let inputs: Vec<PortValue> = self.plan.input_routes[idx]
                .iter()
                .map(|route| {
                    route
                        .and_then(|(from, port)| self.nodes[from].outputs.get(port).cloned())
                        .unwrap_or_default()
                })
                .collect();

            let slot = &mut self.nodes[idx];
            slot.clear_outputs();
            let mut ctx = NodeContext {
                inputs: &inputs,
                outputs: &mut slot.outputs,
                frame: frame.as_ref(),
                detections,
                extractor,
                smoother,
                controls: &mut *controls,
                tick,
                timestamp_ms,
            };
            slot.node.on_tick(&mut ctx);
        }
    }
}

/// Factory for creating built-in nodes dynamically.
pub struct NodeFactory;

impl NodeFactory {
    pub fn create(node_type: NodeType) -> AnyNode {
        let node = match node_type {
            NodeType::CameraSource => BuiltinNode::CameraSource(CameraSourceNode::new()),
            NodeType::FaceTracker => BuiltinNode::FaceTracker(FaceTrackerNode::new()),
            NodeType::HandTracker => BuiltinNode::HandTracker(HandTrackerNode::new()),
            NodeType::ControlComposer => BuiltinNode::ControlComposer(ControlComposerNode::new()),
            NodeType::ControlMapper => BuiltinNode::ControlMapper(ControlMapperNode::new()),
            NodeType::StageOutput => BuiltinNode::StageOutput(StageOutputNode::new()),
        };
        AnyNode::Builtin(node)
    }
}

/// Node IDs of the default graph, so callers can address specific nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultNodeIds {
    pub camera: NodeId,
    pub face_tracker: NodeId,
    pub hand_tracker: NodeId,
    pub composer: NodeId,
    pub mapper: NodeId,
    pub stage_output: NodeId,
}

/// Build the default graph:
/// ```text
/// CameraSource ─┬─► FaceTracker ─┐
///               ├─► HandTracker ─┴─► ControlComposer ─► ControlMapper ─┐
///               └──────────────────────────────────────────────────────┴─► StageOutput
/// ```
pub fn build_default_graph() -> GraphResult<(DataflowGraph, DefaultNodeIds)> {
    use crate::graph::nodes::{stage_output, trackers};

    let mut graph = DataflowGraph::new();
    let ids = DefaultNodeIds {
        camera: graph.add_node(NodeType::CameraSource),
        face_tracker: graph.add_node(NodeType::FaceTracker),
        hand_tracker: graph.add_node(NodeType::HandTracker),
        composer: graph.add_node(NodeType::ControlComposer),
        mapper: graph.add_node(NodeType::ControlMapper),
        stage_output: graph.add_node(NodeType::StageOutput),
    };

    graph.add_edge(ids.camera, 0, ids.face_tracker, 0)?;
    graph.add_edge(ids.camera, 0, ids.hand_tracker, 0)?;
    graph.add_edge(ids.face_tracker, trackers::METRICS_OUTPUT, ids.composer, 0)?;
    graph.add_edge(ids.hand_tracker, trackers::METRICS_OUTPUT, ids.composer, 1)?;
    graph.add_edge(ids.composer, 0, ids.mapper, 0)?;
    graph.add_edge(ids.mapper, 0, ids.stage_output, stage_output::CONTROLS_INPUT)?;
    graph.add_edge(ids.camera, 0, ids.stage_output, stage_output::FRAME_INPUT)?;

    Ok((graph, ids))
}

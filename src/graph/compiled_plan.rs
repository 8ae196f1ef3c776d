/// Compiled execution plan for a dataflow graph.
///
/// Recompiled lazily after any topology change and stamped with the
/// graph generation it was built from.
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    /// Live node indices in topological order, ties broken by creation order
    pub order: Vec<usize>,

    /// Per node index, per input port: the `(node, output port)` feeding it
    pub input_routes: Vec<Vec<Option<(usize, usize)>>>,

    /// Cache invalidation generation number
    pub generation: u64,

    /// Compilation statistics
    pub stats: PlanStats,

    /// Sink nodes no source can reach
    pub unreachable_sinks: Vec<usize>,
}

/// Statistics about the compiled plan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanStats {
    /// Live nodes in the graph
    pub total_nodes: usize,

    /// Live edges in the graph
    pub total_edges: usize,

    /// Nodes downstream of at least one source (sources included)
    pub reachable_nodes: usize,

    /// Number of source nodes (no input ports)
    pub source_nodes: usize,

    /// Number of sink nodes (no output ports)
    pub sink_nodes: usize,

    /// Compilation time in microseconds
    pub compile_time_us: u64,
}

impl ExecutionPlan {
    /// Check if the plan has any nodes
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Upstream `(node, output port)` for an input, if connected.
    pub fn route(&self, node: usize, input_port: usize) -> Option<(usize, usize)> {
        self.input_routes
            .get(node)
            .and_then(|ports| ports.get(input_port))
            .copied()
            .flatten()
    }
}

use super::compiled_plan::{ExecutionPlan, PlanStats};
use super::dataflow::Edge;
use super::node::NodeSlot;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Compiles a dataflow graph into an execution plan
pub struct GraphCompiler;

impl GraphCompiler {
    /// Compile the graph into an execution plan.
    ///
    /// Every live node is scheduled, connected or not: an extractor with no
    /// upstream frame still publishes its untracked defaults. Reachability
    /// from sources is computed only to report dangling sinks.
    ///
    /// # Arguments
    /// * `nodes` - All node slots (including tombstones)
    /// * `edges` - All edge slots (`None` for removed edges)
    /// * `generation` - Generation counter for cache invalidation
    pub fn compile(nodes: &[NodeSlot], edges: &[Option<Edge>], generation: u64) -> ExecutionPlan {
        let start_time = std::time::Instant::now();
        let n = nodes.len();

        let live_edges: Vec<&Edge> = edges
            .iter()
            .flatten()
            .filter(|e| Self::is_live(nodes, e.from.index()) && Self::is_live(nodes, e.to.index()))
            .collect();

        let fwd_adj = Self::build_adjacency(n, &live_edges);
        let order = Self::topological_sort(nodes, &live_edges, &fwd_adj);
        let input_routes = Self::build_routes(nodes, &live_edges);

        let sources: Vec<usize> = (0..n)
            .filter(|&i| !nodes[i].deleted && nodes[i].is_source())
            .collect();
        let sinks: Vec<usize> = (0..n)
            .filter(|&i| !nodes[i].deleted && nodes[i].is_sink())
            .collect();

        let reachable = Self::forward_reachability(&sources, &fwd_adj, n);
        let unreachable_sinks: Vec<usize> =
            sinks.iter().copied().filter(|&s| !reachable[s]).collect();

        let total_nodes = nodes.iter().filter(|slot| !slot.deleted).count();
        if order.len() != total_nodes {
            tracing::warn!(
                "Graph has a cycle! Only {} of {} nodes scheduled.",
                order.len(),
                total_nodes
            );
        }

        let stats = PlanStats {
            total_nodes,
            total_edges: live_edges.len(),
            reachable_nodes: reachable.iter().filter(|&&r| r).count(),
            source_nodes: sources.len(),
            sink_nodes: sinks.len(),
            compile_time_us: start_time.elapsed().as_micros() as u64,
        };

        ExecutionPlan {
            order,
            input_routes,
            generation,
            stats,
            unreachable_sinks,
        }
    }

    fn is_live(nodes: &[NodeSlot], idx: usize) -> bool {
        nodes.get(idx).is_some_and(|slot| !slot.deleted)
    }

    fn build_adjacency(n: usize, edges: &[&Edge]) -> Vec<Vec<usize>> {
        let mut fwd_adj = vec![Vec::new(); n];
        for edge in edges {
            fwd_adj[edge.from.index()].push(edge.to.index());
        }
        fwd_adj
    }

    fn build_routes(nodes: &[NodeSlot], edges: &[&Edge]) -> Vec<Vec<Option<(usize, usize)>>> {
        let mut routes: Vec<Vec<Option<(usize, usize)>>> = nodes
            .iter()
            .map(|slot| vec![None; slot.input_types.len()])
            .collect();
        for edge in edges {
            if let Some(port) = routes[edge.to.index()].get_mut(edge.to_port) {
                *port = Some((edge.from.index(), edge.from_port));
            }
        }
        routes
    }

    /// Kahn's algorithm with a min-heap on node index, so that among nodes
    /// whose dependencies are all satisfied the earliest-created runs first.
    fn topological_sort(nodes: &[NodeSlot], edges: &[&Edge], fwd_adj: &[Vec<usize>]) -> Vec<usize> {
        let n = nodes.len();
        let mut in_degree = vec![0usize; n];
        for edge in edges {
            in_degree[edge.to.index()] += 1;
        }

        let mut ready: BinaryHeap<Reverse<usize>> = (0..n)
            .filter(|&i| !nodes[i].deleted && in_degree[i] == 0)
            .map(Reverse)
            .collect();
        let mut order = Vec::with_capacity(n);

        while let Some(Reverse(node)) = ready.pop() {
            order.push(node);
            for &next in &fwd_adj[node] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        order
    }

    /// Nodes reachable from any source (DFS)
    fn forward_reachability(sources: &[usize], fwd_adj: &[Vec<usize>], n: usize) -> Vec<bool> {
        let mut reachable = vec![false; n];
        let mut stack = Vec::new();

        for &src in sources {
            reachable[src] = true;
            stack.push(src);
        }

        while let Some(node) = stack.pop() {
            for &neighbor in &fwd_adj[node] {
                if !reachable[neighbor] {
                    reachable[neighbor] = true;
                    stack.push(neighbor);
                }
            }
        }

        reachable
    }
}

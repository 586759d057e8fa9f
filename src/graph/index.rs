//! petgraph-based directed index over the source workflow.

use std::collections::HashMap;

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};

use super::types::{NodeId, WorkflowGraph};

/// Directed view of a [`WorkflowGraph`] for structural checks.
///
/// Excluded tools are not indexed. Edges whose endpoints are undeclared or
/// excluded are left out; the builder drops them as well, so they never take
/// part in structural rules.
pub struct GraphIndex {
    pub graph: DiGraph<NodeId, ()>,
    pub node_indices: HashMap<NodeId, NodeIndex>,
    pub dangling_edges: usize,
}

impl GraphIndex {
    pub fn build(workflow: &WorkflowGraph) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        for node in workflow.nodes.iter().filter(|n| !n.tool.is_excluded()) {
            node_indices
                .entry(node.id.clone())
                .or_insert_with(|| graph.add_node(node.id.clone()));
        }

        let mut dangling_edges = 0;
        for edge in &workflow.edges {
            match (node_indices.get(&edge.source), node_indices.get(&edge.target)) {
                (Some(&s), Some(&t)) => {
                    graph.add_edge(s, t, ());
                }
                _ => dangling_edges += 1,
            }
        }

        GraphIndex {
            graph,
            node_indices,
            dangling_edges,
        }
    }

    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }
}

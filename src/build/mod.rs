//! Workflow builder: source graph → numbered target nodes and connections.
//!
//! Public API: `build(graph, formulas) -> TargetWorkflow`

pub mod expand;
pub mod ports;

use std::collections::HashMap;

use crate::expr::FormulaCompiler;
use crate::graph::{Edge, Node, NodeId, WorkflowGraph};
use crate::mapping::{self, Mapping};
use crate::settings;
use crate::target::{Bounds, TargetConnection, TargetNode, TargetWorkflow};

pub const TRACING_TARGET_BUILD: &str = "alternime::build";

/// Source node id → the target node that downstream edges attach to.
pub type IdMap = HashMap<NodeId, u32>;

/// State owned by one build invocation.
struct BuildContext<'a> {
    formulas: &'a FormulaCompiler,
    workflow: TargetWorkflow,
    id_map: IdMap,
    next_id: u32,
}

/// Build the target workflow for `graph`. Infallible: unknown tools become
/// placeholders and edges touching excluded nodes are dropped.
pub fn build(graph: &WorkflowGraph, formulas: &FormulaCompiler) -> TargetWorkflow {
    tracing::info!(
        target: TRACING_TARGET_BUILD,
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "Building target workflow"
    );

    let mut ctx = BuildContext {
        formulas,
        workflow: TargetWorkflow::default(),
        id_map: IdMap::new(),
        next_id: 1,
    };

    for node in &graph.nodes {
        ctx.plan_node(node);
    }
    for edge in &graph.edges {
        ctx.connect(edge);
    }

    tracing::info!(
        target: TRACING_TARGET_BUILD,
        target_nodes = ctx.workflow.nodes.len(),
        connections = ctx.workflow.connections.len(),
        "Target workflow built"
    );
    ctx.workflow
}

impl BuildContext<'_> {
    fn plan_node(&mut self, node: &Node) {
        let primary = match mapping::lookup(&node.tool, &node.config) {
            Mapping::Excluded => {
                tracing::debug!(
                    target: TRACING_TARGET_BUILD,
                    node_id = %node.id,
                    tool = node.tool.name(),
                    "Skipping excluded tool"
                );
                return;
            }
            Mapping::Mapped(spec) => spec,
            Mapping::Gap(spec) => {
                tracing::warn!(
                    target: TRACING_TARGET_BUILD,
                    node_id = %node.id,
                    tool = node.tool.name(),
                    "No mapping for tool, emitting placeholder node"
                );
                spec
            }
        };

        let mut emitted = Vec::new();
        for planned in expand::expand(primary) {
            let id = self.next_id;
            self.next_id += 1;
            let position = Bounds {
                x: node.position.x as i64 + planned.offset.x,
                y: node.position.y as i64 + planned.offset.y,
            };
            tracing::debug!(
                target: TRACING_TARGET_BUILD,
                node_id = %node.id,
                target_id = id,
                spec = planned.spec.name,
                "Planned target node"
            );
            self.workflow.nodes.push(TargetNode {
                id,
                spec: planned.spec,
                settings: settings::node_settings(planned.spec, &node.config, self.formulas),
                position,
            });
            emitted.push(id);
        }

        // Chain multi-stage expansions 1 -> 1 so callers only see the last stage.
        for pair in emitted.windows(2) {
            self.workflow.connections.push(TargetConnection {
                source_id: pair[0],
                dest_id: pair[1],
                source_port: 1,
                dest_port: 1,
            });
        }
        if let Some(&last) = emitted.last() {
            self.id_map.insert(node.id.clone(), last);
        }
    }

    fn connect(&mut self, edge: &Edge) {
        let (Some(&source_id), Some(&dest_id)) =
            (self.id_map.get(&edge.source), self.id_map.get(&edge.target))
        else {
            tracing::debug!(
                target: TRACING_TARGET_BUILD,
                from = %edge.source,
                to = %edge.target,
                "Dropping edge with an unmapped endpoint"
            );
            return;
        };

        let connection = TargetConnection {
            source_id,
            dest_id,
            source_port: ports::source_port(edge.origin_connection),
            dest_port: ports::dest_port(edge.destination_connection),
        };
        tracing::debug!(
            target: TRACING_TARGET_BUILD,
            source_id,
            dest_id,
            source_port = connection.source_port,
            dest_port = connection.dest_port,
            "Emitted connection"
        );
        self.workflow.connections.push(connection);
    }
}

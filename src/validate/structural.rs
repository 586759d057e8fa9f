//! Graph-level structural validation rules (V001, V002) and the cycle warning.

use std::collections::HashSet;

use crate::error::ConvertError;
use crate::graph::{GraphIndex, WorkflowGraph};

use super::TRACING_TARGET_VALIDATE;

/// Run all structural validation rules. Returns all errors found.
pub fn validate_structural(workflow: &WorkflowGraph, index: &GraphIndex) -> Vec<ConvertError> {
    let mut errors = Vec::new();

    v001_unique_node_ids(workflow, &mut errors);
    v002_config_matches_tool(workflow, &mut errors);
    warn_on_cycles(index);

    errors
}

fn v001_unique_node_ids(workflow: &WorkflowGraph, errors: &mut Vec<ConvertError>) {
    let mut seen = HashSet::new();
    for node in &workflow.nodes {
        if !seen.insert(&node.id) {
            errors.push(ConvertError::graph(
                "V001",
                format!("Duplicate node id '{}'", node.id),
                Some(node.id.to_string()),
            ));
        }
    }
}

fn v002_config_matches_tool(workflow: &WorkflowGraph, errors: &mut Vec<ConvertError>) {
    for node in &workflow.nodes {
        let actual = node.config.kind();
        // An absent configuration is always acceptable.
        if actual == crate::graph::ConfigKind::Opaque {
            continue;
        }
        if node.tool.expected_config() != Some(actual) {
            errors.push(ConvertError::graph(
                "V002",
                format!(
                    "Tool '{}' cannot carry a {} configuration",
                    node.tool.name(),
                    actual
                ),
                Some(node.id.to_string()),
            ));
        }
    }
}

/// The builder never orders nodes, so a cycle still converts; the target
/// engine will refuse to run it.
fn warn_on_cycles(index: &GraphIndex) {
    if index.has_cycle() {
        tracing::warn!(
            target: TRACING_TARGET_VALIDATE,
            nodes = index.graph.node_count(),
            "Workflow graph contains a cycle"
        );
    }
}

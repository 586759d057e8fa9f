//! Output invariant checks on a built `TargetWorkflow`.

use std::collections::HashSet;

use super::types::TargetWorkflow;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
    /// The target node the error concerns, if any.
    pub target_id: Option<u32>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.target_id {
            Some(id) => write!(f, "[{}] {} (at node #{})", self.code, self.message, id),
            None => write!(f, "[{}] {}", self.code, self.message),
        }
    }
}

/// Validate a built workflow. Returns all errors found.
pub fn validate_target(workflow: &TargetWorkflow) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    validate_contiguous_ids(workflow, &mut errors);
    validate_connection_endpoints(workflow, &mut errors);
    validate_ports(workflow, &mut errors);

    errors
}

// ---------------------------------------------------------------------------
// Invariant: node ids are 1..=N in emission order
// ---------------------------------------------------------------------------

fn validate_contiguous_ids(workflow: &TargetWorkflow, errors: &mut Vec<ValidationError>) {
    for (index, node) in workflow.nodes.iter().enumerate() {
        let expected = index as u32 + 1;
        if node.id != expected {
            errors.push(ValidationError {
                code: "E001",
                message: format!("Node id {} out of sequence, expected {}", node.id, expected),
                target_id: Some(node.id),
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant: every connection endpoint is an emitted node
// ---------------------------------------------------------------------------

fn validate_connection_endpoints(workflow: &TargetWorkflow, errors: &mut Vec<ValidationError>) {
    let ids: HashSet<u32> = workflow.nodes.iter().map(|n| n.id).collect();
    for conn in &workflow.connections {
        for endpoint in [conn.source_id, conn.dest_id] {
            if !ids.contains(&endpoint) {
                errors.push(ValidationError {
                    code: "E002",
                    message: format!(
                        "Connection {} -> {} references unknown node {}",
                        conn.source_id, conn.dest_id, endpoint
                    ),
                    target_id: Some(endpoint),
                });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant: ports are 1-based
// ---------------------------------------------------------------------------

fn validate_ports(workflow: &TargetWorkflow, errors: &mut Vec<ValidationError>) {
    for conn in &workflow.connections {
        if conn.source_port == 0 || conn.dest_port == 0 {
            errors.push(ValidationError {
                code: "E003",
                message: format!(
                    "Connection {} -> {} uses port 0",
                    conn.source_id, conn.dest_id
                ),
                target_id: Some(conn.source_id),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::SORTER;
    use crate::settings::Config;
    use crate::target::types::{Bounds, TargetConnection, TargetNode};

    fn node(id: u32) -> TargetNode {
        TargetNode {
            id,
            spec: &SORTER,
            settings: Config::new("settings.xml"),
            position: Bounds { x: 0, y: 0 },
        }
    }

    fn conn(source_id: u32, dest_id: u32, source_port: u32, dest_port: u32) -> TargetConnection {
        TargetConnection {
            source_id,
            dest_id,
            source_port,
            dest_port,
        }
    }

    fn codes(errors: &[ValidationError]) -> Vec<&str> {
        errors.iter().map(|e| e.code).collect()
    }

    #[test]
    fn valid_workflow_passes() {
        let wf = TargetWorkflow {
            nodes: vec![node(1), node(2)],
            connections: vec![conn(1, 2, 1, 1)],
        };
        assert!(validate_target(&wf).is_empty());
    }

    #[test]
    fn gap_in_ids_is_reported() {
        let wf = TargetWorkflow {
            nodes: vec![node(1), node(3)],
            connections: vec![],
        };
        assert_eq!(codes(&validate_target(&wf)), vec!["E001"]);
    }

    #[test]
    fn dangling_endpoint_and_zero_port() {
        let wf = TargetWorkflow {
            nodes: vec![node(1)],
            connections: vec![conn(1, 9, 0, 1)],
        };
        assert_eq!(codes(&validate_target(&wf)), vec!["E002", "E003"]);
    }
}

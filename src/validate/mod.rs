//! Graph-level validation phase (pre-build).
//!
//! Rejects inputs the builder cannot turn into a loadable archive. Everything
//! else (unknown tools, dangling edges, cycles, unparseable formulas) is
//! recovered or reported as a warning.

pub mod structural;

use crate::error::ConvertError;
use crate::graph::{GraphIndex, WorkflowGraph};

pub const TRACING_TARGET_VALIDATE: &str = "alternime::validate";

/// Validate the workflow graph. Returns all errors found.
pub fn validate_graph(workflow: &WorkflowGraph, index: &GraphIndex) -> Vec<ConvertError> {
    structural::validate_structural(workflow, index)
}

//! Workflow graph model: JSON → Rust types + petgraph index.

pub mod index;
pub mod types;

pub use index::GraphIndex;
pub use types::*;

use crate::error::ConvertError;

/// Deserialize a workflow graph JSON string into a `WorkflowGraph`.
pub fn parse(json: &str) -> Result<WorkflowGraph, Vec<ConvertError>> {
    serde_json::from_str::<WorkflowGraph>(json).map_err(|e| {
        vec![ConvertError::input(
            "P001",
            format!("Failed to parse workflow graph JSON: {}", e),
        )]
    })
}

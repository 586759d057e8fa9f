pub mod archive;
pub mod build;
pub mod error;
pub mod expr;
pub mod graph;
pub mod mapping;
pub mod settings;
pub mod target;
pub mod validate;
pub mod wasm;
pub mod writer;

use crate::archive::Archive;
use crate::error::ConvertError;
use crate::expr::FormulaCompiler;
use crate::graph::{GraphIndex, WorkflowGraph};

/// Full pipeline: validate → build → target validate → assemble.
///
/// Formula failures never surface here; they end up as fallback or
/// placeholder scripts inside the archive.
pub fn convert(
    graph: &WorkflowGraph,
    formulas: &FormulaCompiler,
) -> Result<Archive, Vec<ConvertError>> {
    let index = GraphIndex::build(graph);
    let errors = validate::validate_graph(graph, &index);
    if !errors.is_empty() {
        return Err(errors);
    }

    let target = build::build(graph, formulas);

    let target_errors = target::validate_target(&target);
    if !target_errors.is_empty() {
        return Err(target_errors.into_iter().map(ConvertError::from).collect());
    }

    Ok(archive::assemble(&target))
}

/// Parse graph JSON, then run [`convert`].
pub fn convert_json(json: &str, formulas: &FormulaCompiler) -> Result<Archive, Vec<ConvertError>> {
    let graph = graph::parse(json)?;
    convert(&graph, formulas)
}

//! Expression transpiler: source formula language → target row scripts.
//!
//! Public API: `parse_expression`, `ScriptGenerator`, `FormulaCompiler`.

pub mod ast;
pub mod codegen;
pub mod fallback;
pub mod formula;
pub mod parser;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use codegen::ScriptGenerator;
#[cfg(not(target_arch = "wasm32"))]
pub use fallback::ChatFallback;
pub use fallback::{
    DisabledFallback, FallbackConfig, FallbackError, FallbackRequest, FallbackService,
};
pub use formula::{FAILURE_MARKER, FieldScript, FormulaCompiler, ScriptOrigin};
pub use parser::parse_expression;

pub const TRACING_TARGET_FORMULA: &str = "alternime::expr::formula";

/// Why one formula step was rejected by the deterministic path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpressionError {
    #[error("parse error: {0}")]
    Parse(String),
    #[error("generation error: {0}")]
    Generation(String),
}

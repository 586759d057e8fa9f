//! Column Expressions settings from a Formula config.
//!
//! One element per formula step. Steps of the same field repeat that field's
//! compiled script, which the target applies once per element.

use std::collections::HashMap;

use crate::expr::FormulaCompiler;
use crate::graph::FormulaConfig;

use super::{Config, STRING_CELL};

pub fn fill(model: &mut Config, formulas: &FormulaConfig, compiler: &FormulaCompiler) {
    let compiled = compiler.compile(formulas);
    let scripts: HashMap<&str, &str> = compiled
        .iter()
        .map(|s| (s.field.as_str(), s.script.as_str()))
        .collect();

    model
        .config("expressions", |elements| {
            for (i, step) in formulas.formulas.iter().enumerate() {
                let script = scripts.get(step.field.as_str()).copied().unwrap_or_default();
                elements.config(format!("element {i}"), |e| {
                    e.string("expression", script)
                        .string("outputName", step.field.as_str())
                        .config("outputType", |t| {
                            t.string("cell_class", STRING_CELL).boolean("is_null", false);
                        })
                        .boolean("replaceColumn", false)
                        .boolean("isCollection", false);
                });
            }
        })
        .int("count", formulas.formulas.len() as i64)
        .boolean("failOnInvalidAccess", true)
        .boolean("failOnScriptError", false)
        .int("multiRowAccessWindowSize", 0)
        .boolean("multiRowAccessReturnFirstLastWhenOutOfBounds", true);
}

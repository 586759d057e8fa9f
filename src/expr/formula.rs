//! Formula compiler: one node's formula steps → one script per output field.

use std::sync::Arc;

use crate::graph::FormulaConfig;
use crate::writer::CodeWriter;

use super::codegen::{ACCUMULATOR, ScriptGenerator};
use super::fallback::{DisabledFallback, FallbackRequest, FallbackService};
use super::parser::parse_expression;
use super::{ExpressionError, TRACING_TARGET_FORMULA};

/// Prefix of the inert script produced when every conversion path failed.
pub const FAILURE_MARKER: &str = "// Conversion failed:";

/// How a field's script was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptOrigin {
    Deterministic,
    Fallback,
    Placeholder,
}

/// The compiled script for one output field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldScript {
    pub field: String,
    pub script: String,
    pub origin: ScriptOrigin,
}

/// Compiles formula configs, escalating rejected fields to a fallback service.
#[derive(Clone)]
pub struct FormulaCompiler {
    fallback: Arc<dyn FallbackService>,
}

impl FormulaCompiler {
    pub fn new(fallback: Arc<dyn FallbackService>) -> Self {
        Self { fallback }
    }

    /// A compiler whose fallback always fails, so rejected fields become
    /// placeholders.
    pub fn offline() -> Self {
        Self::new(Arc::new(DisabledFallback))
    }

    /// One script per distinct field, in order of first appearance.
    pub fn compile(&self, config: &FormulaConfig) -> Vec<FieldScript> {
        group_by_field(config)
            .into_iter()
            .map(|(field, steps)| self.compile_field(field, &steps))
            .collect()
    }

    /// Compile all steps of one field. Never fails and never returns an
    /// empty script.
    pub fn compile_field(&self, field: &str, steps: &[&str]) -> FieldScript {
        match deterministic_script(field, steps) {
            Ok(script) => FieldScript {
                field: field.to_string(),
                script,
                origin: ScriptOrigin::Deterministic,
            },
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_FORMULA,
                    field,
                    steps = steps.len(),
                    error = %error,
                    "Escalating field to fallback service"
                );
                self.escalate(field, steps)
            }
        }
    }

    fn escalate(&self, field: &str, steps: &[&str]) -> FieldScript {
        let request = FallbackRequest {
            field_name: field.to_string(),
            steps: steps.iter().map(|s| s.to_string()).collect(),
        };
        match self.fallback.convert(&request) {
            Ok(script) if !script.trim().is_empty() => FieldScript {
                field: field.to_string(),
                script: script.replace("isNull(", "isMissing("),
                origin: ScriptOrigin::Fallback,
            },
            Ok(_) => self.placeholder(field, "fallback returned an empty script"),
            Err(error) => self.placeholder(field, &error.to_string()),
        }
    }

    fn placeholder(&self, field: &str, cause: &str) -> FieldScript {
        tracing::warn!(
            target: TRACING_TARGET_FORMULA,
            field,
            cause,
            "Fallback failed, emitting placeholder script"
        );
        FieldScript {
            field: field.to_string(),
            script: placeholder_script(cause),
            origin: ScriptOrigin::Placeholder,
        }
    }
}

impl Default for FormulaCompiler {
    fn default() -> Self {
        Self::offline()
    }
}

/// Inert script carrying the failure cause on a single comment line.
pub fn placeholder_script(cause: &str) -> String {
    let flat: Vec<&str> = cause.split(['\r', '\n']).filter(|s| !s.is_empty()).collect();
    format!("{} {}", FAILURE_MARKER, flat.join(" "))
}

fn group_by_field(config: &FormulaConfig) -> Vec<(&str, Vec<&str>)> {
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for step in &config.formulas {
        match groups.iter_mut().find(|(field, _)| *field == step.field) {
            Some((_, steps)) => steps.push(step.expression.as_str()),
            None => groups.push((step.field.as_str(), vec![step.expression.as_str()])),
        }
    }
    groups
}

/// Build the accumulator script, failing on the first rejected step.
fn deterministic_script(field: &str, steps: &[&str]) -> Result<String, ExpressionError> {
    let generator = ScriptGenerator::new(field);
    let mut w = CodeWriter::new();
    w.line(&format!("var {} = null;", ACCUMULATOR));
    w.line(&format!(
        "try {{ {} = column(\"{}\"); }} catch(e) {{}}",
        ACCUMULATOR, field
    ));
    for step in steps {
        let expr = parse_expression(step)?;
        let code = generator.generate_statement(&expr)?;
        w.line(&format!("{} = {};", ACCUMULATOR, code));
    }
    w.write(&format!("{};", ACCUMULATOR));
    Ok(w.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::FormulaStep;

    fn config(steps: &[(&str, &str)]) -> FormulaConfig {
        FormulaConfig {
            formulas: steps
                .iter()
                .map(|(field, expression)| FormulaStep {
                    field: field.to_string(),
                    expression: expression.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn groups_preserve_first_appearance() {
        let cfg = config(&[("B", "1"), ("A", "2"), ("B", "[B] + 1")]);
        let groups = group_by_field(&cfg);
        assert_eq!(groups, vec![("B", vec!["1", "[B] + 1"]), ("A", vec!["2"])]);
    }

    #[test]
    fn deterministic_script_shape() {
        let script = deterministic_script("Total", &["[Total] + 1"]).unwrap();
        assert_eq!(
            script,
            "var val = null;\ntry { val = column(\"Total\"); } catch(e) {}\nval = val + 1;\nval;"
        );
    }

    #[test]
    fn placeholder_flattens_newlines() {
        let script = placeholder_script("line one\nline two\r\n");
        assert_eq!(script, "// Conversion failed: line one line two");
        assert!(!script.contains('\n'));
    }

    #[test]
    fn offline_compiler_emits_placeholder_for_bad_step() {
        let compiler = FormulaCompiler::offline();
        let out = compiler.compile(&config(&[("X", "1 +"), ("Y", "2")]));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].origin, ScriptOrigin::Placeholder);
        assert!(out[0].script.starts_with(FAILURE_MARKER));
        assert_eq!(out[1].origin, ScriptOrigin::Deterministic);
    }
}

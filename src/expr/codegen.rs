//! `Expr` → target script expression text.

use super::ExpressionError;
use super::ast::{BinaryOp, Expr, UnaryOp};

/// Identifier of the accumulator variable in generated scripts.
pub const ACCUMULATOR: &str = "val";

const ISO_NOW: &str = "new Date().toISOString()";

/// Emits target script text for one formula step.
///
/// References to `target_field` read the running accumulator instead of the
/// input column.
pub struct ScriptGenerator<'a> {
    target_field: &'a str,
}

impl<'a> ScriptGenerator<'a> {
    pub fn new(target_field: &'a str) -> Self {
        Self { target_field }
    }

    /// Emit the right-hand side of an assignment. The outermost binary
    /// operation is left unparenthesized.
    pub fn generate_statement(&self, expr: &Expr) -> Result<String, ExpressionError> {
        match expr {
            Expr::Binary { left, op, right } => Ok(format!(
                "{} {} {}",
                self.generate(left)?,
                binary_symbol(*op),
                self.generate(right)?
            )),
            other => self.generate(other),
        }
    }

    pub fn generate(&self, expr: &Expr) -> Result<String, ExpressionError> {
        match expr {
            Expr::Number { raw } => Ok(raw.clone()),
            Expr::String { value } => Ok(format!("\"{}\"", value)),
            Expr::Boolean { value } => Ok(value.to_string()),
            Expr::Column { name } => Ok(self.emit_column(name)),
            Expr::Call { name, args } => self.emit_call(name, args),
            Expr::Unary { op, operand } => {
                let operand = self.generate(operand)?;
                Ok(match op {
                    UnaryOp::Neg => format!("(-{})", operand),
                    UnaryOp::Not => format!("(!{})", operand),
                })
            }
            Expr::Binary { left, op, right } => {
                let left = self.generate(left)?;
                let right = self.generate(right)?;
                Ok(format!("({} {} {})", left, binary_symbol(*op), right))
            }
            Expr::If {
                condition,
                then_branch,
                else_branch,
            } => Ok(format!(
                "({} ? {} : {})",
                self.generate(condition)?,
                self.generate(then_branch)?,
                self.generate(else_branch)?
            )),
        }
    }

    fn emit_column(&self, name: &str) -> String {
        if name == self.target_field {
            ACCUMULATOR.to_string()
        } else {
            format!("column(\"{}\")", name)
        }
    }

    fn emit_call(&self, name: &str, args: &[Expr]) -> Result<String, ExpressionError> {
        let upper = name.to_uppercase();
        // Date builtins ignore their arguments entirely.
        if matches!(
            upper.as_str(),
            "DATETIMESTART" | "DATETIMENOW" | "DATETIMETODAY"
        ) {
            return Ok(ISO_NOW.to_string());
        }

        let args = args
            .iter()
            .map(|a| self.generate(a))
            .collect::<Result<Vec<_>, _>>()?;

        let rewritten = match upper.as_str() {
            "ISNULL" => {
                let [a] = arity::<1>(name, &args)?;
                format!("isMissing({})", a)
            }
            "ISEMPTY" => {
                let [a] = arity::<1>(name, &args)?;
                format!("({} == \"\")", a)
            }
            "REGEX_MATCH" => {
                let [a, b] = arity::<2>(name, &args)?;
                format!("regexMatcher({}, {})", a, b)
            }
            "REGEX_REPLACE" => {
                let [a, b, c] = arity::<3>(name, &args)?;
                format!("regexReplace({}, {}, {})", a, b, c)
            }
            "LEFT" => {
                let [a, b] = arity::<2>(name, &args)?;
                format!("substr({}, 0, {})", a, b)
            }
            "REPLACE" => {
                let [a, b, c] = arity::<3>(name, &args)?;
                format!("replace({}, {}, {})", a, b, c)
            }
            _ => format!("{}({})", name, args.join(", ")),
        };
        Ok(rewritten)
    }
}

fn arity<'s, const N: usize>(
    name: &str,
    args: &'s [String],
) -> Result<[&'s str; N], ExpressionError> {
    if args.len() != N {
        return Err(ExpressionError::Generation(format!(
            "{}() expects {} argument(s), got {}",
            name,
            N,
            args.len()
        )));
    }
    Ok(std::array::from_fn(|i| args[i].as_str()))
}

fn binary_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Eq => "==",
        BinaryOp::NotEq => "!=",
        BinaryOp::Lt => "<",
        BinaryOp::Gt => ">",
        BinaryOp::LtEq => "<=",
        BinaryOp::GtEq => ">=",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
    }
}

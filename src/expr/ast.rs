//! AST for the source row-expression language.
//!
//! Pure data: the parser produces it, the script generator consumes it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expr {
    /// Literal text as written, so large or exponent forms survive intact.
    Number { raw: String },
    String { value: String },
    Boolean { value: bool },
    Column { name: String },
    Call { name: String, args: Vec<Expr> },
    Unary { op: UnaryOp, operand: Box<Expr> },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    If {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Binary operators after parsing.
///
/// String concatenation (`&`) and addition share `Add`; `=`/`==` share `Eq`
/// and `!=`/`<>` share `NotEq`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
}

// Convenience constructors, mostly for tests and the parser.
impl Expr {
    pub fn number(raw: impl Into<String>) -> Self {
        Expr::Number { raw: raw.into() }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::String {
            value: value.into(),
        }
    }

    pub fn column(name: impl Into<String>) -> Self {
        Expr::Column { name: name.into() }
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            name: name.into(),
            args,
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn if_else(condition: Expr, then_branch: Expr, else_branch: Expr) -> Self {
        Expr::If {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }
    }
}

//! Expression parser: source formula text → `Expr`.
//!
//! Keywords are normalized to upper case first (outside string literals and
//! column references), then the pest grammar parses the canonical text.

use std::sync::LazyLock;

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use regex::Regex;

use super::ExpressionError;
use super::ast::{BinaryOp, Expr, UnaryOp};

#[derive(Parser)]
#[grammar = "expr/grammar.pest"]
struct FormulaParser;

static KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(elseif|endif|else|then|iif|if|and|or|not|true|false)\b")
        .expect("keyword pattern is valid")
});

/// Parse one formula expression into an AST.
///
/// Fails with `ExpressionError::Parse` on any input the grammar cannot
/// reduce completely.
pub fn parse_expression(source: &str) -> Result<Expr, ExpressionError> {
    let normalized = normalize_keywords(source);
    let mut pairs = FormulaParser::parse(Rule::formula, &normalized)
        .map_err(|e| ExpressionError::Parse(e.to_string()))?;
    let formula = pairs
        .next()
        .ok_or_else(|| ExpressionError::Parse("empty parse".into()))?;
    let expression = formula
        .into_inner()
        .find(|p| p.as_rule() == Rule::expression)
        .ok_or_else(|| ExpressionError::Parse("missing expression".into()))?;
    build(expression)
}

/// Upper-case recognized keywords, leaving quoted strings and bracketed
/// column names untouched.
pub fn normalize_keywords(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut plain = String::new();
    let mut chars = source.chars();

    while let Some(c) = chars.next() {
        let close = match c {
            '\'' => '\'',
            '"' => '"',
            '[' => ']',
            _ => {
                plain.push(c);
                continue;
            }
        };
        flush_plain(&mut plain, &mut out);
        out.push(c);
        for inner in chars.by_ref() {
            out.push(inner);
            if inner == close {
                break;
            }
        }
    }
    flush_plain(&mut plain, &mut out);
    out
}

fn flush_plain(plain: &mut String, out: &mut String) {
    if plain.is_empty() {
        return;
    }
    let upper = KEYWORD.replace_all(plain, |caps: &regex::Captures<'_>| caps[0].to_uppercase());
    out.push_str(&upper);
    plain.clear();
}

fn build(pair: Pair<'_, Rule>) -> Result<Expr, ExpressionError> {
    match pair.as_rule() {
        Rule::expression | Rule::factor => build(first_inner(pair)?),
        Rule::or_expr | Rule::and_expr | Rule::additive | Rule::term => fold_binary(pair),
        Rule::comparison => {
            let mut inner = pair.into_inner();
            let left = build(next_pair(&mut inner)?)?;
            match inner.next() {
                None => Ok(left),
                Some(op) => {
                    let op = binary_op(&op)?;
                    let right = build(next_pair(&mut inner)?)?;
                    Ok(Expr::binary(left, op, right))
                }
            }
        }
        Rule::not_expr => {
            let operand = operands(pair).next().ok_or_else(|| missing("NOT operand"))?;
            Ok(Expr::unary(UnaryOp::Not, build(operand)?))
        }
        Rule::neg_expr => Ok(Expr::unary(UnaryOp::Neg, build(first_inner(pair)?)?)),
        Rule::if_expr => build_if(pair),
        Rule::iif_expr => {
            let mut parts = operands(pair);
            let condition = build(parts.next().ok_or_else(|| missing("IIF condition"))?)?;
            let then_branch = build(parts.next().ok_or_else(|| missing("IIF then value"))?)?;
            let else_branch = build(parts.next().ok_or_else(|| missing("IIF else value"))?)?;
            Ok(Expr::if_else(condition, then_branch, else_branch))
        }
        Rule::call => {
            let mut inner = pair.into_inner();
            let name = next_pair(&mut inner)?.as_str().to_string();
            let args = inner.map(build).collect::<Result<Vec<_>, _>>()?;
            Ok(Expr::call(name, args))
        }
        Rule::boolean => Ok(Expr::Boolean {
            value: pair.as_str() == "TRUE",
        }),
        Rule::number => Ok(Expr::number(pair.as_str())),
        Rule::string => Ok(Expr::string(
            pair.into_inner().next().map(|p| p.as_str()).unwrap_or(""),
        )),
        Rule::column => Ok(Expr::column(first_inner(pair)?.as_str())),
        other => Err(ExpressionError::Parse(format!(
            "unexpected grammar node {other:?}"
        ))),
    }
}

/// Left-fold `operand (op operand)*` sequences. Keyword operators arrive as
/// their own pairs, so every odd position is an operator.
fn fold_binary(pair: Pair<'_, Rule>) -> Result<Expr, ExpressionError> {
    let mut inner = pair.into_inner();
    let mut acc = build(next_pair(&mut inner)?)?;
    while let Some(op) = inner.next() {
        let op = binary_op(&op)?;
        let right = build(next_pair(&mut inner)?)?;
        acc = Expr::binary(acc, op, right);
    }
    Ok(acc)
}

/// `IF c THEN a ELSEIF c2 THEN b ELSE d ENDIF` becomes nested conditionals.
fn build_if(pair: Pair<'_, Rule>) -> Result<Expr, ExpressionError> {
    let parts: Vec<_> = operands(pair).collect();
    let [condition, value, elseifs @ .., otherwise] = parts.as_slice() else {
        return Err(missing("IF branches"));
    };

    let mut branches = vec![(build(condition.clone())?, build(value.clone())?)];
    for clause in elseifs {
        let mut clause = operands(clause.clone());
        let condition = build(clause.next().ok_or_else(|| missing("ELSEIF condition"))?)?;
        let value = build(clause.next().ok_or_else(|| missing("ELSEIF value"))?)?;
        branches.push((condition, value));
    }

    let mut acc = build(otherwise.clone())?;
    for (condition, value) in branches.into_iter().rev() {
        acc = Expr::if_else(condition, value, acc);
    }
    Ok(acc)
}

fn binary_op(pair: &Pair<'_, Rule>) -> Result<BinaryOp, ExpressionError> {
    let op = match pair.as_str() {
        "+" | "&" => BinaryOp::Add,
        "-" => BinaryOp::Sub,
        "*" => BinaryOp::Mul,
        "/" => BinaryOp::Div,
        "=" | "==" => BinaryOp::Eq,
        "!=" | "<>" => BinaryOp::NotEq,
        "<" => BinaryOp::Lt,
        ">" => BinaryOp::Gt,
        "<=" => BinaryOp::LtEq,
        ">=" => BinaryOp::GtEq,
        "AND" => BinaryOp::And,
        "OR" => BinaryOp::Or,
        other => {
            return Err(ExpressionError::Parse(format!("unknown operator '{other}'")));
        }
    };
    Ok(op)
}

/// Inner pairs with keyword tokens filtered out.
fn operands(pair: Pair<'_, Rule>) -> impl Iterator<Item = Pair<'_, Rule>> {
    pair.into_inner().filter(|p| !is_keyword(p.as_rule()))
}

fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_if
            | Rule::kw_then
            | Rule::kw_elseif
            | Rule::kw_else
            | Rule::kw_endif
            | Rule::kw_iif
            | Rule::kw_not
    )
}

fn first_inner(pair: Pair<'_, Rule>) -> Result<Pair<'_, Rule>, ExpressionError> {
    let rule = pair.as_rule();
    pair.into_inner()
        .next()
        .ok_or_else(|| ExpressionError::Parse(format!("empty {rule:?}")))
}

fn next_pair<'i>(
    inner: &mut pest::iterators::Pairs<'i, Rule>,
) -> Result<Pair<'i, Rule>, ExpressionError> {
    inner.next().ok_or_else(|| missing("operand"))
}

fn missing(what: &str) -> ExpressionError {
    ExpressionError::Parse(format!("missing {what}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Expr {
        parse_expression(src).unwrap_or_else(|e| panic!("parse '{src}': {e}"))
    }

    #[test]
    fn normalizes_keywords_outside_literals() {
        assert_eq!(
            normalize_keywords("if [order and ship] = 'or' then 1 else 2 endif"),
            "IF [order and ship] = 'or' THEN 1 ELSE 2 ENDIF"
        );
        assert_eq!(normalize_keywords("Iif(x, \"if\", 0)"), "IIF(x, \"if\", 0)");
        // Substrings of identifiers stay as written.
        assert_eq!(normalize_keywords("android + notes"), "android + notes");
    }

    #[test]
    fn precedence_mul_over_add() {
        assert_eq!(
            parse("1 + 2 * 3"),
            Expr::binary(
                Expr::number("1"),
                BinaryOp::Add,
                Expr::binary(Expr::number("2"), BinaryOp::Mul, Expr::number("3")),
            )
        );
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = parse("[a] = 1 or [b] = 2 and [c] = 3");
        let Expr::Binary { op, right, .. } = expr else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Or);
        assert!(matches!(*right, Expr::Binary { op: BinaryOp::And, .. }));
    }

    #[test]
    fn concat_shares_add_tag() {
        assert_eq!(
            parse("[a] & 'x'"),
            Expr::binary(Expr::column("a"), BinaryOp::Add, Expr::string("x"))
        );
    }

    #[test]
    fn not_equal_spellings() {
        assert_eq!(parse("1 <> 2"), parse("1 != 2"));
        assert_eq!(parse("1 = 2"), parse("1 == 2"));
    }

    #[test]
    fn unary_forms() {
        assert_eq!(parse("-5"), Expr::unary(UnaryOp::Neg, Expr::number("5")));
        assert_eq!(
            parse("not isnull([x])"),
            Expr::unary(
                UnaryOp::Not,
                Expr::call("isnull", vec![Expr::column("x")])
            )
        );
    }

    #[test]
    fn if_and_iif_build_the_same_tree() {
        let a = parse("IF [x] > 1 THEN 'big' ELSE 'small' ENDIF");
        let b = parse("IIF([x] > 1, 'big', 'small')");
        assert_eq!(a, b);
    }

    #[test]
    fn elseif_desugars_to_nested_conditional() {
        let expr = parse("if [x] = 1 then 'a' elseif [x] = 2 then 'b' else 'c' endif");
        let Expr::If { else_branch, .. } = expr else {
            panic!("expected conditional");
        };
        let Expr::If {
            then_branch,
            else_branch: inner_else,
            ..
        } = *else_branch
        else {
            panic!("expected nested conditional");
        };
        assert_eq!(*then_branch, Expr::string("b"));
        assert_eq!(*inner_else, Expr::string("c"));
    }

    #[test]
    fn literals() {
        assert_eq!(parse("\"dq\""), Expr::string("dq"));
        assert_eq!(parse("''"), Expr::string(""));
        assert_eq!(parse("2.5"), Expr::number("2.5"));
        assert_eq!(parse("true"), Expr::Boolean { value: true });
        assert_eq!(parse("[Order Date]"), Expr::column("Order Date"));
    }

    #[test]
    fn calls_with_and_without_args() {
        assert_eq!(parse("DateTimeStart()"), Expr::call("DateTimeStart", vec![]));
        assert_eq!(
            parse("Left([Name], 3)"),
            Expr::call("Left", vec![Expr::column("Name"), Expr::number("3")])
        );
    }

    #[test]
    fn rejects_incomplete_input() {
        for bad in ["IF [x] THEN 1", "1 +", "((1)", "[x] ==", "", "Left([a],"] {
            assert!(
                matches!(parse_expression(bad), Err(ExpressionError::Parse(_))),
                "expected parse failure for {bad:?}"
            );
        }
    }
}

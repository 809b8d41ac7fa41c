//! Abstract syntax tree for the expression grammar (spec §4.1).

use octran_common::Span;

/// A parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric literal (integer literals are already widened to float).
    Number(f64),
    /// A string literal.
    Str(String),
    /// A bare identifier referring to a leaf or rule name.
    Variable { name: String, span: Span },
    /// A function call.
    Call {
        name: String,
        args: Vec<Expr>,
        span: Span,
    },
    /// A binary arithmetic operator: `+ - * /`.
    BinaryOp {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Exponentiation. Per the grammar, both operands are `Value`s, not
    /// arbitrary `Factor`s -- `^` does not chain without parentheses.
    Pow { base: Box<Expr>, exp: Box<Expr> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Extract all bare identifiers from an AST by role, in source order, with
/// no deduplication (spec §4.1's `identifiers` contract).
pub fn identifiers(expr: &Expr) -> (Vec<String>, Vec<String>) {
    let mut variables = Vec::new();
    let mut functions = Vec::new();
    walk(expr, &mut variables, &mut functions);
    (variables, functions)
}

fn walk(expr: &Expr, variables: &mut Vec<String>, functions: &mut Vec<String>) {
    match expr {
        Expr::Number(_) | Expr::Str(_) => {}
        Expr::Variable { name, .. } => variables.push(name.clone()),
        Expr::Call { name, args, .. } => {
            functions.push(name.clone());
            for arg in args {
                walk(arg, variables, functions);
            }
        }
        Expr::BinaryOp { lhs, rhs, .. } => {
            walk(lhs, variables, functions);
            walk(rhs, variables, functions);
        }
        Expr::Pow { base, exp } => {
            walk(base, variables, functions);
            walk(exp, variables, functions);
        }
    }
}

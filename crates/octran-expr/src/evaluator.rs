//! Tree-walking evaluator for the expression AST (spec §4.2).

use std::collections::HashMap;
use std::fmt;

use crate::ast::{BinOp, Expr};
use crate::functions::{FunctionDispatcher, FunctionError};
use crate::value::{format_float, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// A bound variable's value was neither a float nor a string.
    CannotCastVariable(String),
    /// A variable had no binding in the table passed to `evaluate`.
    NoSuchVariable(String),
    /// Division by zero, direct or indirect.
    DivisionByZero,
    /// `^` applied where an operand was not a float.
    NonNumericExponent,
    /// An arithmetic operator other than `+` was applied to a string operand.
    NonAdditiveStringOperand,
    /// A function call failed (unknown function, bad arity, bad argument).
    Function(FunctionError),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CannotCastVariable(name) => write!(f, "cannot cast variable `{name}`"),
            Self::NoSuchVariable(name) => write!(f, "no such variable `{name}`"),
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::NonNumericExponent => write!(f, "`^` requires both operands to be numeric"),
            Self::NonAdditiveStringOperand => {
                write!(f, "only `+` is defined when an operand is a string")
            }
            Self::Function(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for EvalError {}

impl From<FunctionError> for EvalError {
    fn from(e: FunctionError) -> Self {
        Self::Function(e)
    }
}

/// Evaluate `expr` against a binding table and function dispatcher.
///
/// Evaluation is left-to-right, depth-first; function arguments are
/// evaluated before the call. There are no boolean operators, so there is
/// nothing to short-circuit.
pub fn evaluate(
    expr: &Expr,
    bindings: &HashMap<String, Value>,
    functions: &FunctionDispatcher,
) -> Result<Value, EvalError> {
    match expr {
        Expr::Number(n) => Ok(Value::Float(*n)),
        Expr::Str(s) => Ok(Value::Str(s.clone())),
        Expr::Variable { name, .. } => {
            let value = bindings
                .get(name)
                .ok_or_else(|| EvalError::NoSuchVariable(name.clone()))?;
            coerce_variable(name, value)
        }
        Expr::Call { name, args, .. } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(evaluate(arg, bindings, functions)?);
            }
            Ok(functions.call(name, &values)?)
        }
        Expr::BinaryOp { op, lhs, rhs } => {
            let lhs = evaluate(lhs, bindings, functions)?;
            let rhs = evaluate(rhs, bindings, functions)?;
            apply_binary(*op, lhs, rhs)
        }
        Expr::Pow { base, exp } => {
            let base = evaluate(base, bindings, functions)?;
            let exp = evaluate(exp, bindings, functions)?;
            let (base, exp) = match (base.as_float(), exp.as_float()) {
                (Some(b), Some(e)) => (b, e),
                _ => return Err(EvalError::NonNumericExponent),
            };
            Ok(Value::Float(base.powf(exp)))
        }
    }
}

/// Variables already carry only `Float`/`String` values in this
/// implementation (integral widening happens at parse time for literals
/// and inside function results), so this is a pass-through validation
/// rather than an active conversion.
fn coerce_variable(name: &str, value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Str(s) => Ok(Value::Str(s.clone())),
        #[allow(unreachable_patterns)]
        _ => Err(EvalError::CannotCastVariable(name.to_string())),
    }
}

fn apply_binary(op: BinOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    if op == BinOp::Add && (matches!(lhs, Value::Str(_)) || matches!(rhs, Value::Str(_))) {
        return Ok(Value::Str(format!("{}{}", display(&lhs), display(&rhs))));
    }

    let (l, r) = match (lhs.as_float(), rhs.as_float()) {
        (Some(l), Some(r)) => (l, r),
        _ => return Err(EvalError::NonAdditiveStringOperand),
    };

    let result = match op {
        BinOp::Add => l + r,
        BinOp::Sub => l - r,
        BinOp::Mul => l * r,
        BinOp::Div => {
            if r == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            l / r
        }
    };
    Ok(Value::Float(result))
}

fn display(v: &Value) -> String {
    match v {
        Value::Str(s) => s.clone(),
        Value::Float(f) => format_float(*f),
    }
}

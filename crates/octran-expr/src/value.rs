//! The evaluator's heterogeneous value type (spec §9 design note).
//!
//! Only `Float` and `String` are valid operand types -- integers widen to
//! float at every boundary (literal, variable, function result) rather
//! than existing as a distinct operand kind.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Float(f64),
    Str(String),
}

impl Value {
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            Value::Float(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s}"),
            Value::Float(v) => write!(f, "{}", format_float(*v)),
        }
    }
}

/// Format a float per spec §4.2: numbers without exponent notation where
/// exact, integers printed without a fractional part.
pub fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}

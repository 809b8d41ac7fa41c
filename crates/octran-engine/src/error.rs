//! Engine-surfaced errors: spec.md §7 categories 2, 8, 9.

use std::fmt;

use crate::tree::TreeError;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Category 2: the requested standardized path has no binding.
    PathNotFound(String),
    /// Category 8: every alternative of a rule was exhausted.
    NoAlternativeEvaluable { rule: String },
    /// Category 9: recursion through sub-rule references exceeded the
    /// configured depth bound.
    RecursionDepthExceeded { rule: String, max_depth: u32 },
    /// A lookup against the path tree itself failed.
    Tree(TreeError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PathNotFound(path) => write!(f, "no binding for path `{path}`"),
            Self::NoAlternativeEvaluable { rule } => {
                write!(f, "no alternative evaluable for rule `{rule}`")
            }
            Self::RecursionDepthExceeded { rule, max_depth } => {
                write!(f, "recursion depth exceeded ({max_depth}) while evaluating rule `{rule}`")
            }
            Self::Tree(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<TreeError> for EngineError {
    fn from(e: TreeError) -> Self {
        Self::Tree(e)
    }
}

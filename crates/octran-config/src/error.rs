//! Configuration errors: spec.md §7 category 1. Surfaced at construction;
//! fails startup.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Io { path: String, reason: String },
    Toml { path: String, reason: String },
    DuplicateRuleName(String),
    UnresolvedBindReference { path: String, rule: String },
    InvalidSubpath { path: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, reason } => write!(f, "failed to read {path}: {reason}"),
            Self::Toml { path, reason } => write!(f, "failed to parse {path}: {reason}"),
            Self::DuplicateRuleName(name) => write!(f, "duplicate rule name `{name}`"),
            Self::UnresolvedBindReference { path, rule } => {
                write!(f, "node `{path}` binds unknown rule `{rule}`")
            }
            Self::InvalidSubpath { path, reason } => write!(f, "invalid subpath at `{path}`: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

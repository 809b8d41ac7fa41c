//! Standardized-path tree (spec.md §4.4).
//!
//! A flat map from canonical path to a node record, plus an ordered
//! children list per node -- simpler than a pointer-linked tree and
//! sufficient for the read-only-after-build access pattern (spec.md §9
//! design note). Parent pointers are unnecessary.

use std::fmt;

use rustc_hash::FxHashMap;

use octran_common::{canonicalize, PathError, PathErrorKind};

/// A declared node in the source configuration's forest, before it has
/// been folded into the flat tree.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    /// Either absolute (leading `/`, or literally `root`/`root/...`) or
    /// relative to the enclosing node's full path.
    pub subpath: String,
    /// Bound only to the deepest node `subpath` resolves to.
    pub rule: Option<String>,
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(subpath: impl Into<String>) -> Self {
        Self {
            subpath: subpath.into(),
            rule: None,
            children: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    pub fn with_children(mut self, children: Vec<NodeSpec>) -> Self {
        self.children = children;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TreeError {
    /// A declared subpath was empty or had adjacent separators.
    InvalidSubpath { subpath: String, source: PathError },
    /// A lookup (`children`/`ruleOf`) addressed a path not in the tree.
    UnknownNode(String),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSubpath { subpath, source } => {
                write!(f, "invalid subpath {subpath:?}: {source}")
            }
            Self::UnknownNode(path) => write!(f, "no such node: {path}"),
        }
    }
}

impl std::error::Error for TreeError {}

const ROOT: &str = "root";

struct NodeRecord {
    rule: Option<String>,
    children: Vec<String>,
}

/// The standardized-path namespace: every node reachable from `root`,
/// indexed by canonical full path.
pub struct PathTree {
    nodes: FxHashMap<String, NodeRecord>,
}

impl PathTree {
    /// Build the tree from a declarative node forest (spec.md §4.4).
    pub fn build(forest: &[NodeSpec]) -> Result<Self, TreeError> {
        let mut tree = Self {
            nodes: FxHashMap::default(),
        };
        tree.nodes.insert(
            ROOT.to_string(),
            NodeRecord {
                rule: None,
                children: Vec::new(),
            },
        );
        for spec in forest {
            tree.insert_spec(spec, ROOT)?;
        }
        Ok(tree)
    }

    fn insert_spec(&mut self, spec: &NodeSpec, current_parent: &str) -> Result<(), TreeError> {
        let (is_absolute, segments) = split_subpath(&spec.subpath)?;
        let mut parent = if is_absolute { ROOT.to_string() } else { current_parent.to_string() };

        if segments.is_empty() {
            // A bare "/" or "root" subpath binds (if any) to the parent itself.
            if let Some(rule) = &spec.rule {
                self.bind(&parent, rule);
            }
            for child in &spec.children {
                self.insert_spec(child, &parent)?;
            }
            return Ok(());
        }

        let last = segments.len() - 1;
        for (i, segment) in segments.iter().enumerate() {
            let full_path = format!("{parent}/{segment}");
            self.ensure_node(&parent, &full_path);
            if i == last {
                if let Some(rule) = &spec.rule {
                    self.bind(&full_path, rule);
                }
            }
            parent = full_path;
        }

        for child in &spec.children {
            self.insert_spec(child, &parent)?;
        }
        Ok(())
    }

    fn ensure_node(&mut self, parent: &str, full_path: &str) {
        if !self.nodes.contains_key(full_path) {
            self.nodes.insert(
                full_path.to_string(),
                NodeRecord {
                    rule: None,
                    children: Vec::new(),
                },
            );
            self.nodes
                .get_mut(parent)
                .expect("parent was inserted before its child")
                .children
                .push(full_path.to_string());
        }
    }

    fn bind(&mut self, full_path: &str, rule: &str) {
        self.nodes
            .get_mut(full_path)
            .expect("node was just ensured")
            .rule = Some(rule.to_string());
    }

    /// Does the canonical path exist as a node?
    pub fn is_valid(&self, path: &str) -> bool {
        match canonicalize(path) {
            Ok(canonical) => self.nodes.contains_key(&canonical),
            Err(_) => false,
        }
    }

    /// The children of `path`, in insertion order.
    pub fn children(&self, path: &str) -> Result<&[String], TreeError> {
        let canonical = canonicalize(path).map_err(|_| TreeError::UnknownNode(path.to_string()))?;
        self.nodes
            .get(&canonical)
            .map(|n| n.children.as_slice())
            .ok_or_else(|| TreeError::UnknownNode(canonical))
    }

    /// The rule name bound to the exact node at `path`.
    pub fn rule_of(&self, path: &str) -> Result<Option<&str>, TreeError> {
        let canonical = canonicalize(path).map_err(|_| TreeError::UnknownNode(path.to_string()))?;
        self.nodes
            .get(&canonical)
            .map(|n| n.rule.as_deref())
            .ok_or_else(|| TreeError::UnknownNode(canonical))
    }

    /// An indented textual representation of the subtree rooted at
    /// `root` -- purely observational (spec.md §4.4).
    pub fn print(&self, root: &str) -> Result<String, TreeError> {
        let canonical = canonicalize(root).map_err(|_| TreeError::UnknownNode(root.to_string()))?;
        if !self.nodes.contains_key(&canonical) {
            return Err(TreeError::UnknownNode(canonical));
        }
        let mut out = String::new();
        self.print_node(&canonical, 0, &mut out);
        Ok(out)
    }

    fn print_node(&self, path: &str, depth: usize, out: &mut String) {
        let label = path.rsplit('/').next().unwrap_or(path);
        let node = &self.nodes[path];
        match &node.rule {
            Some(rule) => out.push_str(&format!("{}{} -> {}\n", "  ".repeat(depth), label, rule)),
            None => out.push_str(&format!("{}{}\n", "  ".repeat(depth), label)),
        }
        for child in &node.children {
            self.print_node(child, depth + 1, out);
        }
    }
}

/// Split a declared subpath into `(is_absolute, segments)`. Absolute
/// subpaths start with `/` or are exactly `root`/`root/...`; everything
/// else is relative to the enclosing node. Adjacent separators are an
/// error, matching the canonicalization rules in spec.md §3.
fn split_subpath(subpath: &str) -> Result<(bool, Vec<String>), TreeError> {
    let trimmed = subpath.trim();
    let (is_absolute, body) = if let Some(rest) = trimmed.strip_prefix('/') {
        (true, rest)
    } else if trimmed == ROOT {
        (true, "")
    } else if let Some(rest) = trimmed.strip_prefix("root/") {
        (true, rest)
    } else {
        (false, trimmed)
    };

    let body = body.trim_matches('/');
    if body.is_empty() {
        return Ok((is_absolute, Vec::new()));
    }

    let mut segments = Vec::new();
    for segment in body.split('/') {
        if segment.is_empty() {
            return Err(TreeError::InvalidSubpath {
                subpath: subpath.to_string(),
                source: PathError::new(PathErrorKind::AdjacentSeparators),
            });
        }
        segments.push(segment.to_string());
    }
    Ok((is_absolute, segments))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_6_nested_absolute_then_relative_binding() {
        let forest = vec![NodeSpec::new("/a").with_children(vec![NodeSpec::new("b/c").with_rule("r")])];
        let tree = PathTree::build(&forest).unwrap();

        assert!(tree.is_valid("root"));
        assert!(tree.is_valid("root/a"));
        assert!(tree.is_valid("root/a/b"));
        assert!(tree.is_valid("root/a/b/c"));

        assert_eq!(tree.rule_of("root/a/b/c").unwrap(), Some("r"));
        assert_eq!(tree.rule_of("root/a/b").unwrap(), None);
    }

    #[test]
    fn children_are_returned_in_insertion_order() {
        let forest = vec![NodeSpec::new("/a"), NodeSpec::new("/b"), NodeSpec::new("/c")];
        let tree = PathTree::build(&forest).unwrap();
        assert_eq!(tree.children("root").unwrap(), &["root/a", "root/b", "root/c"]);
    }

    #[test]
    fn rule_of_unknown_path_is_an_error() {
        let tree = PathTree::build(&[]).unwrap();
        assert!(tree.rule_of("root/nowhere").is_err());
    }

    #[test]
    fn duplicate_declarations_of_the_same_subpath_are_idempotent() {
        let forest = vec![NodeSpec::new("/a/b"), NodeSpec::new("/a/c")];
        let tree = PathTree::build(&forest).unwrap();
        // "a" is created once and shared by both declarations.
        assert_eq!(tree.children("root").unwrap(), &["root/a"]);
        assert_eq!(tree.children("root/a").unwrap(), &["root/a/b", "root/a/c"]);
    }

    #[test]
    fn print_renders_indented_subtree() {
        let forest = vec![NodeSpec::new("/a").with_children(vec![NodeSpec::new("b").with_rule("r")])];
        let tree = PathTree::build(&forest).unwrap();
        let rendered = tree.print("root").unwrap();
        assert!(rendered.contains("a\n"));
        assert!(rendered.contains("b -> r\n"));
    }
}

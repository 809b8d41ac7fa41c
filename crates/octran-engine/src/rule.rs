//! Rule ("transformation") and rule registry types (spec.md §3).

use rustc_hash::FxHashMap;

use crate::leaf::LeafDescriptor;

/// A named, reusable translation: an ordered list of semantically
/// equivalent alternative expressions, plus the leaf descriptors those
/// expressions may reference.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    /// Non-empty; the engine selects the first alternative it can
    /// fully evaluate for the current target.
    pub alternatives: Vec<String>,
    pub leaves: Vec<LeafDescriptor>,
}

impl Rule {
    pub fn new(name: impl Into<String>, alternatives: Vec<String>, leaves: Vec<LeafDescriptor>) -> Self {
        Self {
            name: name.into(),
            alternatives,
            leaves,
        }
    }

    /// Leaves keyed by local name. A descriptor with an empty local name
    /// is skipped with a warning (spec.md §4.5.a) rather than rejected at
    /// construction -- the rule as a whole is still usable.
    pub fn leaves_by_name(&self) -> FxHashMap<&str, &LeafDescriptor> {
        self.leaves
            .iter()
            .filter(|leaf| {
                if leaf.local_name.is_empty() {
                    tracing::warn!(rule = %self.name, "skipping leaf descriptor with no local name");
                    false
                } else {
                    true
                }
            })
            .map(|leaf| (leaf.local_name.as_str(), leaf))
            .collect()
    }
}

/// A flat, name-keyed map of all rules known to the engine. Rule names
/// are globally unique (spec.md §3 invariant); enforced at construction
/// by `octran-config`, not here.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: FxHashMap<String, Rule>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self {
            rules: FxHashMap::default(),
        }
    }

    pub fn insert(&mut self, rule: Rule) {
        self.rules.insert(rule.name.clone(), rule);
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_by_name_skips_unnamed_descriptors() {
        let rule = Rule::new(
            "r",
            vec!["x".to_string()],
            vec![
                LeafDescriptor::new("a", vec!["1.3.6.1".to_string()], "int"),
                LeafDescriptor::new("", vec!["1.3.6.2".to_string()], "int"),
            ],
        );
        let by_name = rule.leaves_by_name();
        assert_eq!(by_name.len(), 1);
        assert!(by_name.contains_key("a"));
    }

    #[test]
    fn registry_round_trips_by_name() {
        let mut registry = RuleRegistry::new();
        registry.insert(Rule::new("r", vec!["1".to_string()], vec![]));
        assert!(registry.get("r").is_some());
        assert!(registry.get("missing").is_none());
    }
}

//! The translation engine: `evaluate`/`eval_rule` (spec.md §4.5).

use std::collections::HashMap;

use rustc_hash::FxHashSet;

use octran_common::canonicalize;
use octran_expr::{evaluate as evaluate_ast, identifiers, parse, FunctionDispatcher, Value};

use crate::error::EngineError;
use crate::resolver::LeafResolver;
use crate::rule::RuleRegistry;
use crate::tree::PathTree;
use crate::vendor::VendorFilter;

const DEFAULT_MAX_DEPTH: u32 = 64;

/// Orchestrates path lookup, rule selection, variable resolution
/// (through leaves or sub-rules) and AST evaluation. Everything it
/// holds is immutable after construction and may be shared across
/// callers without synchronization (spec.md §5).
pub struct TranslationEngine<R: LeafResolver> {
    tree: PathTree,
    rules: RuleRegistry,
    vendor_filter: VendorFilter,
    functions: FunctionDispatcher,
    resolver: R,
    max_depth: u32,
}

impl<R: LeafResolver> TranslationEngine<R> {
    pub fn new(tree: PathTree, rules: RuleRegistry, vendor_filter: VendorFilter, resolver: R) -> Self {
        Self {
            tree,
            rules,
            vendor_filter,
            functions: FunctionDispatcher::standard(),
            resolver,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn tree(&self) -> &PathTree {
        &self.tree
    }

    /// Canonicalize `path`, look up its binding, and evaluate the bound
    /// rule for `target`/`vendor`.
    pub fn evaluate(&self, path: &str, target: &str, vendor: &str) -> Result<Value, EngineError> {
        let canonical = canonicalize(path).map_err(|_| EngineError::PathNotFound(path.to_string()))?;
        if !self.tree.is_valid(&canonical) {
            return Err(EngineError::PathNotFound(canonical));
        }
        let rule_name = self
            .tree
            .rule_of(&canonical)?
            .ok_or_else(|| EngineError::PathNotFound(canonical.clone()))?
            .to_string();

        let mut visited = FxHashSet::default();
        self.eval_rule(&rule_name, target, vendor, 0, &mut visited)
    }

    /// Evaluate the first alternative of `rule_name` that can be fully
    /// resolved and evaluated for `target`/`vendor`.
    pub fn eval_rule(
        &self,
        rule_name: &str,
        target: &str,
        vendor: &str,
        depth: u32,
        visited: &mut FxHashSet<String>,
    ) -> Result<Value, EngineError> {
        if depth >= self.max_depth {
            return Err(EngineError::RecursionDepthExceeded {
                rule: rule_name.to_string(),
                max_depth: self.max_depth,
            });
        }
        if !visited.insert(rule_name.to_string()) {
            return Err(EngineError::RecursionDepthExceeded {
                rule: rule_name.to_string(),
                max_depth: self.max_depth,
            });
        }
        let result = self.eval_rule_inner(rule_name, target, vendor, depth, visited);
        visited.remove(rule_name);
        result
    }

    fn eval_rule_inner(
        &self,
        rule_name: &str,
        target: &str,
        vendor: &str,
        depth: u32,
        visited: &mut FxHashSet<String>,
    ) -> Result<Value, EngineError> {
        let Some(rule) = self.rules.get(rule_name) else {
            return Err(EngineError::NoAlternativeEvaluable {
                rule: rule_name.to_string(),
            });
        };
        let leaves_by_name = rule.leaves_by_name();

        'alternatives: for alternative in &rule.alternatives {
            let expr = match parse(alternative) {
                Ok(expr) => expr,
                Err(e) => {
                    tracing::warn!(rule = rule_name, error = %e, "parse error, skipping alternative");
                    continue;
                }
            };

            let (variables, functions) = identifiers(&expr);

            let mut unknown_function = false;
            for name in &functions {
                if !self.functions.has(name) {
                    tracing::warn!(rule = rule_name, function = name.as_str(), "unknown function, skipping alternative");
                    unknown_function = true;
                    break;
                }
            }
            if unknown_function {
                continue;
            }

            let mut bindings: HashMap<String, Value> = HashMap::new();
            for name in &variables {
                if bindings.contains_key(name) {
                    continue;
                }

                if let Some(leaf) = leaves_by_name.get(name.as_str()) {
                    if !self.vendor_filter.can_resolve(leaf, vendor) {
                        tracing::info!(rule = rule_name, leaf = name.as_str(), vendor, "leaf not admissible for vendor, skipping alternative");
                        continue 'alternatives;
                    }
                    match self.resolver.resolve(leaf, target) {
                        Ok(raw) => {
                            bindings.insert(name.clone(), Value::Str(raw));
                        }
                        Err(e) => {
                            tracing::warn!(rule = rule_name, leaf = name.as_str(), error = %e, "resolver error, skipping alternative");
                            continue 'alternatives;
                        }
                    }
                } else if self.rules.get(name).is_some() {
                    match self.eval_rule(name, target, vendor, depth + 1, visited) {
                        Ok(value) => {
                            bindings.insert(name.clone(), value);
                        }
                        Err(e @ EngineError::RecursionDepthExceeded { .. }) => return Err(e),
                        Err(e) => {
                            tracing::warn!(rule = rule_name, subrule = name.as_str(), error = %e, "sub-rule failed, skipping alternative");
                            continue 'alternatives;
                        }
                    }
                } else {
                    tracing::warn!(rule = rule_name, variable = name.as_str(), "unknown variable, skipping alternative");
                    continue 'alternatives;
                }
            }

            match evaluate_ast(&expr, &bindings, &self.functions) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::warn!(rule = rule_name, error = %e, "evaluation error, skipping alternative");
                    continue;
                }
            }
        }

        Err(EngineError::NoAlternativeEvaluable {
            rule: rule_name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::LeafDescriptor;
    use crate::resolver::{LeafResolver, ResolverError};
    use crate::rule::Rule;
    use crate::tree::NodeSpec;
    use rustc_hash::FxHashMap;

    struct FixedResolver(FxHashMap<String, String>);

    impl LeafResolver for FixedResolver {
        fn resolve(&self, leaf: &LeafDescriptor, _target: &str) -> Result<String, ResolverError> {
            self.0.get(&leaf.local_name).cloned().ok_or_else(|| ResolverError {
                leaf: leaf.local_name.clone(),
                reason: "no sample registered".to_string(),
            })
        }
    }

    fn vendor_filter() -> VendorFilter {
        let mut sub_ids = FxHashMap::default();
        sub_ids.insert("cisco".to_string(), "9".to_string());
        sub_ids.insert("aruba".to_string(), "14823".to_string());
        VendorFilter::new("1.3.6.1.4.1", sub_ids)
    }

    #[test]
    fn scenario_1_system_up_time() {
        let mut rules = RuleRegistry::new();
        rules.insert(Rule::new(
            "system_up_time",
            vec!["to_int(system_up_time_100) / 100".to_string()],
            vec![LeafDescriptor::new("system_up_time_100", vec!["1.3.6.1.2.1.1.3.0".to_string()], "int")],
        ));
        let tree = PathTree::build(&[NodeSpec::new("/system_up_time").with_rule("system_up_time")]).unwrap();

        let mut samples = FxHashMap::default();
        samples.insert("system_up_time_100".to_string(), "2000000000".to_string());
        let engine = TranslationEngine::new(tree, rules, vendor_filter(), FixedResolver(samples));

        let result = engine.evaluate("/system_up_time", "box1", "cisco").unwrap();
        assert_eq!(result, Value::Float(2.0e7));
    }

    #[test]
    fn first_evaluable_alternative_wins_and_later_leaves_are_never_touched() {
        let mut rules = RuleRegistry::new();
        rules.insert(Rule::new(
            "r",
            vec!["broken_fn()".to_string(), "ok_leaf".to_string()],
            vec![LeafDescriptor::new("ok_leaf", vec!["1.3.6.1.2.1.9.9".to_string()], "str")],
        ));
        let tree = PathTree::build(&[NodeSpec::new("/r").with_rule("r")]).unwrap();
        let mut samples = FxHashMap::default();
        samples.insert("ok_leaf".to_string(), "hello".to_string());
        let engine = TranslationEngine::new(tree, rules, vendor_filter(), FixedResolver(samples));

        let result = engine.evaluate("/r", "box1", "cisco").unwrap();
        assert_eq!(result, Value::Str("hello".to_string()));
    }

    #[test]
    fn scenario_5_vendor_inadmissible_leaf_reports_no_alternative_not_vendor_error() {
        let mut rules = RuleRegistry::new();
        rules.insert(Rule::new(
            "r",
            vec!["cisco_only".to_string()],
            vec![LeafDescriptor::new("cisco_only", vec!["1.3.6.1.4.1.9.1.1".to_string()], "str")],
        ));
        let tree = PathTree::build(&[NodeSpec::new("/r").with_rule("r")]).unwrap();
        let engine = TranslationEngine::new(tree, rules, vendor_filter(), FixedResolver(FxHashMap::default()));

        let err = engine.evaluate("/r", "box1", "aruba").unwrap_err();
        assert_eq!(err, EngineError::NoAlternativeEvaluable { rule: "r".to_string() });
    }

    #[test]
    fn local_leaf_name_takes_precedence_over_a_same_named_top_level_rule() {
        let mut rules = RuleRegistry::new();
        rules.insert(Rule::new(
            "shadowed",
            vec!["'from sub-rule'".to_string()],
            vec![],
        ));
        rules.insert(Rule::new(
            "outer",
            vec!["shadowed".to_string()],
            vec![LeafDescriptor::new("shadowed", vec!["1.3.6.1.2.1.1.1".to_string()], "str")],
        ));
        let tree = PathTree::build(&[NodeSpec::new("/outer").with_rule("outer")]).unwrap();
        let mut samples = FxHashMap::default();
        samples.insert("shadowed".to_string(), "from leaf".to_string());
        let engine = TranslationEngine::new(tree, rules, vendor_filter(), FixedResolver(samples));

        let result = engine.evaluate("/outer", "box1", "cisco").unwrap();
        assert_eq!(result, Value::Str("from leaf".to_string()));
    }

    #[test]
    fn direct_self_reference_is_a_recursion_error_not_an_infinite_loop() {
        let mut rules = RuleRegistry::new();
        rules.insert(Rule::new("cyclic", vec!["cyclic".to_string()], vec![]));
        let tree = PathTree::build(&[NodeSpec::new("/c").with_rule("cyclic")]).unwrap();
        let engine = TranslationEngine::new(tree, rules, vendor_filter(), FixedResolver(FxHashMap::default()));

        let err = engine.evaluate("/c", "box1", "cisco").unwrap_err();
        assert!(matches!(err, EngineError::RecursionDepthExceeded { .. }));
    }

    #[test]
    fn depth_bound_catches_long_non_cyclic_chains() {
        let mut rules = RuleRegistry::new();
        for i in 0..100 {
            let alt = if i == 99 { "1".to_string() } else { format!("r{}", i + 1) };
            rules.insert(Rule::new(format!("r{i}"), vec![alt], vec![]));
        }
        let tree = PathTree::build(&[NodeSpec::new("/r").with_rule("r0")]).unwrap();
        let engine = TranslationEngine::new(tree, rules, vendor_filter(), FixedResolver(FxHashMap::default()))
            .with_max_depth(10);

        let err = engine.evaluate("/r", "box1", "cisco").unwrap_err();
        assert!(matches!(err, EngineError::RecursionDepthExceeded { max_depth: 10, .. }));
    }

    #[test]
    fn path_not_found_for_an_unbound_node() {
        let tree = PathTree::build(&[NodeSpec::new("/unbound")]).unwrap();
        let engine = TranslationEngine::new(tree, RuleRegistry::new(), vendor_filter(), FixedResolver(FxHashMap::default()));
        assert!(matches!(engine.evaluate("/unbound", "box1", "cisco"), Err(EngineError::PathNotFound(_))));
        assert!(matches!(engine.evaluate("/nowhere", "box1", "cisco"), Err(EngineError::PathNotFound(_))));
    }
}

//! Multi-file config loading, merge, and construction-time validation
//! (spec.md §6, §7 category 1).

use std::collections::BTreeMap;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use octran_engine::{LeafDescriptor, NodeSpec, PathTree, Rule, RuleRegistry, TreeError, VendorFilter};

use crate::error::ConfigError;
use crate::model::{LeafConfig, NodeConfig, RuleConfig};

/// A single config file may declare any subset of nodes, rules, and
/// vendor identifiers; `load_files` merges any number of these.
#[derive(Debug, Deserialize, Default)]
struct ConfigDoc {
    #[serde(default, rename = "node")]
    nodes: Vec<NodeConfig>,
    #[serde(default, rename = "rule")]
    rules: Vec<RuleConfig>,
    vendor_root: Option<String>,
    #[serde(default)]
    sub_ids: BTreeMap<String, String>,
}

/// The fully constructed, immutable engine inputs.
pub struct LoadedConfig {
    pub tree: PathTree,
    pub rules: RuleRegistry,
    pub vendor_filter: VendorFilter,
}

/// Load, merge, and validate one or more TOML config files.
pub fn load_files(paths: &[impl AsRef<Path>]) -> Result<LoadedConfig, ConfigError> {
    let mut all_nodes = Vec::new();
    let mut all_rules = Vec::new();
    let mut vendor_root: Option<String> = None;
    let mut sub_ids = BTreeMap::new();

    for path in paths {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: display.clone(),
            reason: e.to_string(),
        })?;
        let doc: ConfigDoc = toml::from_str(&content).map_err(|e| ConfigError::Toml {
            path: display,
            reason: e.to_string(),
        })?;
        all_nodes.extend(doc.nodes);
        all_rules.extend(doc.rules);
        if let Some(root) = doc.vendor_root {
            vendor_root = Some(root);
        }
        sub_ids.extend(doc.sub_ids);
    }

    validate_unique_rule_names(&all_rules)?;
    validate_bind_references(&all_nodes, &all_rules)?;

    let rules = build_registry(all_rules);
    let tree = build_tree(&all_nodes)?;
    let vendor_filter = VendorFilter::new(vendor_root.unwrap_or_default(), sub_ids.into_iter().collect());

    Ok(LoadedConfig { tree, rules, vendor_filter })
}

fn validate_unique_rule_names(rules: &[RuleConfig]) -> Result<(), ConfigError> {
    let mut seen = FxHashMap::default();
    for rule in rules {
        if seen.insert(rule.name.clone(), ()).is_some() {
            return Err(ConfigError::DuplicateRuleName(rule.name.clone()));
        }
    }
    Ok(())
}

fn validate_bind_references(nodes: &[NodeConfig], rules: &[RuleConfig]) -> Result<(), ConfigError> {
    let rule_names: FxHashMap<&str, ()> = rules.iter().map(|r| (r.name.as_str(), ())).collect();
    for node in nodes {
        check_bind(node, &rule_names)?;
    }
    Ok(())
}

fn check_bind(node: &NodeConfig, rule_names: &FxHashMap<&str, ()>) -> Result<(), ConfigError> {
    if let Some(bind) = &node.bind {
        if !rule_names.contains_key(bind.as_str()) {
            return Err(ConfigError::UnresolvedBindReference {
                path: node.subpath.clone(),
                rule: bind.clone(),
            });
        }
    }
    for child in &node.children {
        check_bind(child, rule_names)?;
    }
    Ok(())
}

fn build_registry(rules: Vec<RuleConfig>) -> RuleRegistry {
    let mut registry = RuleRegistry::new();
    for rule in rules {
        let leaves = rule.leaves.into_iter().map(leaf_from_config).collect();
        registry.insert(Rule::new(rule.name, rule.alternatives, leaves));
    }
    registry
}

fn leaf_from_config(leaf: LeafConfig) -> LeafDescriptor {
    LeafDescriptor::new(leaf.name, leaf.vendor_paths, leaf.data_type).with_samples(leaf.samples)
}

fn build_tree(nodes: &[NodeConfig]) -> Result<PathTree, ConfigError> {
    let specs: Vec<NodeSpec> = nodes.iter().map(spec_from_config).collect();
    PathTree::build(&specs).map_err(|e| match e {
        TreeError::InvalidSubpath { subpath, source } => ConfigError::InvalidSubpath {
            path: subpath,
            reason: source.to_string(),
        },
        TreeError::UnknownNode(path) => ConfigError::InvalidSubpath {
            path,
            reason: "unknown node".to_string(),
        },
    })
}

fn spec_from_config(node: &NodeConfig) -> NodeSpec {
    let mut spec = NodeSpec::new(node.subpath.clone());
    if let Some(bind) = &node.bind {
        spec = spec.with_rule(bind.clone());
    }
    spec.with_children(node.children.iter().map(spec_from_config).collect())
}

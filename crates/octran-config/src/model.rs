//! Serde models for the declarative documents (spec.md §6): path
//! mappings, rules, and leaf descriptors. `loader.rs` merges these
//! across files through its own `ConfigDoc`, so only the per-item
//! structs live here.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct NodeConfig {
    pub subpath: String,
    #[serde(default)]
    pub bind: Option<String>,
    #[serde(default)]
    pub children: Vec<NodeConfig>,
}

#[derive(Debug, Deserialize)]
pub struct RuleConfig {
    pub name: String,
    pub alternatives: Vec<String>,
    #[serde(default, rename = "leaf")]
    pub leaves: Vec<LeafConfig>,
}

#[derive(Debug, Deserialize)]
pub struct LeafConfig {
    pub name: String,
    pub vendor_paths: Vec<String>,
    #[serde(default = "default_data_type")]
    pub data_type: String,
    #[serde(default)]
    pub samples: Vec<String>,
}

fn default_data_type() -> String {
    "string".to_string()
}

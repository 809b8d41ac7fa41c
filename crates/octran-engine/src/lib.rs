pub mod engine;
pub mod error;
pub mod leaf;
pub mod resolver;
pub mod rule;
pub mod tree;
pub mod vendor;

pub use engine::TranslationEngine;
pub use error::EngineError;
pub use leaf::LeafDescriptor;
pub use resolver::{LeafResolver, ResolverError, SampleResolver};
pub use rule::{Rule, RuleRegistry};
pub use tree::{NodeSpec, PathTree, TreeError};
pub use vendor::VendorFilter;

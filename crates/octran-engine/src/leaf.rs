//! Leaf descriptor ("noc path") types (spec.md §3).

/// The vendor-specific addressing of a raw value the engine ultimately
/// reads, plus a declared type and optional samples for a resolver
/// stand-in.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafDescriptor {
    /// Unique within its enclosing rule.
    pub local_name: String,
    /// Ordered, preference-first list of vendor-path strings. Treated as
    /// equivalent by the evaluator; order matters only to the vendor
    /// filter and the sample resolver's "first sample" fallback.
    pub vendor_paths: Vec<String>,
    pub data_type: String,
    pub samples: Vec<String>,
}

impl LeafDescriptor {
    pub fn new(local_name: impl Into<String>, vendor_paths: Vec<String>, data_type: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            vendor_paths,
            data_type: data_type.into(),
            samples: Vec::new(),
        }
    }

    pub fn with_samples(mut self, samples: Vec<String>) -> Self {
        self.samples = samples;
        self
    }
}

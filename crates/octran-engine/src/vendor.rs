//! Vendor-admissibility filter (spec.md §4.5).

use rustc_hash::FxHashMap;

use crate::leaf::LeafDescriptor;

/// A shared vendor-root prefix and a mapping from vendor name to its
/// enterprise sub-identifier (spec.md §3).
#[derive(Debug, Clone)]
pub struct VendorFilter {
    vendor_root: String,
    sub_ids: FxHashMap<String, String>,
}

impl VendorFilter {
    pub fn new(vendor_root: impl Into<String>, sub_ids: FxHashMap<String, String>) -> Self {
        Self {
            vendor_root: vendor_root.into(),
            sub_ids,
        }
    }

    /// Is `leaf` admissible for `vendor`?
    ///
    /// A vendor-neutral path (one that doesn't start with the vendor
    /// root) is always admissible. A vendor-rooted path is admissible
    /// only if it is scoped to this vendor's sub-identifier -- and if
    /// the target vendor is unknown to the filter, that single path is
    /// simply not admissible; evaluation falls through to the leaf's
    /// next vendor path rather than erroring immediately.
    pub fn can_resolve(&self, leaf: &LeafDescriptor, vendor: &str) -> bool {
        leaf.vendor_paths.iter().any(|path| self.path_admits(path, vendor))
    }

    fn path_admits(&self, path: &str, vendor: &str) -> bool {
        if !path.starts_with(&self.vendor_root) {
            return true;
        }
        let Some(sub_id) = self.sub_ids.get(vendor) else {
            return false;
        };
        let scoped = format!("{}.{}", self.vendor_root, sub_id);
        path == scoped || path.starts_with(&format!("{scoped}."))
    }
}

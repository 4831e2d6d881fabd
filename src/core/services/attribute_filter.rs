use std::collections::BTreeSet;

use crate::core::models::attributes::AttributeMap;

/// Drops excluded fields before anything else touches the attributes.
pub struct AttributeFilter;

impl AttributeFilter {
    /// Copy of `attributes` without the keys listed in `excluded`.
    ///
    /// Excluded keys that are not present are ignored.
    pub fn filter(&self, attributes: &AttributeMap, excluded: &BTreeSet<String>) -> AttributeMap {
        attributes
            .iter()
            .filter(|(key, _)| !excluded.contains(key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

//! Resource tag maps.

use std::collections::BTreeMap;

/// Tags attached to a cloud resource, ordered by key.
pub type Tags = BTreeMap<String, String>;

/// Merge resource specific tags over the caller's base tags.
///
/// Keys from both maps are kept, `overrides` wins on conflict. Neither
/// input is modified.
pub fn merge_tags(base: &Tags, overrides: &Tags) -> Tags {
    let mut merged = base.clone();
    merged.extend(
        overrides
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    merged
}

/// A single `Name` tag.
pub fn name_tag(name: impl Into<String>) -> Tags {
    Tags::from([("Name".to_string(), name.into())])
}

//! Precedence-based merging of raw mappings.
//!
//! Nested mappings are merged recursively; every other value, sequences
//! included, is replaced entirely by the higher-precedence source.

use serde_json::Value;

use super::Mapping;

/// Merges `overlay` into `base`, with `overlay` winning on conflicts.
pub fn deep_merge(base: &mut Mapping, overlay: Mapping) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Object(base_map)), Value::Object(overlay_map)) => {
                deep_merge(base_map, overlay_map);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Folds `layers` into one mapping, lowest precedence first.
pub fn merge_all<I>(layers: I) -> Mapping
where
    I: IntoIterator<Item = Mapping>,
{
    layers.into_iter().fold(Mapping::new(), |mut merged, layer| {
        deep_merge(&mut merged, layer);
        merged
    })
}

/// Merges `value` at a key path, creating intermediate mappings as needed.
///
/// A non-mapping value sitting on the path is replaced by a mapping.
pub fn merge_at_path(mapping: &mut Mapping, path: &[String], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        if let Value::Object(overlay) = value {
            deep_merge(mapping, overlay);
        }
        return;
    };

    if rest.is_empty() {
        match (mapping.get_mut(first), value) {
            (Some(Value::Object(base)), Value::Object(overlay)) => deep_merge(base, overlay),
            (_, value) => {
                mapping.insert(first.clone(), value);
            }
        }
        return;
    }

    if !matches!(mapping.get(first), Some(Value::Object(_))) {
        mapping.insert(first.clone(), Value::Object(Mapping::new()));
    }

    if let Some(Value::Object(nested)) = mapping.get_mut(first) {
        merge_at_path(nested, rest, value);
    }
}

/// Looks up a dotted key path (`db.host`) in a mapping.
pub fn lookup<'a>(mapping: &'a Mapping, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = mapping.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

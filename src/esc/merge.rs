//! Deep, right-biased merge of property documents with dotted-key expansion.
//!
//! A top-level key such as `"db.credentials.user"` is a path through nested maps, so
//! `{"a.b": v}` merges exactly like `{"a": {"b": v}}`. Keys nested inside map values are taken
//! literally.
//!
//! Path segments are produced by a plain split on `.`: leading, trailing or repeated separators
//! yield empty-string segments (`".a"` is the path `"" -> "a"`), and the empty key is the single
//! segment `""`.

use super::value::{PropertyMap, PropertyValue};

const SEPARATOR: char = '.';

/// Merge `overlay` on top of `base` into a fresh document.
///
/// Every entry of `base` is inserted first, then every entry of `overlay`, so overlapping leaves
/// take the overlay's value. A map landing on an existing map is merged recursively; any other
/// combination replaces the node. Neither input is modified.
pub fn merge_maps(base: &PropertyMap, overlay: &PropertyMap) -> PropertyMap {
    let mut merged = PropertyMap::new();
    for (key, value) in base.iter().chain(overlay.iter()) {
        let path: Vec<&str> = key.split(SEPARATOR).collect();
        insert_path(&mut merged, &path, value.clone());
    }
    merged
}

fn insert_path(map: &mut PropertyMap, path: &[&str], value: PropertyValue) {
    match path {
        [] => {}
        [leaf] => insert_node(map, leaf, value),
        [head, rest @ ..] => {
            let node =
                map.entry((*head).to_string()).or_insert_with(|| PropertyValue::Map(PropertyMap::new()));
            if !matches!(node, PropertyValue::Map(_)) {
                *node = PropertyValue::Map(PropertyMap::new());
            }
            if let PropertyValue::Map(child) = node {
                insert_path(child, rest, value);
            }
        }
    }
}

fn insert_node(map: &mut PropertyMap, key: &str, value: PropertyValue) {
    match value {
        PropertyValue::Map(incoming) => match map.get_mut(key) {
            Some(PropertyValue::Map(existing)) => {
                for (child_key, child_value) in incoming {
                    insert_node(existing, &child_key, child_value);
                }
            }
            _ => {
                map.insert(key.to_string(), PropertyValue::Map(incoming));
            }
        },
        value => {
            map.insert(key.to_string(), value);
        }
    }
}

//! JSON merge patch (RFC 7386) creation and application.

use serde_json::Map;
use serde_json::Value;

/// Minimal merge patch turning `original` into `modified`
///
/// Returns an empty object when both are equal. Arrays are replaced wholesale.
pub fn create_merge_patch(
    original: &Value,
    modified: &Value,
) -> Value {
    match (original, modified) {
        (Value::Object(orig), Value::Object(modi)) => {
            let mut patch = Map::new();
            for (key, orig_value) in orig {
                match modi.get(key) {
                    None => {
                        patch.insert(key.clone(), Value::Null);
                    }
                    Some(mod_value) if mod_value != orig_value => {
                        let diff = match (orig_value, mod_value) {
                            (Value::Object(_), Value::Object(_)) => create_merge_patch(orig_value, mod_value),
                            _ => mod_value.clone(),
                        };
                        patch.insert(key.clone(), diff);
                    }
                    Some(_) => {}
                }
            }
            for (key, mod_value) in modi {
                if !orig.contains_key(key) {
                    patch.insert(key.clone(), mod_value.clone());
                }
            }
            Value::Object(patch)
        }
        _ => modified.clone(),
    }
}

/// Applies a merge patch to `target` in place
pub fn apply_merge_patch(
    target: &mut Value,
    patch: &Value,
) {
    let Value::Object(patch_map) = patch else {
        *target = patch.clone();
        return;
    };

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(target_map) = target {
        for (key, value) in patch_map {
            if value.is_null() {
                target_map.remove(key);
            } else {
                apply_merge_patch(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}

pub fn is_empty_patch(patch: &Value) -> bool {
    matches!(patch, Value::Object(map) if map.is_empty())
}

//! Layer merging for config values.
//!
//! Tables merge key by key; every other value, arrays included, is taken
//! whole from the later layer.

use serde_json::Value;

/// Merge `overlay` onto `base`.
///
/// A `null` in the overlay replaces whatever the base held.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                let value = match merged.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                merged.insert(key, value);
            }
            Value::Object(merged)
        }
        (_, overlay) => overlay,
    }
}

/// Fold layers left to right; the last layer has the final say.
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_override() {
        let result = deep_merge(json!({"strict": false}), json!({"strict": true}));
        assert_eq!(result["strict"], true);
    }

    #[test]
    fn test_object_deep_merge() {
        let base = json!({
            "check": {
                "strict": false,
                "index_name": "PyPI"
            }
        });
        let overlay = json!({
            "check": {
                "strict": true
            }
        });
        let result = deep_merge(base, overlay);

        assert_eq!(result["check"]["strict"], true);
        assert_eq!(result["check"]["index_name"], "PyPI");
    }

    #[test]
    fn test_array_replace() {
        let base = json!({"patterns": ["dist/*", "build/*"]});
        let overlay = json!({"patterns": ["wheelhouse/*"]});
        let result = deep_merge(base, overlay);

        assert_eq!(result["patterns"], json!(["wheelhouse/*"]));
    }

    #[test]
    fn test_add_new_key() {
        let result = deep_merge(json!({"a": 1}), json!({"b": 2}));

        assert_eq!(result["a"], 1);
        assert_eq!(result["b"], 2);
    }

    #[test]
    fn test_null_override() {
        let result = deep_merge(json!({"index_name": "PyPI"}), json!({"index_name": null}));
        assert!(result["index_name"].is_null());
    }

    #[test]
    fn test_merge_layers() {
        let builtin = json!({"strict": false, "index_name": "PyPI"});
        let file = json!({"index_name": "TestPyPI"});
        let cli = json!({"strict": true});

        let result = merge_layers(vec![builtin, file, cli]);

        assert_eq!(result["strict"], true);
        assert_eq!(result["index_name"], "TestPyPI");
    }
}

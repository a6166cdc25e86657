use serde_json::Value;

use super::Document;

/// Deep-merge `overrides` onto `defaults`.
///
/// Nested objects merge key by key. Arrays, scalars and `null` in the override
/// replace the default wholesale. Keys missing from the override keep their
/// default value; keys unknown to the defaults are copied through.
pub fn merge(defaults: &Document, overrides: &Document) -> Document {
    let mut effective = defaults.clone();

    for (key, value) in overrides {
        if let (Some(Value::Object(base)), Value::Object(patch)) = (effective.get_mut(key), value)
        {
            let merged = merge(base, patch);
            *base = merged;
            continue;
        }
        effective.insert(key.clone(), value.clone());
    }

    effective
}

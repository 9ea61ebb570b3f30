//! JSON merge semantics shared by every `ProfileRepo` adapter.
//!
//! A merge-write must leave fields absent from the partial untouched, so
//! concurrent unrelated-field edits by the same owner never clobber each
//! other. Objects merge recursively; scalars and arrays replace.

use serde_json::Value;

/// Merges `partial` onto `base` and returns the result.
pub fn deep_merge(base: Value, partial: Value) -> Value {
    match (base, partial) {
        (Value::Object(mut base), Value::Object(partial)) => {
            for (key, incoming) in partial {
                let merged = match base.remove(&key) {
                    Some(current) => deep_merge(current, incoming),
                    None => incoming,
                };
                base.insert(key, merged);
            }
            Value::Object(base)
        }
        (_, partial) => partial,
    }
}

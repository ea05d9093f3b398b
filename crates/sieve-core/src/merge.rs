//! Shallow record merging.
//!
//! Intersections merge the decoded results of their members and the
//! environment projector merges the records gathered for each branch of a
//! codec. Both follow the same rule: later records win on key conflicts, and
//! nothing is merged below the first level.

use serde_json::{Map, Value};

/// A JSON object.
pub type Record = Map<String, Value>;

/// Trait for merging records, with the overlay taking precedence.
pub trait Merge: Sized {
    /// Merge `other` into `self`, with `other` taking precedence.
    fn merge(self, other: Self) -> Self;

    /// Merge multiple overlays in sequence.
    ///
    /// Later overlays take precedence over earlier ones.
    fn merge_all<I>(self, overlays: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        overlays.into_iter().fold(self, |acc, overlay| acc.merge(overlay))
    }
}

impl Merge for Record {
    fn merge(mut self, other: Self) -> Self {
        for (key, value) in other {
            self.insert(key, value);
        }
        self
    }
}

/// Combine the decoded results of an intersection's members.
///
/// If no member changed the input, the input is returned as is. If every
/// result is a primitive, the last one wins. Otherwise the object results are
/// merged key by key; a key already present is only replaced by a value that
/// differs from the input's value at that key.
pub fn merge_decoded(base: &Value, results: Vec<Value>) -> Value {
    let unchanged = results.iter().all(|result| result == base);
    if unchanged {
        return base.clone();
    }

    let primitive = results.iter().all(|result| !result.is_object());
    if primitive {
        return results.into_iter().last().unwrap_or_else(|| base.clone());
    }

    let base_record = base.as_object();
    let mut merged = Record::new();
    for result in results {
        let Value::Object(record) = result else {
            continue;
        };
        for (key, value) in record {
            let changed = match base_record {
                Some(base_record) => base_record.get(&key) != Some(&value),
                None => true,
            };
            if changed || !merged.contains_key(&key) {
                merged.insert(key, value);
            }
        }
    }
    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(record) => record,
            other => panic!("expected an object, got {}", other),
        }
    }

    #[test]
    fn test_record_merge_overlay_wins() {
        let base = record(json!({"a": "1", "b": "2"}));
        let overlay = record(json!({"b": "20", "c": "3"}));

        let merged = base.merge(overlay);

        assert_eq!(Value::Object(merged), json!({"a": "1", "b": "20", "c": "3"}));
    }

    #[test]
    fn test_record_merge_is_shallow() {
        let base = record(json!({"spec": {"replicas": 1, "image": "base:v1"}}));
        let overlay = record(json!({"spec": {"replicas": 3}}));

        let merged = base.merge(overlay);

        assert_eq!(Value::Object(merged), json!({"spec": {"replicas": 3}}));
    }

    #[test]
    fn test_merge_all() {
        let merged = Record::new().merge_all(vec![
            record(json!({"a": 1})),
            record(json!({"a": 2, "b": 2})),
            record(json!({"a": 3})),
        ]);
        assert_eq!(Value::Object(merged), json!({"a": 3, "b": 2}));
    }

    #[test]
    fn test_merge_decoded_unchanged_returns_base() {
        let base = json!({"a": "x", "extra": true});
        let merged = merge_decoded(&base, vec![base.clone(), base.clone()]);
        assert_eq!(merged, base);
    }

    #[test]
    fn test_merge_decoded_keeps_changed_values() {
        let base = json!({"port": "80", "host": "localhost"});
        let first = json!({"port": 80, "host": "localhost"});
        let second = json!({"port": "80", "host": "localhost"});

        let merged = merge_decoded(&base, vec![first, second]);

        assert_eq!(merged, json!({"port": 80, "host": "localhost"}));
    }

    #[test]
    fn test_merge_decoded_primitives_last_wins() {
        let merged = merge_decoded(&json!("1"), vec![json!("1"), json!(1)]);
        assert_eq!(merged, json!(1));
    }

    #[test]
    fn test_merge_decoded_empty() {
        assert_eq!(merge_decoded(&json!({"a": 1}), vec![]), json!({"a": 1}));
    }
}

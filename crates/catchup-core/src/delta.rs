//! Resource deltas - what changed between two states
//!
//! The engine reports a delta for every operation when it has a summarizer.
//! [`numeric_delta`] is a ready-made summarizer for states that serialize to
//! a map with numeric fields.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Per-resource change, keyed by resource name, in first-seen order
pub type ResourceDelta = IndexMap<String, f64>;

/// Summarizer computing a [`ResourceDelta`] from the state before and after an operation
pub type DeltaFn<S> = Box<dyn Fn(&S, &S) -> ResourceDelta>;

/// Difference of every numeric top-level field of two serializable states
///
/// Fields missing on one side count as zero there. Fields whose value did
/// not change, and non-numeric fields, are left out. States that do not
/// serialize to a map produce an empty delta.
///
/// Integer fields are subtracted exactly before the difference is turned
/// into an `f64`, so a small change to a counter above 2^53 is still
/// reported exactly. Differences that themselves exceed 2^53 are rounded.
///
/// ```
/// use catchup_core::numeric_delta;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Bank { gold: i64, rate: i64 }
///
/// let delta = numeric_delta(&Bank { gold: 5, rate: 1 }, &Bank { gold: 9, rate: 1 });
/// assert_eq!(delta.get("gold"), Some(&4.0));
/// assert_eq!(delta.get("rate"), None);
/// ```
pub fn numeric_delta<S: Serialize>(before: &S, after: &S) -> ResourceDelta {
    let (Ok(Value::Object(before)), Ok(Value::Object(after))) =
        (serde_json::to_value(before), serde_json::to_value(after))
    else {
        return ResourceDelta::new();
    };

    let mut delta = ResourceDelta::new();
    let keys = before.keys().chain(after.keys().filter(|k| !before.contains_key(*k)));
    for key in keys {
        let (old, new) = (before.get(key), after.get(key));
        let change = match (integer(old), integer(new)) {
            // Subtract integers exactly so large counters keep small deltas precise
            (Some(old), Some(new)) => (new - old) as f64,
            _ => {
                let old = old.and_then(Value::as_f64);
                let new = new.and_then(Value::as_f64);
                if old.is_none() && new.is_none() {
                    continue;
                }
                new.unwrap_or(0.0) - old.unwrap_or(0.0)
            }
        };
        if change != 0.0 {
            delta.insert(key.clone(), change);
        }
    }
    delta
}

/// Integer value of a field, with a missing field reading as zero
fn integer(value: Option<&Value>) -> Option<i128> {
    match value {
        None => Some(0),
        Some(value) => value
            .as_i64()
            .map(i128::from)
            .or_else(|| value.as_u64().map(i128::from)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_delta() {
        let before = json!({"gold": 10, "wood": 2.5, "name": "camp"});
        let after = json!({"gold": 4, "wood": 2.5, "name": "town", "stone": 3});

        let delta = numeric_delta(&before, &after);
        assert_eq!(delta.get("gold"), Some(&-6.0));
        assert_eq!(delta.get("wood"), None);
        assert_eq!(delta.get("name"), None);
        assert_eq!(delta.get("stone"), Some(&3.0));
        assert_eq!(delta.keys().collect::<Vec<_>>(), vec!["gold", "stone"]);
    }

    #[test]
    fn test_large_integer_delta_is_exact() {
        let base = 1i64 << 60;
        let before = json!({"gold": base, "dust": u64::MAX - 10});
        let after = json!({"gold": base + 3, "dust": u64::MAX});

        let delta = numeric_delta(&before, &after);
        assert_eq!(delta.get("gold"), Some(&3.0));
        assert_eq!(delta.get("dust"), Some(&10.0));
    }

    #[test]
    fn test_non_map_state() {
        assert!(numeric_delta(&5i64, &6i64).is_empty());
    }
}

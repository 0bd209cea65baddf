//! Loosely-typed configuration properties.
//!
//! A [`Properties`] bag carries configuration values as they arrive from
//! text: every value is a [`serde_json::Value`], and typed access goes
//! through the [`convert`](crate::convert) rules. Keys are kept sorted so
//! iteration and injection order are deterministic.

use crate::convert::{self, ConvertError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Reserved key under which a whole-bag sink injection is recorded.
///
/// Components that accept the entire bag at once have that injection
/// tracked under this key, so it cannot double as a per-key property name.
pub const PROPERTIES_KEY: &str = "properties";

/// Ordered key/value configuration bag.
///
/// # Example
///
/// ```
/// use floe_component::Properties;
/// use serde_json::json;
///
/// let mut props = Properties::new();
/// props.insert("taste", json!("sweet"));
/// props.insert("count", json!("27"));
///
/// assert_eq!(props.get_text("taste").unwrap(), "sweet");
/// assert_eq!(props.get_i64("count").unwrap(), 27);
/// assert!(props.get("color").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties {
    entries: BTreeMap<String, Value>,
}

impl Properties {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a property, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    /// Removes a property.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Returns the raw value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Returns whether a key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns a value as text, converting if needed.
    ///
    /// `None` when the key is absent.
    pub fn get_text(&self, key: &str) -> Option<String> {
        self.get(key).map(convert::to_text)
    }

    /// Returns a value as an integer, converting if needed.
    ///
    /// `None` when the key is absent; `Some(Err(_))` when present but not
    /// convertible.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.try_get_i64(key).and_then(Result::ok)
    }

    /// Like [`get_i64`](Self::get_i64) but preserving the conversion error.
    pub fn try_get_i64(&self, key: &str) -> Option<Result<i64, ConvertError>> {
        self.get(key).map(convert::to_i64)
    }

    /// Returns a value as a boolean, converting if needed.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| convert::to_bool(v).ok())
    }
}

impl FromIterator<(String, Value)> for Properties {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, Value)> for Properties {
    fn from_iter<T: IntoIterator<Item = (&'a str, Value)>>(iter: T) -> Self {
        iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }
}

impl IntoIterator for Properties {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_and_get() {
        let mut props = Properties::new();
        assert!(props.is_empty());
        props.insert("color", json!("green"));
        assert_eq!(props.get("color"), Some(&json!("green")));
        assert_eq!(props.len(), 1);
    }

    #[test]
    fn typed_accessors_convert() {
        let props: Properties = [
            ("count", json!("27")),
            ("ripe", json!("y")),
            ("taste", json!(3)),
        ]
        .into_iter()
        .collect();
        assert_eq!(props.get_i64("count"), Some(27));
        assert_eq!(props.get_bool("ripe"), Some(true));
        assert_eq!(props.get_text("taste").as_deref(), Some("3"));
    }

    #[test]
    fn conversion_failure_is_observable() {
        let props: Properties = [("count", json!("many"))].into_iter().collect();
        assert_eq!(props.get_i64("count"), None);
        assert!(props.try_get_i64("count").is_some_and(|r| r.is_err()));
    }

    #[test]
    fn iteration_is_key_ordered() {
        let props: Properties = [("b", json!(2)), ("a", json!(1)), ("c", json!(3))]
            .into_iter()
            .collect();
        let keys: Vec<&str> = props.keys().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn serde_round_trip_is_a_plain_object() {
        let props: Properties = [("taste", json!("sweet"))].into_iter().collect();
        let encoded = serde_json::to_value(&props).unwrap();
        assert_eq!(encoded, json!({"taste": "sweet"}));
        let decoded: Properties = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, props);
    }
}

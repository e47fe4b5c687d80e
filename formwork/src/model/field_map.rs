//! Insertion-ordered map keyed by field name.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::value::{FromValue, Value};
use crate::error::FieldError;

/// A map from field name to `T` that remembers insertion order.
///
/// Forms have a small, fixed set of fields, so entries live in a `Vec` and
/// lookups are linear. Iteration always follows insertion order, which keeps
/// aggregated validation output in a deterministic order.
///
/// # Example
///
/// ```
/// use formwork::model::{FieldMap, Value};
///
/// let values: FieldMap<Value> = FieldMap::new()
///     .with("name", "Ada")
///     .with("age", 36i64);
///
/// assert_eq!(values.keys().collect::<Vec<_>>(), vec!["name", "age"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> FieldMap<T> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Creates an empty map with room for `capacity` fields.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Sets a field (builder pattern).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<T>) -> Self {
        self.insert(key, value.into());
        self
    }

    /// Inserts a field, returning the previous value.
    ///
    /// Replacing an existing key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: T) -> Option<T> {
        let key = key.into();
        match self.entries.iter().position(|(k, _)| *k == key) {
            Some(index) => Some(std::mem::replace(&mut self.entries[index].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the field value, if it exists.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Returns `true` if the map contains the given field.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Field names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Field values in order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Mutable entries in order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut T)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// Builds a new map with the same keys and mapped values.
    pub fn map<U>(&self, mut f: impl FnMut(&str, &T) -> U) -> FieldMap<U> {
        FieldMap {
            entries: self
                .entries
                .iter()
                .map(|(k, v)| (k.clone(), f(k, v)))
                .collect(),
        }
    }

    /// Returns `true` if any value matches the predicate.
    pub fn any(&self, mut f: impl FnMut(&T) -> bool) -> bool {
        self.entries.iter().any(|(_, v)| f(v))
    }
}

impl FieldMap<Value> {
    /// Gets a field converted to `T`.
    ///
    /// Fails when the field is missing or holds another type.
    pub fn get_as<T: FromValue>(&self, key: &str) -> Result<T, FieldError> {
        match self.get(key) {
            None => Err(FieldError::missing(key)),
            Some(value) => T::from_value(key, value.clone()),
        }
    }
}

impl<T> Default for FieldMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, T> FromIterator<(K, T)> for FieldMap<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<T> IntoIterator for FieldMap<T> {
    type Item = (String, T);
    type IntoIter = std::vec::IntoIter<(String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<T: Serialize> Serialize for FieldMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct FieldMapVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for FieldMapVisitor<T> {
    type Value = FieldMap<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of field names to values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = FieldMap::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, T>()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FieldMapVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_position() {
        let mut map: FieldMap<i32> = FieldMap::new().with("a", 1).with("b", 2);
        assert_eq!(map.insert("a", 10), Some(1));
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![("a", &10), ("b", &2)]);
    }

    #[test]
    fn test_get_as() {
        let values: FieldMap<Value> = FieldMap::new().with("name", "Ada").with("age", 36i64);

        assert_eq!(values.get_as::<String>("name"), Ok("Ada".to_string()));
        assert_eq!(values.get_as::<i64>("age"), Ok(36));
        assert_eq!(
            values.get_as::<String>("email"),
            Err(FieldError::missing("email"))
        );
        assert_eq!(
            values.get_as::<bool>("age"),
            Err(FieldError::type_mismatch("age", "bool", "int"))
        );
    }

    #[test]
    fn test_serde_preserves_order() {
        let values: FieldMap<Value> = FieldMap::new().with("zeta", 1i64).with("alpha", "x");
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"{"zeta":1,"alpha":"x"}"#);

        let parsed: FieldMap<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, values);
    }
}

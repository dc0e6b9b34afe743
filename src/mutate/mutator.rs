use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single value inside a [`Mutator`]: a primitive or a nested mutator.
///
/// Numbers are carried as `f64` throughout, matching the JSON number model
/// used by the serialization layer, so a value survives a round trip
/// bit-exactly.
#[derive(Debug, Clone, PartialEq)]
pub enum MutatorValue {
    Number(f64),
    Bool(bool),
    String(String),
    Nested(Mutator),
}

impl MutatorValue {
    /// Returns the contained number, if this is a number.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            MutatorValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the contained bool, if this is a bool.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MutatorValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the contained string, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MutatorValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the nested mutator, if this is a nested value.
    #[must_use]
    pub fn as_nested(&self) -> Option<&Mutator> {
        match self {
            MutatorValue::Nested(m) => Some(m),
            _ => None,
        }
    }
}

impl From<f64> for MutatorValue {
    fn from(value: f64) -> Self {
        MutatorValue::Number(value)
    }
}

impl From<f32> for MutatorValue {
    fn from(value: f32) -> Self {
        MutatorValue::Number(f64::from(value))
    }
}

impl From<bool> for MutatorValue {
    fn from(value: bool) -> Self {
        MutatorValue::Bool(value)
    }
}

impl From<&str> for MutatorValue {
    fn from(value: &str) -> Self {
        MutatorValue::String(value.to_string())
    }
}

impl From<String> for MutatorValue {
    fn from(value: String) -> Self {
        MutatorValue::String(value)
    }
}

impl From<Mutator> for MutatorValue {
    fn from(value: Mutator) -> Self {
        MutatorValue::Nested(value)
    }
}

/// An ordered mapping from field name to [`MutatorValue`].
///
/// Entries keep insertion order. After [`Mutable::get_mutator`] has run the
/// reduce hook, the mutator is frozen: existing entries may still be
/// replaced or removed, but no new keys can be introduced.
///
/// Equality compares entries field-for-field; the frozen flag does not
/// participate.
///
/// [`Mutable::get_mutator`]: crate::mutate::Mutable::get_mutator
#[derive(Debug, Clone, Default)]
pub struct Mutator {
    entries: Vec<(String, MutatorValue)>,
    frozen: bool,
}

impl PartialEq for Mutator {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Mutator {
    /// Creates an empty, unfrozen mutator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an entry.
    ///
    /// Replacing an existing key always succeeds. Inserting a key that is
    /// not yet present fails on a frozen mutator and returns `false`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<MutatorValue>) -> bool {
        let name = name.into();
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value.into();
            return true;
        }
        if self.frozen {
            return false;
        }
        self.entries.push((name, value.into()));
        true
    }

    /// Removes an entry, returning its value if present.
    ///
    /// Removal is legal even on a frozen mutator; the reduce hook uses it to
    /// hide fields from reflection.
    pub fn remove(&mut self, name: &str) -> Option<MutatorValue> {
        let index = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(index).1)
    }

    /// Returns the value stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MutatorValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Shortcut for a numeric entry.
    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(MutatorValue::as_number)
    }

    /// Shortcut for a nested entry.
    #[must_use]
    pub fn nested(&self, name: &str) -> Option<&Mutator> {
        self.get(name).and_then(MutatorValue::as_nested)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MutatorValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Structurally freezes the mutator: no new keys after this point.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Whether the mutator has been frozen.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Converts to a `serde_json::Value` object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            let json = match value {
                MutatorValue::Number(n) => serde_json::json!(n),
                MutatorValue::Bool(b) => serde_json::Value::Bool(*b),
                MutatorValue::String(s) => serde_json::Value::String(s.clone()),
                MutatorValue::Nested(m) => m.to_json(),
            };
            map.insert(name.clone(), json);
        }
        serde_json::Value::Object(map)
    }

    /// Builds a mutator from a `serde_json::Value` object.
    ///
    /// Non-object values and entries of unsupported kinds (arrays, null)
    /// produce a `serde_json` error via the serde impl below.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value.clone())
    }
}

// ============================================================================
// Serde: a mutator serializes as a JSON object, preserving entry order.
// ============================================================================

impl Serialize for Mutator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for MutatorValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MutatorValue::Number(n) => serializer.serialize_f64(*n),
            MutatorValue::Bool(b) => serializer.serialize_bool(*b),
            MutatorValue::String(s) => serializer.serialize_str(s),
            MutatorValue::Nested(m) => m.serialize(serializer),
        }
    }
}

struct MutatorVisitor;

impl<'de> Visitor<'de> for MutatorVisitor {
    type Value = Mutator;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of field names to primitive or nested values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut mutator = Mutator::new();
        while let Some((name, value)) = access.next_entry::<String, MutatorValue>()? {
            mutator.insert(name, value);
        }
        Ok(mutator)
    }
}

impl<'de> Deserialize<'de> for Mutator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(MutatorVisitor)
    }
}

struct MutatorValueVisitor;

impl<'de> Visitor<'de> for MutatorValueVisitor {
    type Value = MutatorValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a number, bool, string or nested map")
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(MutatorValue::Number(v))
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(MutatorValue::Number(v as f64))
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(MutatorValue::Number(v as f64))
    }

    fn visit_bool<E: serde::de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(MutatorValue::Bool(v))
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(MutatorValue::String(v.to_string()))
    }

    fn visit_string<E: serde::de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(MutatorValue::String(v))
    }

    fn visit_map<A: MapAccess<'de>>(self, access: A) -> Result<Self::Value, A::Error> {
        MutatorVisitor.visit_map(access).map(MutatorValue::Nested)
    }
}

impl<'de> Deserialize<'de> for MutatorValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MutatorValueVisitor)
    }
}

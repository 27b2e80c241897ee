//! Metadata for attributes, primvars and subsets.
//!
//! USD metadata is keyed by token and holds typed values. The engine reads a
//! handful of keys (interpolation, element size, partition values) and the
//! in-memory stage stores whatever the caller authors.

use smallvec::SmallVec;

use super::Value;

/// Metadata storage - key-value pairs.
///
/// Uses SmallVec optimization for common case of few entries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetaData {
    entries: SmallVec<[(String, Value); 4]>,
}

impl MetaData {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a metadata value, replacing any existing entry.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();

        for (k, v) in &mut self.entries {
            if k == &key {
                *v = value;
                return;
            }
        }
        self.entries.push((key, value));
    }

    /// Get a metadata value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Get a string-like value by key.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Get an integer value by key.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    /// Check if a key exists.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Remove a key and return its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over key-value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    // === Common metadata keys ===

    /// Primvar interpolation token.
    pub const INTERPOLATION: &'static str = "interpolation";
    /// Primvar element size.
    pub const ELEMENT_SIZE: &'static str = "elementSize";
    /// Original partition value stored on a subset (customData).
    pub const PARTITION_VALUE: &'static str = "partitionValue";
}

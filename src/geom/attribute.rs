//! Named attribute lists.
//!
//! An [`AttributeList`] is the per-owner container the router fills: an
//! ordered set of (name, array) pairs. Order is insertion order, which keeps
//! output stable for callers that iterate.

use super::DataArray;

/// Ordered list of named data arrays for one owner.
#[derive(Clone, Debug, Default)]
pub struct AttributeList {
    entries: Vec<(String, DataArray)>,
}

impl AttributeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an attribute.
    pub fn insert(&mut self, name: impl Into<String>, array: DataArray) {
        let name = name.into();
        if let Some(idx) = self.position(&name) {
            self.entries[idx].1 = array;
        } else {
            self.entries.push((name, array));
        }
    }

    /// Get an attribute by name.
    pub fn get(&self, name: &str) -> Option<&DataArray> {
        self.position(name).map(|i| &self.entries[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Remove an attribute and return its data.
    pub fn remove(&mut self, name: &str) -> Option<DataArray> {
        let idx = self.position(name)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attribute names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataArray)> {
        self.entries.iter().map(|(n, a)| (n.as_str(), a))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }
}

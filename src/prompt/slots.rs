use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Caller-supplied values for template slots, in insertion order.
///
/// Keys that no template slot asks for are carried along and ignored at
/// render time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SlotValues(IndexMap<String, String>);

impl SlotValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; any `Display` value is stored in its string form.
    pub fn with(mut self, slot: impl Into<String>, value: impl fmt::Display) -> Self {
        self.insert(slot, value);
        self
    }

    /// Insert or replace a value, keeping the original position on replace.
    pub fn insert(&mut self, slot: impl Into<String>, value: impl fmt::Display) {
        self.0.insert(slot.into(), value.to_string());
    }

    pub fn get(&self, slot: &str) -> Option<&str> {
        self.0.get(slot).map(String::as_str)
    }

    pub fn contains(&self, slot: &str) -> bool {
        self.0.contains_key(slot)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: fmt::Display> FromIterator<(K, V)> for SlotValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (slot, value) in iter {
            values.insert(slot, value);
        }
        values
    }
}

//! Multi-valued tag sets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Separator used when a tool cannot store repeated fields natively.
pub const VALUE_SEPARATOR: char = ';';

/// Normalizes a tag field name: trimmed and lower-cased.
pub fn normalize_field(field: &str) -> String {
    field.trim().to_lowercase()
}

/// Field name to ordered list of values.
///
/// Field order is irrelevant; the order of values within a field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet {
    fields: BTreeMap<String, Vec<String>>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value to a field. Never overwrites existing values.
    pub fn add(&mut self, field: &str, value: impl Into<String>) -> &mut Self {
        self.fields
            .entry(normalize_field(field))
            .or_default()
            .push(value.into());
        self
    }

    /// Builder-style variant of [`TagSet::add`].
    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.add(field, value);
        self
    }

    /// Values of a field, in insertion order.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(&normalize_field(field)).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(&normalize_field(field))
    }

    /// Field names, sorted.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Adds a value that may hold several `;`-joined values.
    pub(crate) fn add_joined(&mut self, field: &str, joined: &str) {
        for value in joined.split(VALUE_SEPARATOR) {
            self.add(field, value);
        }
    }

    /// Replaces all values of a field.
    pub(crate) fn replace(&mut self, field: &str, values: Vec<String>) {
        self.fields.insert(normalize_field(field), values);
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tags = TagSet::new();
        for (field, value) in iter {
            tags.add(field.as_ref(), value);
        }
        tags
    }
}

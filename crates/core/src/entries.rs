//! Ordered, name-unique collection of typed entries.

use indexmap::IndexMap;
use serde::Serialize;

use crate::value::TypedEntry;

/// Entries in insertion order, unique by name.
///
/// Inserting a name that already exists replaces the entry but keeps the
/// position of the first insertion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EntryCollection {
    entries: IndexMap<String, TypedEntry>,
}

impl EntryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `entry`, returning the entry it replaced.
    pub fn insert(&mut self, entry: TypedEntry) -> Option<TypedEntry> {
        self.entries.insert(entry.name().to_string(), entry)
    }

    /// Insert every entry of `other` in order (last write wins).
    pub fn extend(&mut self, other: EntryCollection) {
        for entry in other.entries.into_values() {
            self.insert(entry);
        }
    }

    pub fn get(&self, name: &str) -> Option<&TypedEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypedEntry> {
        self.entries.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl FromIterator<TypedEntry> for EntryCollection {
    fn from_iter<I: IntoIterator<Item = TypedEntry>>(iter: I) -> Self {
        let mut collection = Self::new();
        for entry in iter {
            collection.insert(entry);
        }
        collection
    }
}

impl<'a> IntoIterator for &'a EntryCollection {
    type Item = &'a TypedEntry;
    type IntoIter = indexmap::map::Values<'a, String, TypedEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

use std::{collections::HashMap, fmt, ops::Index, slice, vec};

use crate::Part;

/// Decoded parts grouped by field name.
///
/// Names keep the order of their first appearance, parts under a name keep
/// submission order. Dropping the collection deletes every spilled body it
/// still owns.
#[derive(Default)]
pub struct PartCollection {
    entries: Vec<(String, Vec<Part>)>,
    /// name -> position in `entries`
    index: HashMap<String, usize>,
}

impl PartCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sealed part under its name.
    pub fn push(&mut self, part: Part) {
        match self.index.get(&part.name) {
            Some(&i) => self.entries[i].1.push(part),
            None => {
                self.index.insert(part.name.clone(), self.entries.len());
                self.entries.push((part.name.clone(), vec![part]));
            }
        }
    }

    /// Gets the parts submitted under `name`.
    pub fn get(&self, name: &str) -> Option<&[Part]> {
        self.index
            .get(name)
            .map(|&i| self.entries[i].1.as_slice())
    }

    /// Gets the first part submitted under `name`.
    pub fn first(&self, name: &str) -> Option<&Part> {
        self.get(name).and_then(<[Part]>::first)
    }

    /// Checks if any part was submitted under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes and returns the parts under `name`, the caller now owns them.
    pub fn remove(&mut self, name: &str) -> Option<Vec<Part>> {
        let i = self.index.remove(name)?;
        for v in self.index.values_mut() {
            if *v > i {
                *v -= 1;
            }
        }
        Some(self.entries.remove(i).1)
    }

    /// Field names, in order of first appearance.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Iterates names with their parts.
    pub fn iter(&self) -> Iter<'_> {
        Iter(self.entries.iter())
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of parts.
    pub fn parts(&self) -> usize {
        self.entries.iter().map(|(_, parts)| parts.len()).sum()
    }

    /// Checks if no part was decoded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for PartCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(name, parts)| (name, parts)))
            .finish()
    }
}

impl Index<&str> for PartCollection {
    type Output = [Part];

    /// # Panics
    ///
    /// If no part was submitted under `name`.
    fn index(&self, name: &str) -> &Self::Output {
        self.get(name)
            .unwrap_or_else(|| panic!("no part named `{name}`"))
    }
}

impl Extend<Part> for PartCollection {
    fn extend<I: IntoIterator<Item = Part>>(&mut self, iter: I) {
        for part in iter {
            self.push(part);
        }
    }
}

impl FromIterator<Part> for PartCollection {
    fn from_iter<I: IntoIterator<Item = Part>>(iter: I) -> Self {
        let mut collection = Self::new();
        collection.extend(iter);
        collection
    }
}

/// Iterator over names and their parts.
#[derive(Debug)]
pub struct Iter<'a>(slice::Iter<'a, (String, Vec<Part>)>);

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a [Part]);

    fn next(&mut self) -> Option<Self::Item> {
        self.0
            .next()
            .map(|(name, parts)| (name.as_str(), parts.as_slice()))
    }
}

impl<'a> IntoIterator for &'a PartCollection {
    type Item = (&'a str, &'a [Part]);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for PartCollection {
    type Item = (String, Vec<Part>);
    type IntoIter = vec::IntoIter<(String, Vec<Part>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

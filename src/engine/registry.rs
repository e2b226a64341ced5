//! Generic name-to-entry registry backing views, includes, and helpers

use std::collections::HashMap;
use std::fmt;

/// A name-keyed table of registered entries
///
/// All three engine registries share these semantics: registering an existing
/// name silently overwrites it, removing an absent name is a no-op, and
/// [`Registry::get_all`] hands out an independent copy of the mapping.
/// Compiled templates never snapshot a registry; they resolve names through
/// the engine at render time, so clearing a registry does not invalidate
/// anything already compiled.
#[derive(Clone)]
pub struct Registry<T: Clone> {
    entries: HashMap<String, T>,
}

impl<T: Clone> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T: Clone> Registry<T> {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `entry` under `name`, replacing any previous entry with that name
    pub fn register(&mut self, name: impl Into<String>, entry: T) {
        self.entries.insert(name.into(), entry);
    }

    /// Delete the entry if present; absent names are a no-op
    pub fn remove(&mut self, name: &str) {
        self.entries.remove(name);
    }

    /// Reset the registry to empty
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// An independent copy of the name-to-entry mapping
    pub fn get_all(&self) -> HashMap<String, T> {
        self.entries.clone()
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterate over registered names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Entries are typically function pointers with no useful Debug output, so
// only the registered names are shown.
impl<T: Clone> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("Registry").field("names", &names).finish()
    }
}

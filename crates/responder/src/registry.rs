//! String-keyed constructor registries.
//!
//! Configuration names decorators and serializers by identifier. A
//! [`NamedRegistry`] maps those identifiers to constructor functions so the
//! configured names can be turned into instances without reflection.

use std::collections::HashMap;

/// Constructors of one kind, keyed by identifier.
#[derive(Clone)]
pub struct NamedRegistry<T> {
    kind: &'static str,
    entries: HashMap<String, T>,
}

impl<T> NamedRegistry<T> {
    /// Creates an empty registry. `kind` names the entries in debug output.
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
        }
    }

    /// Adds an entry, returning the one it replaced.
    pub fn insert(&mut self, identifier: impl Into<String>, entry: T) -> Option<T> {
        self.entries.insert(identifier.into(), entry)
    }

    /// Looks up an entry.
    pub fn get(&self, identifier: &str) -> Option<&T> {
        self.entries.get(identifier)
    }

    /// Returns true if `identifier` is registered.
    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    /// Registered identifiers, sorted.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut identifiers: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        identifiers.sort_unstable();
        identifiers
    }
}

impl<T> std::fmt::Debug for NamedRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedRegistry")
            .field("kind", &self.kind)
            .field("identifiers", &self.identifiers())
            .finish()
    }
}

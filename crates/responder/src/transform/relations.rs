//! Relation include parsing.

use std::collections::BTreeMap;

/// Parses requested relation paths and bounds how deep they may go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationManager {
    recursion_limit: usize,
}

impl RelationManager {
    /// Creates a manager that follows at most `recursion_limit` levels.
    pub fn new(recursion_limit: usize) -> Self {
        Self { recursion_limit }
    }

    /// Returns the recursion limit.
    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    /// Builds the include tree for dotted relation paths.
    ///
    /// `books.publisher` also includes `books`. Segments past the recursion
    /// limit are cut off.
    pub fn parse_includes<S: AsRef<str>>(&self, paths: &[S]) -> IncludeTree {
        let mut tree = IncludeTree::default();
        for path in paths {
            let segments = path
                .as_ref()
                .split('.')
                .map(str::trim)
                .take_while(|s| !s.is_empty())
                .take(self.recursion_limit);
            tree.insert(segments);
        }
        tree
    }
}

impl Default for RelationManager {
    fn default() -> Self {
        Self::new(5)
    }
}

/// Requested relations, nested by path segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeTree {
    children: BTreeMap<String, IncludeTree>,
}

impl IncludeTree {
    fn insert<'a>(&mut self, segments: impl Iterator<Item = &'a str>) {
        let mut node = self;
        for segment in segments {
            node = node.children.entry(segment.to_string()).or_default();
        }
    }

    /// Returns true if `relation` is requested at this level.
    pub fn contains(&self, relation: &str) -> bool {
        self.children.contains_key(relation)
    }

    /// The includes requested below `relation`.
    pub fn child(&self, relation: &str) -> Option<&IncludeTree> {
        self.children.get(relation)
    }

    /// Returns true if nothing is requested.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Every requested path in dotted form, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for (name, child) in &self.children {
            paths.push(name.clone());
            for nested in child.paths() {
                paths.push(format!("{}.{}", name, nested));
            }
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_path_implies_parent() {
        let tree = RelationManager::default().parse_includes(&["books.publisher"]);
        assert!(tree.contains("books"));
        assert!(tree.child("books").unwrap().contains("publisher"));
        assert_eq!(tree.paths(), vec!["books", "books.publisher"]);
    }

    #[test]
    fn test_recursion_limit_truncates() {
        let tree = RelationManager::new(2).parse_includes(&["a.b.c.d"]);
        assert_eq!(tree.paths(), vec!["a", "a.b"]);
    }

    #[test]
    fn test_blank_segments_stop_the_path() {
        let tree = RelationManager::default().parse_includes(&["a..b", ""]);
        assert_eq!(tree.paths(), vec!["a"]);
    }

    #[test]
    fn test_empty() {
        let tree = RelationManager::default().parse_includes::<&str>(&[]);
        assert!(tree.is_empty());
    }
}

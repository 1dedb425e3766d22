//! The transformer contract.
//!
//! A transformer maps one item to its public shape and declares which of its
//! keys are relations. Relations are only sent when the request asks for
//! them.

use std::collections::HashMap;

use serde_json::{Map, Value};

/// Maps items to their response shape.
pub trait Transformer: Send + Sync {
    /// Keys of the transformed item that are relations.
    fn relations(&self) -> &[String];

    /// Maps an item. The default keeps it as-is.
    fn transform(&self, item: Map<String, Value>) -> Map<String, Value> {
        item
    }

    /// Transformer for the items of `relation`, if it needs a specific one.
    fn nested(&self, _relation: &str) -> Option<&dyn Transformer> {
        None
    }
}

/// Transformer for plain JSON items with declared relation keys.
#[derive(Debug, Clone, Default)]
pub struct JsonTransformer {
    relations: Vec<String>,
    nested: HashMap<String, JsonTransformer>,
}

impl JsonTransformer {
    /// A transformer without relations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares relation keys.
    pub fn with_relations<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relations.extend(relations.into_iter().map(Into::into));
        self
    }

    /// Uses `transformer` for the items of `relation`. The relation is
    /// declared if it was not already.
    pub fn with_nested(
        mut self,
        relation: impl Into<String>,
        transformer: JsonTransformer,
    ) -> Self {
        let relation = relation.into();
        if !self.relations.contains(&relation) {
            self.relations.push(relation.clone());
        }
        self.nested.insert(relation, transformer);
        self
    }
}

impl Transformer for JsonTransformer {
    fn relations(&self) -> &[String] {
        &self.relations
    }

    fn nested(&self, relation: &str) -> Option<&dyn Transformer> {
        self.nested.get(relation).map(|t| t as &dyn Transformer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_nested_declares_relation() {
        let transformer = JsonTransformer::new()
            .with_relations(["books"])
            .with_nested("books", JsonTransformer::new().with_relations(["publisher"]))
            .with_nested("awards", JsonTransformer::new());

        assert_eq!(transformer.relations(), ["books", "awards"]);
        let books = transformer.nested("books").unwrap();
        assert_eq!(books.relations(), ["publisher"]);
        assert!(transformer.nested("unknown").is_none());
    }
}

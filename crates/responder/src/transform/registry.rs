//! Transformers looked up by resource key.
//!
//! Handlers that set a resource key get the transformer registered for it
//! without passing one by hand. Keys without a registration fall back to the
//! `dyn Transformer` contract.

use std::sync::Arc;

use tracing::debug;

use super::Transformer;
use crate::registry::NamedRegistry;

/// Builds a transformer for one resource key.
pub type TransformerConstructor = Arc<dyn Fn() -> Box<dyn Transformer> + Send + Sync>;

/// Picks the transformer for the data being transformed.
pub trait TransformerResolver: Send + Sync {
    /// Returns the transformer for data enveloped under `resource_key`.
    fn resolve(self: Box<Self>, resource_key: Option<&str>) -> Box<dyn Transformer>;
}

/// Transformer constructors, by resource key.
#[derive(Debug, Clone)]
pub struct TransformerRegistry {
    entries: NamedRegistry<TransformerConstructor>,
}

impl TransformerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: NamedRegistry::new("transformer"),
        }
    }

    /// Registers the transformer for `resource_key`, replacing any previous
    /// one.
    pub fn register<F>(&mut self, resource_key: impl Into<String>, constructor: F)
    where
        F: Fn() -> Box<dyn Transformer> + Send + Sync + 'static,
    {
        self.entries.insert(resource_key, Arc::new(constructor));
    }

    /// Returns true if `resource_key` has a transformer.
    pub fn contains(&self, resource_key: &str) -> bool {
        self.entries.contains(resource_key)
    }

    /// Builds the transformer registered for `resource_key`.
    pub fn make(&self, resource_key: &str) -> Option<Box<dyn Transformer>> {
        self.entries.get(resource_key).map(|constructor| constructor())
    }
}

impl Default for TransformerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves registered transformers by key, falling back to a default.
pub struct KeyedTransformerResolver {
    registry: Arc<TransformerRegistry>,
    fallback: Box<dyn Transformer>,
}

impl KeyedTransformerResolver {
    /// Resolves from `registry`, using `fallback` for unregistered keys.
    pub fn new(registry: Arc<TransformerRegistry>, fallback: Box<dyn Transformer>) -> Self {
        Self { registry, fallback }
    }
}

impl TransformerResolver for KeyedTransformerResolver {
    fn resolve(self: Box<Self>, resource_key: Option<&str>) -> Box<dyn Transformer> {
        match resource_key.and_then(|key| self.registry.make(key)) {
            Some(transformer) => {
                debug!(resource_key, "Using registered transformer");
                transformer
            }
            None => self.fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::JsonTransformer;

    fn registry() -> Arc<TransformerRegistry> {
        let mut registry = TransformerRegistry::new();
        registry.register("author", || {
            Box::new(JsonTransformer::new().with_relations(["books"]))
        });
        Arc::new(registry)
    }

    #[test]
    fn test_registered_key_wins() {
        let resolver = Box::new(KeyedTransformerResolver::new(
            registry(),
            Box::new(JsonTransformer::new()),
        ));
        assert_eq!(resolver.resolve(Some("author")).relations(), ["books"]);
    }

    #[test]
    fn test_unregistered_or_missing_key_falls_back() {
        let fallback = || Box::new(JsonTransformer::new().with_relations(["awards"]));

        let resolver = Box::new(KeyedTransformerResolver::new(registry(), fallback()));
        assert_eq!(resolver.resolve(Some("book")).relations(), ["awards"]);

        let resolver = Box::new(KeyedTransformerResolver::new(registry(), fallback()));
        assert_eq!(resolver.resolve(None).relations(), ["awards"]);
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = TransformerRegistry::new();
        registry.register("author", || Box::new(JsonTransformer::new()));
        registry.register("author", || {
            Box::new(JsonTransformer::new().with_relations(["books"]))
        });

        assert!(registry.contains("author"));
        assert!(!registry.contains("book"));
        let transformer = registry.make("author").unwrap();
        assert_eq!(transformer.relations(), ["books"]);
    }
}

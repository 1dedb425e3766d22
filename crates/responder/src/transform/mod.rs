//! Turning response data into a serialized body.
//!
//! [`TransformBuilder`] is configured fluently. The producer registered for
//! it sets the serializer, the requested relations and the requested fields
//! before handing it out; callers add the resource, a transformer and meta
//! data, then call [`TransformBuilder::transform`].
//!
//! Without an explicit transformer, the builder asks its
//! [`TransformerResolver`] for the one registered under the resource key.
//! Objects are serialized as items, arrays as collections and null as the
//! serializer's null body.
//!
//! ```rust
//! use responder::transform::{JsonTransformer, RelationManager, TransformBuilder};
//! use serde_json::json;
//!
//! let body = TransformBuilder::new(RelationManager::default())
//!     .with(["books"])
//!     .only(["name", "books"])
//!     .transformer(Box::new(JsonTransformer::new().with_relations(["books"])))
//!     .resource(json!({"name": "Ada", "born": 1815, "books": [{"title": "Notes"}]}))
//!     .transform();
//!
//! assert_eq!(body, json!({"data": {"name": "Ada", "books": [{"title": "Notes"}]}}));
//! ```

mod registry;
mod relations;
mod transformer;

pub use registry::{
    KeyedTransformerResolver, TransformerConstructor, TransformerRegistry, TransformerResolver,
};
pub use relations::{IncludeTree, RelationManager};
pub use transformer::{JsonTransformer, Transformer};

use serde_json::{Map, Value};

use crate::responses::apply_fields;
use crate::serializers::{DataSerializer, SuccessSerializer};

/// Fluent builder producing the serialized body for response data.
pub struct TransformBuilder {
    manager: RelationManager,
    serializer: Box<dyn SuccessSerializer>,
    transformer: Option<Box<dyn Transformer>>,
    transformers: Option<Box<dyn TransformerResolver>>,
    resource: Option<Value>,
    resource_key: Option<String>,
    relations: Vec<String>,
    fields: Vec<String>,
    meta: Map<String, Value>,
}

impl TransformBuilder {
    /// Creates a builder with the data serializer and no relations.
    pub fn new(manager: RelationManager) -> Self {
        Self {
            manager,
            serializer: Box::new(DataSerializer),
            transformer: None,
            transformers: None,
            resource: None,
            resource_key: None,
            relations: Vec::new(),
            fields: Vec::new(),
            meta: Map::new(),
        }
    }

    /// Sets the success serializer.
    pub fn serializer(mut self, serializer: Box<dyn SuccessSerializer>) -> Self {
        self.serializer = serializer;
        self
    }

    /// Adds relations to include.
    pub fn with<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relations.extend(relations.into_iter().map(Into::into));
        self
    }

    /// Adds fields to keep.
    pub fn only<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Sets the data to transform: an object, an array of items, or null.
    pub fn resource(mut self, data: Value) -> Self {
        self.resource = Some(data);
        self
    }

    /// Sets the key the serializer envelopes the data under.
    pub fn resource_key(mut self, key: impl Into<String>) -> Self {
        self.resource_key = Some(key.into());
        self
    }

    /// Sets the transformer applied to each item.
    pub fn transformer(mut self, transformer: Box<dyn Transformer>) -> Self {
        self.transformer = Some(transformer);
        self
    }

    /// Sets the resolver used when no transformer is set.
    pub fn transformers(mut self, resolver: Box<dyn TransformerResolver>) -> Self {
        self.transformers = Some(resolver);
        self
    }

    /// Adds a meta entry.
    pub fn meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    /// Relations requested so far.
    pub fn relations(&self) -> &[String] {
        &self.relations
    }

    /// Fields requested so far.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Name of the configured serializer.
    pub fn serializer_name(&self) -> &'static str {
        self.serializer.name()
    }

    /// Transforms and serializes the resource.
    pub fn transform(self) -> Value {
        let includes = self.manager.parse_includes(&self.relations);
        let fields: Vec<&str> = self.fields.iter().map(String::as_str).collect();
        let key = self.resource_key.as_deref();
        let transformer: Box<dyn Transformer> = match (self.transformer, self.transformers) {
            (Some(transformer), _) => transformer,
            (None, Some(resolver)) => resolver.resolve(key),
            (None, None) => Box::new(JsonTransformer::new()),
        };
        let transformer = transformer.as_ref();

        let shape =
            |item: Value| apply_fields(&transform_item(item, transformer, &includes), &fields);

        let mut body = match self.resource {
            None | Some(Value::Null) => self.serializer.null(),
            Some(Value::Array(items)) => self
                .serializer
                .collection(key, items.into_iter().map(shape).collect()),
            Some(item) => self.serializer.item(key, shape(item)),
        };

        if !self.meta.is_empty() {
            if let Value::Object(envelope) = &mut body {
                envelope.extend(self.serializer.meta(&self.meta));
            }
        }

        body
    }
}

/// Transformer used for relations without a specific one.
struct Passthrough;

impl Transformer for Passthrough {
    fn relations(&self) -> &[String] {
        &[]
    }
}

fn transform_item(value: Value, transformer: &dyn Transformer, includes: &IncludeTree) -> Value {
    let Value::Object(item) = value else {
        return value;
    };

    let mut item = transformer.transform(item);
    for relation in transformer.relations() {
        let Some(related) = item.remove(relation) else {
            continue;
        };
        if let Some(children) = includes.child(relation) {
            let nested = transformer.nested(relation).unwrap_or(&Passthrough);
            item.insert(relation.clone(), transform_related(related, nested, children));
        }
    }

    Value::Object(item)
}

fn transform_related(
    value: Value,
    transformer: &dyn Transformer,
    includes: &IncludeTree,
) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| transform_item(item, transformer, includes))
                .collect(),
        ),
        other => transform_item(other, transformer, includes),
    }
}

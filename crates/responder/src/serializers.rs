//! Success and error serializer contracts.
//!
//! Serializers decide the envelope around response data. Which one is used
//! is a configuration choice (`serializers.success`, `serializers.error`),
//! resolved through [`SerializerRegistry`].

use std::sync::Arc;

use serde_json::{Map, Value, json};

use crate::error::{ResponderError, ResponderResult};
use crate::registry::NamedRegistry;

/// Envelopes successful response data.
pub trait SuccessSerializer: Send + Sync {
    /// Identifier this serializer is registered under.
    fn name(&self) -> &'static str;

    /// Envelopes a single item.
    fn item(&self, resource_key: Option<&str>, data: Value) -> Value;

    /// Envelopes a list of items.
    fn collection(&self, resource_key: Option<&str>, data: Vec<Value>) -> Value;

    /// Envelopes an absent resource.
    fn null(&self) -> Value;

    /// Top-level keys to merge into the envelope for the given meta data.
    fn meta(&self, meta: &Map<String, Value>) -> Map<String, Value>;
}

/// Formats error responses.
pub trait ErrorSerializer: Send + Sync {
    /// Builds the error body.
    fn format(&self, code: Option<&str>, message: Option<&str>, data: Option<&Value>) -> Value;
}

/// Wraps data under a `data` key (or the resource key, when given) and
/// merges meta data at the top level.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataSerializer;

impl SuccessSerializer for DataSerializer {
    fn name(&self) -> &'static str {
        "success"
    }

    fn item(&self, resource_key: Option<&str>, data: Value) -> Value {
        envelope(resource_key, data)
    }

    fn collection(&self, resource_key: Option<&str>, data: Vec<Value>) -> Value {
        envelope(resource_key, Value::Array(data))
    }

    fn null(&self) -> Value {
        json!({ "data": null })
    }

    fn meta(&self, meta: &Map<String, Value>) -> Map<String, Value> {
        meta.clone()
    }
}

fn envelope(resource_key: Option<&str>, data: Value) -> Value {
    let mut body = Map::new();
    body.insert(resource_key.unwrap_or("data").to_string(), data);
    Value::Object(body)
}

/// Returns the data as-is, without an envelope or meta data.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSerializer;

impl SuccessSerializer for NoopSerializer {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn item(&self, _resource_key: Option<&str>, data: Value) -> Value {
        data
    }

    fn collection(&self, _resource_key: Option<&str>, data: Vec<Value>) -> Value {
        Value::Array(data)
    }

    fn null(&self) -> Value {
        Value::Null
    }

    fn meta(&self, _meta: &Map<String, Value>) -> Map<String, Value> {
        Map::new()
    }
}

/// Renders `{"error": {"code": .., "message": .., ...data}}`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardErrorSerializer;

impl ErrorSerializer for StandardErrorSerializer {
    fn format(&self, code: Option<&str>, message: Option<&str>, data: Option<&Value>) -> Value {
        let mut error = Map::new();
        error.insert("code".to_string(), code.map_or(Value::Null, Value::from));
        error.insert("message".to_string(), message.map_or(Value::Null, Value::from));

        match data {
            Some(Value::Object(extra)) => {
                for (key, value) in extra {
                    error.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }
            Some(Value::Null) | None => {}
            Some(other) => {
                error.insert("data".to_string(), other.clone());
            }
        }

        json!({ "error": error })
    }
}

/// Constructs a success serializer.
pub type SuccessConstructor = Arc<dyn Fn() -> Box<dyn SuccessSerializer> + Send + Sync>;

/// Constructs an error serializer.
pub type ErrorConstructor = Arc<dyn Fn() -> Box<dyn ErrorSerializer> + Send + Sync>;

/// Serializers available to configuration, by identifier.
#[derive(Debug, Clone)]
pub struct SerializerRegistry {
    success: NamedRegistry<SuccessConstructor>,
    error: NamedRegistry<ErrorConstructor>,
}

impl SerializerRegistry {
    /// Creates a registry without any serializers.
    pub fn empty() -> Self {
        Self {
            success: NamedRegistry::new("success serializer"),
            error: NamedRegistry::new("error serializer"),
        }
    }

    /// Creates a registry with the built-in serializers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register_success("success", || Box::new(DataSerializer));
        registry.register_success("noop", || Box::new(NoopSerializer));
        registry.register_error("standard", || Box::new(StandardErrorSerializer));
        registry
    }

    /// Registers a success serializer under `identifier`.
    pub fn register_success<F>(&mut self, identifier: impl Into<String>, constructor: F)
    where
        F: Fn() -> Box<dyn SuccessSerializer> + Send + Sync + 'static,
    {
        self.success.insert(identifier, Arc::new(constructor));
    }

    /// Registers an error serializer under `identifier`.
    pub fn register_error<F>(&mut self, identifier: impl Into<String>, constructor: F)
    where
        F: Fn() -> Box<dyn ErrorSerializer> + Send + Sync + 'static,
    {
        self.error.insert(identifier, Arc::new(constructor));
    }

    /// Builds the success serializer registered under `identifier`.
    pub fn make_success(&self, identifier: &str) -> ResponderResult<Box<dyn SuccessSerializer>> {
        let constructor = self.success.get(identifier).ok_or_else(|| {
            ResponderError::UnknownSerializer {
                kind: "success",
                identifier: identifier.to_string(),
            }
        })?;
        Ok(constructor())
    }

    /// Builds the error serializer registered under `identifier`.
    pub fn make_error(&self, identifier: &str) -> ResponderResult<Box<dyn ErrorSerializer>> {
        let constructor = self.error.get(identifier).ok_or_else(|| {
            ResponderError::UnknownSerializer {
                kind: "error",
                identifier: identifier.to_string(),
            }
        })?;
        Ok(constructor())
    }
}

impl Default for SerializerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

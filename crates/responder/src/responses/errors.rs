//! Error body construction.
//!
//! [`ErrorFactory`] combines an error serializer with an
//! [`ErrorMessageResolver`] so callers can respond with just an error code
//! and get the configured message filled in.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::serializers::ErrorSerializer;

/// Looks up the default message for an error code.
pub trait ErrorMessageResolver: Send + Sync {
    /// Returns the message for `code`, if one is known.
    fn resolve(&self, code: &str) -> Option<String>;
}

/// Messages keyed by error code, taken from `responder.error_messages`.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    messages: BTreeMap<String, String>,
}

impl MessageCatalog {
    /// Creates a catalog from configured messages.
    pub fn new(messages: BTreeMap<String, String>) -> Self {
        Self { messages }
    }
}

impl ErrorMessageResolver for MessageCatalog {
    fn resolve(&self, code: &str) -> Option<String> {
        self.messages.get(code).cloned()
    }
}

/// Builds error bodies.
pub trait ErrorFactory: Send + Sync {
    /// Builds an error body with `serializer`.
    fn make(
        &self,
        serializer: &dyn ErrorSerializer,
        code: Option<&str>,
        message: Option<&str>,
        data: Option<&Value>,
    ) -> Value;
}

/// Error factory that falls back to the message resolver when no message is
/// given.
pub struct SerializedErrorFactory {
    messages: Box<dyn ErrorMessageResolver>,
}

impl SerializedErrorFactory {
    /// Creates a factory backed by `messages`.
    pub fn new(messages: Box<dyn ErrorMessageResolver>) -> Self {
        Self { messages }
    }
}

impl ErrorFactory for SerializedErrorFactory {
    fn make(
        &self,
        serializer: &dyn ErrorSerializer,
        code: Option<&str>,
        message: Option<&str>,
        data: Option<&Value>,
    ) -> Value {
        let resolved = match (message, code) {
            (Some(message), _) => Some(message.to_string()),
            (None, Some(code)) => self.messages.resolve(code),
            (None, None) => None,
        };

        serializer.format(code, resolved.as_deref(), data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializers::StandardErrorSerializer;

    fn catalog() -> MessageCatalog {
        let mut messages = BTreeMap::new();
        messages.insert(
            "author_not_found".to_string(),
            "The requested author does not exist.".to_string(),
        );
        MessageCatalog::new(messages)
    }

    #[test]
    fn test_message_resolved_from_code() {
        let factory = SerializedErrorFactory::new(Box::new(catalog()));
        let body = factory.make(&StandardErrorSerializer, Some("author_not_found"), None, None);
        assert_eq!(
            body["error"]["message"],
            "The requested author does not exist."
        );
    }

    #[test]
    fn test_explicit_message_wins() {
        let factory = SerializedErrorFactory::new(Box::new(catalog()));
        let body = factory.make(
            &StandardErrorSerializer,
            Some("author_not_found"),
            Some("Gone fishing."),
            None,
        );
        assert_eq!(body["error"]["message"], "Gone fishing.");
    }

    #[test]
    fn test_unknown_code_has_no_message() {
        let factory = SerializedErrorFactory::new(Box::new(catalog()));
        let body = factory.make(&StandardErrorSerializer, Some("teapot"), None, None);
        assert!(body["error"]["message"].is_null());
    }
}

//! The responder service handlers use to build responses.
//!
//! A [`Responder`] is resolved per request. It bundles the decorated response
//! factory, a transform builder already configured from the request, and the
//! error factory and serializer.
//!
//! ```rust,ignore
//! async fn show(scope: RequestScope) -> ResponderResult<JsonResponse> {
//!     scope
//!         .responder()?
//!         .success(json!({"id": 1, "name": "Ada"}))
//!         .resource_key("author")
//!         .respond(StatusCode::OK)
//! }
//! ```

use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde_json::Value;

use crate::error::ResponderResult;
use crate::responses::{ErrorFactory, JsonResponse, ResponseFactory};
use crate::serializers::{ErrorSerializer, SuccessSerializer};
use crate::transform::{TransformBuilder, Transformer};

/// Builds success and error responses through the configured pipeline.
pub struct Responder {
    factory: Box<dyn ResponseFactory>,
    builder: TransformBuilder,
    error_factory: Box<dyn ErrorFactory>,
    error_serializer: Box<dyn ErrorSerializer>,
}

impl Responder {
    /// Assembles a responder from resolved collaborators.
    pub fn new(
        factory: Box<dyn ResponseFactory>,
        builder: TransformBuilder,
        error_factory: Box<dyn ErrorFactory>,
        error_serializer: Box<dyn ErrorSerializer>,
    ) -> Self {
        Self {
            factory,
            builder,
            error_factory,
            error_serializer,
        }
    }

    /// The response factory chain.
    pub fn factory(&self) -> &dyn ResponseFactory {
        self.factory.as_ref()
    }

    /// Starts a success response for `data`.
    pub fn success(self, data: Value) -> SuccessResponseBuilder {
        SuccessResponseBuilder {
            factory: self.factory,
            builder: self.builder.resource(data),
            headers: HeaderMap::new(),
        }
    }

    /// Starts an error response. Without a message, the message configured
    /// for `code` is used.
    pub fn error(self, code: impl Into<String>, message: Option<String>) -> ErrorResponseBuilder {
        ErrorResponseBuilder {
            factory: self.factory,
            error_factory: self.error_factory,
            error_serializer: self.error_serializer,
            code: code.into(),
            message,
            data: None,
            headers: HeaderMap::new(),
        }
    }
}

/// A success response being built.
pub struct SuccessResponseBuilder {
    factory: Box<dyn ResponseFactory>,
    builder: TransformBuilder,
    headers: HeaderMap,
}

impl SuccessResponseBuilder {
    /// Includes more relations.
    pub fn with<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.builder = self.builder.with(relations);
        self
    }

    /// Keeps only these fields, in addition to any requested ones.
    pub fn only<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.builder = self.builder.only(fields);
        self
    }

    /// Adds a meta entry.
    pub fn meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.builder = self.builder.meta(key, value);
        self
    }

    /// Uses `transformer` for the data.
    pub fn transformer(mut self, transformer: Box<dyn Transformer>) -> Self {
        self.builder = self.builder.transformer(transformer);
        self
    }

    /// Replaces the configured success serializer.
    pub fn serializer(mut self, serializer: Box<dyn SuccessSerializer>) -> Self {
        self.builder = self.builder.serializer(serializer);
        self
    }

    /// Envelopes the data under `key`.
    pub fn resource_key(mut self, key: impl Into<String>) -> Self {
        self.builder = self.builder.resource_key(key);
        self
    }

    /// Adds a response header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Transforms the data and passes it through the factory chain.
    pub fn respond(self, status: StatusCode) -> ResponderResult<JsonResponse> {
        let body = self.builder.transform();
        self.factory.make(body, status, self.headers)
    }
}

/// An error response being built.
pub struct ErrorResponseBuilder {
    factory: Box<dyn ResponseFactory>,
    error_factory: Box<dyn ErrorFactory>,
    error_serializer: Box<dyn ErrorSerializer>,
    code: String,
    message: Option<String>,
    data: Option<Value>,
    headers: HeaderMap,
}

impl ErrorResponseBuilder {
    /// Attaches extra error data.
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Adds a response header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Builds the error body and passes it through the factory chain.
    pub fn respond(self, status: StatusCode) -> ResponderResult<JsonResponse> {
        let body = self.error_factory.make(
            self.error_serializer.as_ref(),
            Some(&self.code),
            self.message.as_deref(),
            self.data.as_ref(),
        );
        self.factory.make(body, status, self.headers)
    }
}

//! The response factory contract and its base implementations.
//!
//! A [`ResponseFactory`] turns response data, a status code and headers into
//! a [`JsonResponse`]. Decorators implement the same trait and wrap exactly
//! one inner factory, so a configured chain can be walked with
//! [`ResponseFactory::inner`] down to the base factory picked for the host.

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::error::{ResponderError, ResponderResult};

/// How a [`JsonResponse`] body is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonEncoding {
    /// Compact, single-line JSON.
    #[default]
    Compact,
    /// Indented JSON.
    Pretty,
}

/// A JSON response that has not been encoded yet.
///
/// Keeping the data structured lets outer decorators still adjust the
/// response after the inner factories built it.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    status: StatusCode,
    headers: HeaderMap,
    data: Value,
    encoding: JsonEncoding,
}

impl JsonResponse {
    /// Creates a compact JSON response.
    pub fn new(data: Value, status: StatusCode, headers: HeaderMap) -> Self {
        Self {
            status,
            headers,
            data,
            encoding: JsonEncoding::Compact,
        }
    }

    /// Switches the body encoding.
    pub fn with_encoding(mut self, encoding: JsonEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Returns the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the response data.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Returns the body encoding.
    pub fn encoding(&self) -> JsonEncoding {
        self.encoding
    }

    /// Encodes the body.
    pub fn body_bytes(&self) -> ResponderResult<Vec<u8>> {
        let bytes = match self.encoding {
            JsonEncoding::Compact => serde_json::to_vec(&self.data)?,
            JsonEncoding::Pretty => serde_json::to_vec_pretty(&self.data)?,
        };
        Ok(bytes)
    }
}

impl IntoResponse for JsonResponse {
    fn into_response(self) -> Response {
        let bytes = match self.body_bytes() {
            Ok(bytes) => bytes,
            Err(err) => return err.into_response(),
        };

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
            .headers_mut()
            .entry(header::CONTENT_TYPE)
            .or_insert(HeaderValue::from_static("application/json"));
        response
    }
}

/// Builds final responses from data, status and headers.
pub trait ResponseFactory: Send + Sync {
    /// Builds a response.
    fn make(
        &self,
        data: Value,
        status: StatusCode,
        headers: HeaderMap,
    ) -> ResponderResult<JsonResponse>;

    /// Short name of this factory, used when describing a chain.
    fn name(&self) -> &'static str;

    /// The factory this one wraps, if it is a decorator.
    fn inner(&self) -> Option<&dyn ResponseFactory> {
        None
    }
}

/// Names of every factory in a chain, outermost first.
pub fn layers(factory: &dyn ResponseFactory) -> Vec<&'static str> {
    let mut names = vec![factory.name()];
    let mut current = factory.inner();
    while let Some(inner) = current {
        names.push(inner.name());
        current = inner.inner();
    }
    names
}

/// Name of the innermost factory in a chain.
pub fn base_name(factory: &dyn ResponseFactory) -> &'static str {
    let mut current = factory;
    while let Some(inner) = current.inner() {
        current = inner;
    }
    current.name()
}

/// Base factory for the full-stack host.
///
/// The full-stack host owns a response builder with its own defaults, so
/// every response leaves with an explicit JSON content type and the headers
/// the caller passed on top of it.
#[derive(Debug, Default, Clone, Copy)]
pub struct FullStackResponseFactory;

impl ResponseFactory for FullStackResponseFactory {
    fn make(
        &self,
        data: Value,
        status: StatusCode,
        headers: HeaderMap,
    ) -> ResponderResult<JsonResponse> {
        let mut merged = HeaderMap::new();
        merged.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        merged.extend(headers);
        Ok(JsonResponse::new(data, status, merged))
    }

    fn name(&self) -> &'static str {
        "full_stack"
    }
}

/// Base factory for the micro host.
///
/// The micro host has no response builder, so the response is constructed
/// directly from the caller's headers. The content type is only filled in
/// when the response is encoded.
#[derive(Debug, Default, Clone, Copy)]
pub struct MicroResponseFactory;

impl ResponseFactory for MicroResponseFactory {
    fn make(
        &self,
        data: Value,
        status: StatusCode,
        headers: HeaderMap,
    ) -> ResponderResult<JsonResponse> {
        if status.is_informational() {
            return Err(ResponderError::config(format!(
                "status {} cannot carry a JSON body",
                status
            )));
        }
        Ok(JsonResponse::new(data, status, headers))
    }

    fn name(&self) -> &'static str {
        "micro"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_stack_sets_content_type() {
        let response = FullStackResponseFactory
            .make(json!({"id": 1}), StatusCode::OK, HeaderMap::new())
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(response.data(), &json!({"id": 1}));
    }

    #[test]
    fn test_full_stack_caller_headers_win() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/vnd.api+json"),
        );
        let response = FullStackResponseFactory
            .make(json!({}), StatusCode::OK, headers)
            .unwrap();

        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/vnd.api+json"
        );
    }

    #[test]
    fn test_micro_keeps_caller_headers() {
        let response = MicroResponseFactory
            .make(json!([1, 2]), StatusCode::CREATED, HeaderMap::new())
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(response.headers().is_empty());
    }

    #[test]
    fn test_micro_rejects_informational_status() {
        let result = MicroResponseFactory.make(json!({}), StatusCode::CONTINUE, HeaderMap::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_body_encoding() {
        let response = JsonResponse::new(json!({"a": 1}), StatusCode::OK, HeaderMap::new());
        assert_eq!(response.body_bytes().unwrap(), br#"{"a":1}"#);

        let pretty = response.with_encoding(JsonEncoding::Pretty);
        let body = String::from_utf8(pretty.body_bytes().unwrap()).unwrap();
        assert!(body.contains('\n'));
    }

    #[test]
    fn test_into_response_adds_content_type() {
        let response =
            JsonResponse::new(json!({}), StatusCode::ACCEPTED, HeaderMap::new()).into_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_layers_of_base_factory() {
        assert_eq!(layers(&MicroResponseFactory), vec!["micro"]);
        assert_eq!(base_name(&FullStackResponseFactory), "full_stack");
    }
}

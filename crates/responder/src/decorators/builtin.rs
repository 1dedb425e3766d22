//! Built-in decorators.

use http::{HeaderMap, StatusCode};
use serde_json::Value;

use crate::error::ResponderResult;
use crate::responses::{JsonEncoding, JsonResponse, ResponseFactory};

/// Adds the numeric `status` to object bodies.
pub struct StatusCodeDecorator {
    inner: Box<dyn ResponseFactory>,
}

impl StatusCodeDecorator {
    /// Wraps `inner`.
    pub fn new(inner: Box<dyn ResponseFactory>) -> Self {
        Self { inner }
    }
}

impl ResponseFactory for StatusCodeDecorator {
    fn make(
        &self,
        mut data: Value,
        status: StatusCode,
        headers: HeaderMap,
    ) -> ResponderResult<JsonResponse> {
        if let Value::Object(body) = &mut data {
            body.insert("status".to_string(), Value::from(status.as_u16()));
        }
        self.inner.make(data, status, headers)
    }

    fn name(&self) -> &'static str {
        "status_code"
    }

    fn inner(&self) -> Option<&dyn ResponseFactory> {
        Some(self.inner.as_ref())
    }
}

/// Adds `success: true|false` to object bodies, based on the status class.
pub struct SuccessFlagDecorator {
    inner: Box<dyn ResponseFactory>,
}

impl SuccessFlagDecorator {
    /// Wraps `inner`.
    pub fn new(inner: Box<dyn ResponseFactory>) -> Self {
        Self { inner }
    }
}

impl ResponseFactory for SuccessFlagDecorator {
    fn make(
        &self,
        mut data: Value,
        status: StatusCode,
        headers: HeaderMap,
    ) -> ResponderResult<JsonResponse> {
        if let Value::Object(body) = &mut data {
            body.insert("success".to_string(), Value::Bool(status.is_success()));
        }
        self.inner.make(data, status, headers)
    }

    fn name(&self) -> &'static str {
        "success_flag"
    }

    fn inner(&self) -> Option<&dyn ResponseFactory> {
        Some(self.inner.as_ref())
    }
}

/// Encodes the finished response as indented JSON.
pub struct PrettyPrintDecorator {
    inner: Box<dyn ResponseFactory>,
}

impl PrettyPrintDecorator {
    /// Wraps `inner`.
    pub fn new(inner: Box<dyn ResponseFactory>) -> Self {
        Self { inner }
    }
}

impl ResponseFactory for PrettyPrintDecorator {
    fn make(
        &self,
        data: Value,
        status: StatusCode,
        headers: HeaderMap,
    ) -> ResponderResult<JsonResponse> {
        let response = self.inner.make(data, status, headers)?;
        Ok(response.with_encoding(JsonEncoding::Pretty))
    }

    fn name(&self) -> &'static str {
        "pretty_print"
    }

    fn inner(&self) -> Option<&dyn ResponseFactory> {
        Some(self.inner.as_ref())
    }
}

/// HTML-escapes every string value in the body.
pub struct EscapeHtmlDecorator {
    inner: Box<dyn ResponseFactory>,
}

impl EscapeHtmlDecorator {
    /// Wraps `inner`.
    pub fn new(inner: Box<dyn ResponseFactory>) -> Self {
        Self { inner }
    }
}

impl ResponseFactory for EscapeHtmlDecorator {
    fn make(
        &self,
        mut data: Value,
        status: StatusCode,
        headers: HeaderMap,
    ) -> ResponderResult<JsonResponse> {
        escape_strings(&mut data);
        self.inner.make(data, status, headers)
    }

    fn name(&self) -> &'static str {
        "escape_html"
    }

    fn inner(&self) -> Option<&dyn ResponseFactory> {
        Some(self.inner.as_ref())
    }
}

fn escape_strings(value: &mut Value) {
    match value {
        Value::String(s) => *s = escape_html(s),
        Value::Array(items) => items.iter_mut().for_each(escape_strings),
        Value::Object(map) => map.values_mut().for_each(escape_strings),
        _ => {}
    }
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

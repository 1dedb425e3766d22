//! Error types for the responder pipeline.
//!
//! Every failure in this crate is a configuration or wiring problem: a
//! contract nobody registered, a host runtime that is not supported, or a
//! configured identifier that does not name anything. None of them are
//! transient, so nothing here is retried.
//!
//! # Error Mapping
//!
//! When an error escapes an HTTP handler it is rendered through
//! [`StandardErrorSerializer`], whatever `serializers.error` names. These
//! errors come from the pipeline itself, including a configured error
//! serializer that does not exist, and rendering has no access to the
//! resolver:
//!
//! | Error | HTTP Status | Error Code |
//! |-------|-------------|------------|
//! | UnregisteredContract | 500 | unregistered_contract |
//! | UnsupportedEnvironment | 500 | unsupported_environment |
//! | InvalidDecorator | 500 | invalid_decorator |
//! | UnknownSerializer | 500 | unknown_serializer |
//! | Config | 500 | invalid_configuration |
//! | Io | 500 | io_error |
//! | Serialization | 500 | serialization_error |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::serializers::{ErrorSerializer, StandardErrorSerializer};

/// The primary error type for resolution, decoration and configuration.
#[derive(Error, Debug)]
pub enum ResponderError {
    /// A contract was resolved before any producer was registered for it.
    #[error("no producer registered for contract `{contract}`")]
    UnregisteredContract {
        /// Type name of the contract.
        contract: String,
    },

    /// The hosting runtime is neither of the supported variants.
    #[error("unsupported host runtime `{runtime}`")]
    UnsupportedEnvironment {
        /// The runtime name reported by the host.
        runtime: String,
    },

    /// A configured decorator identifier does not name a registered wrapper.
    #[error("decorator `{identifier}` is not a registered response factory wrapper")]
    InvalidDecorator {
        /// The configured identifier.
        identifier: String,
    },

    /// A configured serializer identifier does not name a registered serializer.
    #[error("unknown {kind} serializer `{identifier}`")]
    UnknownSerializer {
        /// Which serializer slot was being resolved (`success` or `error`).
        kind: &'static str,
        /// The configured identifier.
        identifier: String,
    },

    /// Configuration is missing or malformed.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },

    /// Reading or publishing a configuration file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A JSON document could not be encoded or decoded.
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl ResponderError {
    /// Builds a [`ResponderError::Config`] from any message.
    pub fn config(message: impl Into<String>) -> Self {
        ResponderError::Config {
            message: message.into(),
        }
    }

    /// Returns the machine-readable error code used in rendered responses.
    pub fn code(&self) -> &'static str {
        match self {
            ResponderError::UnregisteredContract { .. } => "unregistered_contract",
            ResponderError::UnsupportedEnvironment { .. } => "unsupported_environment",
            ResponderError::InvalidDecorator { .. } => "invalid_decorator",
            ResponderError::UnknownSerializer { .. } => "unknown_serializer",
            ResponderError::Config { .. } => "invalid_configuration",
            ResponderError::Io(_) => "io_error",
            ResponderError::Serialization(_) => "serialization_error",
        }
    }
}

impl IntoResponse for ResponderError {
    fn into_response(self) -> Response {
        error!(code = self.code(), error = %self, "Response pipeline failed");

        let message = self.to_string();
        let body = StandardErrorSerializer.format(Some(self.code()), Some(&message), None);
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Result type alias for responder operations.
pub type ResponderResult<T> = Result<T, ResponderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unregistered_contract_display() {
        let err = ResponderError::UnregisteredContract {
            contract: "dyn ResponseFactory".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no producer registered for contract `dyn ResponseFactory`"
        );
        assert_eq!(err.code(), "unregistered_contract");
    }

    #[test]
    fn test_invalid_decorator_display() {
        let err = ResponderError::InvalidDecorator {
            identifier: "cache".to_string(),
        };
        assert!(err.to_string().contains("cache"));
    }

    #[test]
    fn test_unknown_serializer_display() {
        let err = ResponderError::UnknownSerializer {
            kind: "success",
            identifier: "json-api".to_string(),
        };
        assert_eq!(err.to_string(), "unknown success serializer `json-api`");
    }

    #[test]
    fn test_into_response_is_server_error() {
        let err = ResponderError::UnsupportedEnvironment {
            runtime: "cgi".to_string(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_into_response_uses_standard_body() {
        let response = ResponderError::config("recursion_limit must be at least 1").into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["error"]["code"], "invalid_configuration");
        assert_eq!(
            body["error"]["message"],
            "invalid configuration: recursion_limit must be at least 1"
        );
    }
}

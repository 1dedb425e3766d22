//! Configuration for the responder pipeline and its sample server.
//!
//! Two configuration types live here:
//!
//! - [`ResponderConfig`] - the `responder` configuration namespace read by
//!   producers at resolution time (decorators, serializers, query parameter
//!   names, relation recursion limit, error messages).
//! - [`ServerConfig`] - process-level settings for the HTTP server, parsed
//!   from the command line or environment.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RESPONDER_PORT` | 8080 | Server port |
//! | `RESPONDER_HOST` | 127.0.0.1 | Host to bind |
//! | `RESPONDER_LOG_LEVEL` | info | Log level |
//! | `RESPONDER_RUNTIME` | full-stack | Host runtime (full-stack, micro) |
//! | `RESPONDER_CONFIG_DIR` | config | Directory holding `*.json` config files |
//! | `RESPONDER_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `RESPONDER_ENABLE_CORS` | true | Enable CORS |
//! | `RESPONDER_CORS_ORIGINS` | * | Allowed origins |
//!
//! # Example
//!
//! ```rust
//! use responder::ResponderConfig;
//!
//! let config = ResponderConfig {
//!     decorators: vec!["pretty_print".to_string()],
//!     ..Default::default()
//! };
//! assert_eq!(config.load_relations_parameter, "with");
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ResponderResult;

/// Serializer identifiers for the two serializer contracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerConfig {
    /// Identifier of the success serializer (`success`, `noop`).
    pub success: String,
    /// Identifier of the error serializer (`standard`).
    pub error: String,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            success: "success".to_string(),
            error: "standard".to_string(),
        }
    }
}

/// The `responder` configuration namespace.
///
/// Every field has a default, so a partial JSON document deserializes into a
/// complete configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    /// Decorator identifiers, innermost first.
    pub decorators: Vec<String>,

    /// Serializer identifiers.
    pub serializers: SerializerConfig,

    /// Maximum depth of nested relation includes.
    pub recursion_limit: usize,

    /// Query parameter carrying the relations to include.
    pub load_relations_parameter: String,

    /// Query parameter carrying the fields to keep.
    pub filter_fields_parameter: String,

    /// Default messages keyed by error code.
    pub error_messages: BTreeMap<String, String>,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            decorators: vec!["status_code".to_string(), "success_flag".to_string()],
            serializers: SerializerConfig::default(),
            recursion_limit: 5,
            load_relations_parameter: "with".to_string(),
            filter_fields_parameter: "only".to_string(),
            error_messages: BTreeMap::new(),
        }
    }
}

impl ResponderConfig {
    /// Returns the defaults as a JSON document, ready to be merged into a
    /// configuration repository or published to disk.
    pub fn defaults_value() -> ResponderResult<Value> {
        Ok(serde_json::to_value(Self::default())?)
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.recursion_limit == 0 {
            errors.push("Recursion limit cannot be 0".to_string());
        }

        if self.load_relations_parameter.trim().is_empty() {
            errors.push("Load relations parameter cannot be empty".to_string());
        }

        if self.filter_fields_parameter.trim().is_empty() {
            errors.push("Filter fields parameter cannot be empty".to_string());
        }

        if self.load_relations_parameter == self.filter_fields_parameter {
            errors.push(
                "Load relations and filter fields parameters must be different".to_string(),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Server configuration for the sample HTTP server.
#[derive(Debug, Clone, Parser)]
#[command(name = "responder-server")]
#[command(about = "HTTP server wired through the responder pipeline")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "RESPONDER_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "RESPONDER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "RESPONDER_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Host runtime the pipeline is bootstrapped into (full-stack, micro).
    #[arg(long, env = "RESPONDER_RUNTIME", default_value = "full-stack")]
    pub runtime: String,

    /// Directory holding `*.json` configuration files.
    #[arg(long, env = "RESPONDER_CONFIG_DIR", default_value = "config")]
    pub config_dir: PathBuf,

    /// Request timeout in seconds.
    #[arg(long, env = "RESPONDER_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "RESPONDER_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "RESPONDER_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Publish the assets with this tag (e.g. `config`) and exit.
    #[arg(long)]
    pub publish: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            runtime: "full-stack".to_string(),
            config_dir: PathBuf::from("config"),
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            publish: None,
        }
    }
}

impl ServerConfig {
    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns true when the process was started as a console command.
    pub fn running_in_console(&self) -> bool {
        self.publish.is_some()
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.runtime.trim().is_empty() {
            errors.push("Runtime cannot be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    pub fn for_testing() -> Self {
        Self {
            port: 0,
            log_level: "debug".to_string(),
            request_timeout: 5,
            enable_cors: false,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_responder_config() {
        let config = ResponderConfig::default();
        assert_eq!(config.decorators, vec!["status_code", "success_flag"]);
        assert_eq!(config.serializers.success, "success");
        assert_eq!(config.serializers.error, "standard");
        assert_eq!(config.recursion_limit, 5);
        assert_eq!(config.load_relations_parameter, "with");
        assert_eq!(config.filter_fields_parameter, "only");
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let config: ResponderConfig =
            serde_json::from_value(serde_json::json!({ "decorators": [] })).unwrap();
        assert!(config.decorators.is_empty());
        assert_eq!(config.recursion_limit, 5);
        assert_eq!(config.serializers, SerializerConfig::default());
    }

    #[test]
    fn test_validate_same_parameter_names() {
        let config = ResponderConfig {
            filter_fields_parameter: "with".to_string(),
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("must be different")));
    }

    #[test]
    fn test_validate_zero_recursion_limit() {
        let config = ResponderConfig {
            recursion_limit: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            port: 3000,
            host: "0.0.0.0".to_string(),
            ..Default::default()
        };
        assert_eq!(config.socket_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_server_validate_invalid_port() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("Port")));
    }

    #[test]
    fn test_for_testing() {
        let config = ServerConfig::for_testing();
        assert_eq!(config.port, 0);
        assert!(!config.enable_cors);
        assert!(!config.running_in_console());
    }
}

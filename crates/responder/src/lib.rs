//! # responder - Response composition for axum services
//!
//! This crate wires the pieces an HTTP handler needs to turn data into a
//! response: a response factory wrapped in configurable decorators, success
//! and error serializers, a transform builder that applies the request's
//! relation-inclusion and field-filter parameters, and an error factory that
//! fills in configured messages.
//!
//! Every piece is bound to a contract in a [`Resolver`]. Producers are run on
//! each resolution, so configuration and request data flow into every
//! response without anything being cached between requests.
//!
//! ## Host Runtimes
//!
//! The pipeline bootstraps into one of two host runtimes. The runtime is
//! detected once, at startup:
//!
//! | Runtime | Configuration loading | Base response factory |
//! |---------|-----------------------|-----------------------|
//! | `full-stack` | every `*.json` file in the config directory, eagerly | [`responses::FullStackResponseFactory`] |
//! | `micro` | `responder.json` only, when the provider boots | [`responses::MicroResponseFactory`] |
//!
//! Any other runtime fails with [`ResponderError::UnsupportedEnvironment`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use responder::{AppHost, ResponderResult, ResponderState, extractors::RequestScope};
//! use responder::responses::JsonResponse;
//!
//! async fn show(scope: RequestScope) -> ResponderResult<JsonResponse> {
//!     scope
//!         .responder()?
//!         .success(json!({"id": 1, "name": "Ada"}))
//!         .respond(StatusCode::OK)
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut host = AppHost::boot("full-stack", "config")?;
//!     let state = ResponderState::bootstrap(&mut host)?;
//!
//!     let app = Router::new().route("/authors/1", get(show)).with_state(state);
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! The `responder` namespace (`config/responder.json`):
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `decorators` | `["status_code", "success_flag"]` | Decorators, innermost first |
//! | `serializers.success` | `success` | Success serializer (`success`, `noop`) |
//! | `serializers.error` | `standard` | Error serializer |
//! | `recursion_limit` | 5 | Maximum depth of nested includes |
//! | `load_relations_parameter` | `with` | Query parameter listing relations |
//! | `filter_fields_parameter` | `only` | Query parameter listing fields |
//! | `error_messages` | `{}` | Default messages by error code |
//!
//! ## Architecture
//!
//! - [`resolver`] - Contract resolver and resolution scope
//! - [`host`] - Host runtime detection and configuration hooks
//! - [`provider`] - Default producers and configuration boot
//! - [`decorators`] - Decorator registry and chain building
//! - [`request`] - Query parameter extraction
//! - [`transform`] - Transform builder, relations and transformers
//! - [`serializers`] - Success and error serializers
//! - [`responses`] - Response factories, error bodies, field subsetting
//! - [`service`] - The responder service used by handlers
//! - [`extractors`] - Axum extractors
//! - [`state`] - Shared state built at startup

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod decorators;
pub mod error;
pub mod extractors;
pub mod host;
pub mod pagination;
pub mod provider;
pub mod registry;
pub mod repository;
pub mod request;
pub mod resolver;
pub mod responses;
pub mod serializers;
pub mod service;
pub mod state;
pub mod transform;

// Re-export commonly used types
pub use config::{ResponderConfig, SerializerConfig, ServerConfig};
pub use decorators::{DecoratorRegistry, decorate};
pub use error::{ResponderError, ResponderResult};
pub use host::{AppHost, Host, HostVariant};
pub use provider::{CONFIG_NAMESPACE, Publishable, ResponderProvider};
pub use repository::ConfigRepository;
pub use request::{RequestContext, RequestParameters};
pub use resolver::{Resolver, Scope};
pub use responses::{JsonResponse, ResponseFactory};
pub use service::Responder;
pub use state::ResponderState;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Adds the HTTP middleware stack to `router`: request tracing, a request
/// timeout and, when enabled, CORS.
///
/// # Example
///
/// ```rust,ignore
/// let app = apply_http_layers(routes(state), &ServerConfig::default());
/// ```
pub fn apply_http_layers(router: Router, config: &ServerConfig) -> Router {
    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(config.request_timeout),
        ));

    let router = if config.enable_cors {
        router.layer(build_cors_layer(config))
    } else {
        router
    };

    router.layer(service_builder)
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.cors_origins == "*" {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Initializes the tracing subscriber for logging.
///
/// This should be called once at application startup. `RUST_LOG` takes
/// precedence over `level` when set.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "responder={level},responder_server={level},tower_http=debug"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

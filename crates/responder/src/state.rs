//! Shared state for the responder pipeline.
//!
//! [`ResponderState`] is built once at startup by
//! [`ResponderState::bootstrap`]: it detects the host variant, wires every
//! contract, boots the configuration and freezes the result. Handlers get it
//! through axum state and resolve contracts per request.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ResponderConfig;
use crate::error::{ResponderError, ResponderResult};
use crate::host::{Host, HostVariant};
use crate::provider::{CONFIG_NAMESPACE, Publishable, ResponderProvider};
use crate::request::RequestContext;
use crate::resolver::{Resolver, Scope};
use crate::service::Responder;

/// Frozen resolver and configuration, shared by every request.
///
/// # Example
///
/// ```rust
/// use responder::{AppHost, HostVariant, RequestContext, ResponderState};
///
/// let mut host = AppHost::micro("config");
/// let state = ResponderState::bootstrap(&mut host).unwrap();
/// assert_eq!(state.variant(), HostVariant::Micro);
///
/// let request = RequestContext::from_query("with=books");
/// let builder = state.resolve::<responder::transform::TransformBuilder>(&request).unwrap();
/// assert_eq!(builder.relations(), ["books"]);
/// ```
pub struct ResponderState {
    resolver: Arc<Resolver>,
    config: Arc<ResponderConfig>,
    variant: HostVariant,
    publishables: Arc<Vec<Publishable>>,
}

impl Clone for ResponderState {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            config: Arc::clone(&self.config),
            variant: self.variant,
            publishables: Arc::clone(&self.publishables),
        }
    }
}

impl ResponderState {
    /// Bootstraps the pipeline into `host` with the default wiring.
    pub fn bootstrap(host: &mut dyn Host) -> ResponderResult<Self> {
        Self::bootstrap_with(host, |_| {})
    }

    /// Bootstraps the pipeline, letting `customize` add decorators,
    /// serializers or producer overrides before contracts are registered.
    ///
    /// The host variant is detected exactly once, here.
    pub fn bootstrap_with<F>(host: &mut dyn Host, customize: F) -> ResponderResult<Self>
    where
        F: FnOnce(&mut ResponderProvider),
    {
        let variant = HostVariant::detect(host)?;
        info!(variant = %variant, "Detected host runtime");

        let mut provider = ResponderProvider::new(variant);
        customize(&mut provider);

        let mut resolver = Resolver::new();
        provider.register(&mut resolver);
        provider.boot(host)?;

        let config: ResponderConfig = host.config().get(CONFIG_NAMESPACE)?;
        if let Err(errors) = config.validate() {
            for error in &errors {
                warn!(namespace = CONFIG_NAMESPACE, "Invalid configuration: {}", error);
            }
            return Err(ResponderError::config(errors.join("; ")));
        }

        info!(
            decorators = ?config.decorators,
            success_serializer = %config.serializers.success,
            error_serializer = %config.serializers.error,
            contracts = resolver.len(),
            "Responder pipeline ready"
        );

        Ok(Self {
            resolver: Arc::new(resolver),
            config: Arc::new(config),
            variant,
            publishables: Arc::new(provider.publishables().to_vec()),
        })
    }

    /// Replaces the configuration. Used by tests and by hosts that reload
    /// configuration without re-wiring.
    pub fn with_config(mut self, config: ResponderConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// The detected host variant.
    pub fn variant(&self) -> HostVariant {
        self.variant
    }

    /// The `responder` configuration.
    pub fn config(&self) -> &ResponderConfig {
        &self.config
    }

    /// The frozen resolver.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Files recorded for publishing.
    pub fn publishables(&self) -> &[Publishable] {
        &self.publishables
    }

    /// A resolution scope for `request`.
    pub fn scope<'a>(&'a self, request: &'a RequestContext) -> Scope<'a> {
        Scope::new(&self.resolver, &self.config, request)
    }

    /// Resolves contract `C` for `request`.
    pub fn resolve<C: ?Sized + 'static>(
        &self,
        request: &RequestContext,
    ) -> ResponderResult<Box<C>> {
        self.scope(request).resolve::<C>()
    }

    /// Resolves the responder service for `request`.
    pub fn responder(&self, request: &RequestContext) -> ResponderResult<Responder> {
        Ok(*self.resolve::<Responder>(request)?)
    }

    /// Writes every publishable file tagged `tag`. Returns the paths written.
    pub fn publish(&self, tag: &str) -> ResponderResult<Vec<PathBuf>> {
        let mut written = Vec::new();
        for publishable in self.publishables.iter().filter(|p| p.tag == tag) {
            if publishable.write()? {
                written.push(publishable.destination.clone());
            }
        }

        if written.is_empty() {
            warn!(tag, "Nothing published");
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::AppHost;
    use crate::responses::{ResponseFactory, base_name, layers};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_bootstrap_full_stack() {
        let dir = TempDir::new().unwrap();
        let mut host = AppHost::full_stack(dir.path()).unwrap();
        let state = ResponderState::bootstrap(&mut host).unwrap();

        assert_eq!(state.variant(), HostVariant::FullStack);
        assert_eq!(state.config(), &ResponderConfig::default());

        let factory = state
            .resolve::<dyn ResponseFactory>(&RequestContext::empty())
            .unwrap();
        assert_eq!(
            layers(factory.as_ref()),
            vec!["success_flag", "status_code", "full_stack"]
        );
    }

    #[test]
    fn test_bootstrap_unsupported_runtime() {
        let mut host = AppHost::new("serverless", "config");
        match ResponderState::bootstrap(&mut host) {
            Err(ResponderError::UnsupportedEnvironment { runtime }) => {
                assert_eq!(runtime, "serverless");
            }
            Err(other) => panic!("expected UnsupportedEnvironment, got {:?}", other),
            Ok(_) => panic!("expected UnsupportedEnvironment"),
        }
    }

    #[test]
    fn test_bootstrap_rejects_invalid_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("responder.json"), r#"{"recursion_limit": 0}"#).unwrap();
        let mut host = AppHost::micro(dir.path());

        assert!(matches!(
            ResponderState::bootstrap(&mut host),
            Err(ResponderError::Config { .. })
        ));
    }

    #[test]
    fn test_invalid_decorator_fails_on_resolve() {
        let mut host = AppHost::micro("config");
        let state = ResponderState::bootstrap(&mut host).unwrap().with_config(ResponderConfig {
            decorators: vec!["status_code".to_string(), "gzip".to_string()],
            ..Default::default()
        });

        match state.resolve::<dyn ResponseFactory>(&RequestContext::empty()) {
            Err(ResponderError::InvalidDecorator { identifier }) => assert_eq!(identifier, "gzip"),
            Err(other) => panic!("expected InvalidDecorator, got {:?}", other),
            Ok(_) => panic!("expected InvalidDecorator"),
        }
    }

    #[test]
    fn test_no_decorators_yields_base() {
        let mut host = AppHost::micro("config");
        let state = ResponderState::bootstrap(&mut host).unwrap().with_config(ResponderConfig {
            decorators: Vec::new(),
            ..Default::default()
        });

        let factory = state
            .resolve::<dyn ResponseFactory>(&RequestContext::empty())
            .unwrap();
        assert_eq!(layers(factory.as_ref()), vec!["micro"]);
        assert_eq!(base_name(factory.as_ref()), "micro");
    }

    #[test]
    fn test_publish_config() {
        let dir = TempDir::new().unwrap();
        let mut host = AppHost::full_stack(dir.path()).unwrap().with_console(true);
        let state = ResponderState::bootstrap(&mut host).unwrap();

        let written = state.publish("config").unwrap();
        assert_eq!(written, vec![dir.path().join("responder.json")]);
        assert!(state.publish("assets").unwrap().is_empty());
    }
}

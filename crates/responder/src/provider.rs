//! Wiring of every responder contract into a [`Resolver`].
//!
//! [`ResponderProvider`] does two things at startup:
//!
//! 1. **register** binds a producer for each contract. The response factory
//!    producer picks the base factory for the detected [`HostVariant`] and
//!    wraps it in the configured decorators. Every other producer reads only
//!    the [`Scope`] it is given.
//! 2. **boot** loads the `responder` configuration namespace the way the
//!    host runtime expects, then merges the package defaults under it.
//!
//! | Contract | Default producer |
//! |----------|------------------|
//! | `dyn ResponseFactory` | variant base factory, decorated per `decorators` |
//! | `dyn SuccessSerializer` | `serializers.success` from the serializer registry |
//! | `dyn ErrorSerializer` | `serializers.error` from the serializer registry |
//! | `dyn ErrorMessageResolver` | [`MessageCatalog`] over `error_messages` |
//! | `dyn ErrorFactory` | [`SerializedErrorFactory`] |
//! | [`RelationManager`] | `recursion_limit` |
//! | `dyn PaginatorFactory` | [`QueryPaginatorFactory`] over the request query |
//! | `dyn Transformer` | [`JsonTransformer`] without relations |
//! | `dyn TransformerResolver` | registered transformers by resource key, else `dyn Transformer` |
//! | [`TransformBuilder`] | serializer, then `with(relations)`, then `only(fields)` |
//! | [`Responder`] | all of the above |

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::ResponderConfig;
use crate::decorators::{DecoratorRegistry, decorate};
use crate::error::ResponderResult;
use crate::host::{Host, HostVariant};
use crate::pagination::{PaginatorFactory, QueryPaginatorFactory};
use crate::request::RequestParameters;
use crate::resolver::{Resolver, Scope};
use crate::responses::{
    ErrorFactory, ErrorMessageResolver, MessageCatalog, ResponseFactory, SerializedErrorFactory,
};
use crate::serializers::{ErrorSerializer, SerializerRegistry, SuccessSerializer};
use crate::service::Responder;
use crate::transform::{
    JsonTransformer, KeyedTransformerResolver, RelationManager, TransformBuilder, Transformer,
    TransformerRegistry, TransformerResolver,
};

/// Configuration namespace the responder reads.
pub const CONFIG_NAMESPACE: &str = "responder";

/// Tag of the publishable configuration file.
pub const CONFIG_TAG: &str = "config";

type Binding = Box<dyn FnOnce(&mut Resolver) + Send>;

/// A file the package can copy into the host application on request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publishable {
    /// Group the file is published under.
    pub tag: String,
    /// Where the file is written.
    pub destination: PathBuf,
}

impl Publishable {
    /// Writes the default configuration to the destination.
    ///
    /// Existing files are left alone. Returns true if the file was written.
    pub fn write(&self) -> ResponderResult<bool> {
        if self.destination.exists() {
            warn!(path = %self.destination.display(), "Not overwriting existing file");
            return Ok(false);
        }
        if let Some(parent) = self.destination.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(&ResponderConfig::defaults_value()?)?;
        fs::write(&self.destination, contents)?;
        info!(tag = %self.tag, path = %self.destination.display(), "Published");
        Ok(true)
    }
}

/// Registers the responder contracts and boots its configuration.
pub struct ResponderProvider {
    variant: HostVariant,
    decorators: DecoratorRegistry,
    serializers: SerializerRegistry,
    transformers: TransformerRegistry,
    bindings: Vec<Binding>,
    publishables: Vec<Publishable>,
}

impl ResponderProvider {
    /// Creates a provider for the detected host variant, with the built-in
    /// decorators and serializers.
    pub fn new(variant: HostVariant) -> Self {
        Self {
            variant,
            decorators: DecoratorRegistry::with_defaults(),
            serializers: SerializerRegistry::with_defaults(),
            transformers: TransformerRegistry::new(),
            bindings: Vec::new(),
            publishables: Vec::new(),
        }
    }

    /// The host variant this provider wires for.
    pub fn variant(&self) -> HostVariant {
        self.variant
    }

    /// Makes a decorator available to the `decorators` configuration.
    pub fn decorator<F>(&mut self, identifier: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(Box<dyn ResponseFactory>) -> Box<dyn ResponseFactory> + Send + Sync + 'static,
    {
        self.decorators.register(identifier, constructor);
        self
    }

    /// Makes a success serializer available to `serializers.success`.
    pub fn success_serializer<F>(
        &mut self,
        identifier: impl Into<String>,
        constructor: F,
    ) -> &mut Self
    where
        F: Fn() -> Box<dyn SuccessSerializer> + Send + Sync + 'static,
    {
        self.serializers.register_success(identifier, constructor);
        self
    }

    /// Makes an error serializer available to `serializers.error`.
    pub fn error_serializer<F>(
        &mut self,
        identifier: impl Into<String>,
        constructor: F,
    ) -> &mut Self
    where
        F: Fn() -> Box<dyn ErrorSerializer> + Send + Sync + 'static,
    {
        self.serializers.register_error(identifier, constructor);
        self
    }

    /// Uses the transformer built by `constructor` for data with
    /// `resource_key`, unless a handler sets one explicitly.
    pub fn transformer<F>(&mut self, resource_key: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Transformer> + Send + Sync + 'static,
    {
        self.transformers.register(resource_key, constructor);
        self
    }

    /// Binds a producer that replaces the default for contract `C`.
    pub fn bind<C, F>(&mut self, producer: F) -> &mut Self
    where
        C: ?Sized + 'static,
        F: Fn(&Scope<'_>) -> ResponderResult<Box<C>> + Send + Sync + 'static,
    {
        self.bindings.push(Box::new(move |resolver: &mut Resolver| {
            resolver.register::<C, F>(producer);
        }));
        self
    }

    /// Files recorded for publishing during boot.
    pub fn publishables(&self) -> &[Publishable] {
        &self.publishables
    }

    /// Registers every contract, then the producers added with
    /// [`bind`](Self::bind).
    pub fn register(&mut self, resolver: &mut Resolver) {
        let variant = self.variant;
        let decorators = Arc::new(self.decorators.clone());
        resolver.register::<dyn ResponseFactory, _>(move |scope| {
            decorate(
                variant.base_factory(),
                scope.config().decorators.as_slice(),
                &decorators,
            )
        });

        let serializers = Arc::new(self.serializers.clone());
        let success = Arc::clone(&serializers);
        resolver.register::<dyn SuccessSerializer, _>(move |scope| {
            success.make_success(&scope.config().serializers.success)
        });
        resolver.register::<dyn ErrorSerializer, _>(move |scope| {
            serializers.make_error(&scope.config().serializers.error)
        });

        resolver.register::<dyn ErrorMessageResolver, _>(|scope| {
            Ok(Box::new(MessageCatalog::new(
                scope.config().error_messages.clone(),
            )))
        });
        resolver.register::<dyn ErrorFactory, _>(|scope| {
            let messages = scope.resolve::<dyn ErrorMessageResolver>()?;
            Ok(Box::new(SerializedErrorFactory::new(messages)))
        });

        resolver.register::<RelationManager, _>(|scope| {
            Ok(Box::new(RelationManager::new(scope.config().recursion_limit)))
        });
        resolver.register::<dyn PaginatorFactory, _>(|scope| {
            Ok(Box::new(QueryPaginatorFactory::new(scope.request())))
        });
        resolver.register::<dyn Transformer, _>(|_| Ok(Box::new(JsonTransformer::new())));
        let transformers = Arc::new(self.transformers.clone());
        resolver.register::<dyn TransformerResolver, _>(move |scope| {
            Ok(Box::new(KeyedTransformerResolver::new(
                Arc::clone(&transformers),
                scope.resolve::<dyn Transformer>()?,
            )))
        });

        resolver.register::<TransformBuilder, _>(|scope| {
            let manager = scope.resolve::<RelationManager>()?;
            let serializer = scope.resolve::<dyn SuccessSerializer>()?;
            let (relations, fields) =
                RequestParameters::from_config(scope.request(), scope.config()).into_parts();

            Ok(Box::new(
                TransformBuilder::new(*manager)
                    .serializer(serializer)
                    .with(relations)
                    .only(fields)
                    .transformers(scope.resolve::<dyn TransformerResolver>()?),
            ))
        });

        resolver.register::<Responder, _>(|scope| {
            Ok(Box::new(Responder::new(
                scope.resolve::<dyn ResponseFactory>()?,
                *scope.resolve::<TransformBuilder>()?,
                scope.resolve::<dyn ErrorFactory>()?,
                scope.resolve::<dyn ErrorSerializer>()?,
            )))
        });

        let overrides = self.bindings.len();
        for binding in self.bindings.drain(..) {
            binding(resolver);
        }

        debug!(
            variant = %variant,
            contracts = resolver.len(),
            overrides,
            "Registered responder contracts"
        );
    }

    /// Loads and merges the `responder` configuration namespace.
    ///
    /// Micro hosts load `responder.json` on request. Full-stack hosts have
    /// already loaded it; when running as a console command they also get
    /// the configuration file recorded for publishing. Both then merge the
    /// package defaults under whatever was loaded.
    pub fn boot(&mut self, host: &mut dyn Host) -> ResponderResult<()> {
        match self.variant {
            HostVariant::Micro => host.configure(CONFIG_NAMESPACE)?,
            HostVariant::FullStack => {
                if host.running_in_console() {
                    self.publishables.push(Publishable {
                        tag: CONFIG_TAG.to_string(),
                        destination: host
                            .config_dir()
                            .join(format!("{}.json", CONFIG_NAMESPACE)),
                    });
                }
            }
        }

        host.merge_config_from(CONFIG_NAMESPACE, ResponderConfig::defaults_value()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::AppHost;
    use crate::request::RequestContext;
    use crate::responses::base_name;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn resolver_for(variant: HostVariant) -> Resolver {
        let mut resolver = Resolver::new();
        ResponderProvider::new(variant).register(&mut resolver);
        resolver
    }

    #[test]
    fn test_registers_every_contract() {
        let resolver = resolver_for(HostVariant::FullStack);
        assert!(resolver.contains::<dyn ResponseFactory>());
        assert!(resolver.contains::<dyn SuccessSerializer>());
        assert!(resolver.contains::<dyn ErrorSerializer>());
        assert!(resolver.contains::<dyn ErrorMessageResolver>());
        assert!(resolver.contains::<dyn ErrorFactory>());
        assert!(resolver.contains::<RelationManager>());
        assert!(resolver.contains::<dyn PaginatorFactory>());
        assert!(resolver.contains::<dyn Transformer>());
        assert!(resolver.contains::<dyn TransformerResolver>());
        assert!(resolver.contains::<TransformBuilder>());
        assert!(resolver.contains::<Responder>());
    }

    #[test]
    fn test_base_factory_follows_variant() {
        let config = ResponderConfig::default();
        let request = RequestContext::empty();

        let resolver = resolver_for(HostVariant::Micro);
        let scope = Scope::new(&resolver, &config, &request);
        let factory = scope.resolve::<dyn ResponseFactory>().unwrap();
        assert_eq!(base_name(factory.as_ref()), "micro");

        let resolver = resolver_for(HostVariant::FullStack);
        let scope = Scope::new(&resolver, &config, &request);
        let factory = scope.resolve::<dyn ResponseFactory>().unwrap();
        assert_eq!(base_name(factory.as_ref()), "full_stack");
    }

    #[test]
    fn test_transform_builder_reads_request() {
        let resolver = resolver_for(HostVariant::FullStack);
        let config = ResponderConfig::default();
        let request = RequestContext::from_query("with=a,b");
        let scope = Scope::new(&resolver, &config, &request);

        let builder = scope.resolve::<TransformBuilder>().unwrap();
        assert_eq!(builder.relations(), ["a", "b"]);
        assert!(builder.fields().is_empty());
        assert_eq!(builder.serializer_name(), "success");
    }

    #[test]
    fn test_relation_manager_reads_recursion_limit() {
        let resolver = resolver_for(HostVariant::Micro);
        let config = ResponderConfig {
            recursion_limit: 2,
            ..Default::default()
        };
        let request = RequestContext::empty();
        let scope = Scope::new(&resolver, &config, &request);

        let manager = scope.resolve::<RelationManager>().unwrap();
        assert_eq!(manager.recursion_limit(), 2);
    }

    #[test]
    fn test_registered_transformer_follows_resource_key() {
        let mut provider = ResponderProvider::new(HostVariant::Micro);
        provider.transformer("author", || {
            Box::new(JsonTransformer::new().with_relations(["books"]))
        });
        let mut resolver = Resolver::new();
        provider.register(&mut resolver);

        let config = ResponderConfig::default();
        let request = RequestContext::empty();
        let scope = Scope::new(&resolver, &config, &request);
        let author = json!({"id": 1, "books": [{"id": 2}]});

        let body = scope
            .resolve::<TransformBuilder>()
            .unwrap()
            .resource_key("author")
            .resource(author.clone())
            .transform();
        assert_eq!(body, json!({"author": {"id": 1}}));

        let body = scope
            .resolve::<TransformBuilder>()
            .unwrap()
            .resource_key("book")
            .resource(author)
            .transform();
        assert_eq!(body["book"]["books"], json!([{"id": 2}]));
    }

    #[test]
    fn test_unknown_serializer_fails_on_resolve() {
        let resolver = resolver_for(HostVariant::FullStack);
        let mut config = ResponderConfig::default();
        config.serializers.success = "jsonapi".to_string();
        let request = RequestContext::empty();
        let scope = Scope::new(&resolver, &config, &request);

        assert!(scope.resolve::<TransformBuilder>().is_err());
    }

    #[test]
    fn test_bind_overrides_default() {
        struct Upper;
        impl Transformer for Upper {
            fn relations(&self) -> &[String] {
                &[]
            }
            fn transform(
                &self,
                mut item: serde_json::Map<String, serde_json::Value>,
            ) -> serde_json::Map<String, serde_json::Value> {
                item.insert("upper".to_string(), json!(true));
                item
            }
        }

        let mut provider = ResponderProvider::new(HostVariant::FullStack);
        provider.bind::<dyn Transformer, _>(|_| Ok(Box::new(Upper)));
        let mut resolver = Resolver::new();
        provider.register(&mut resolver);

        let config = ResponderConfig::default();
        let request = RequestContext::empty();
        let scope = Scope::new(&resolver, &config, &request);
        let body = scope
            .resolve::<TransformBuilder>()
            .unwrap()
            .resource(json!({"id": 1}))
            .transform();
        assert_eq!(body, json!({"data": {"id": 1, "upper": true}}));
    }

    #[test]
    fn test_micro_boot_configures_namespace() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("responder.json"),
            r#"{"decorators": ["pretty_print"]}"#,
        )
        .unwrap();

        let mut host = AppHost::micro(dir.path());
        let mut provider = ResponderProvider::new(HostVariant::Micro);
        provider.boot(&mut host).unwrap();

        let config: ResponderConfig = host.config().get(CONFIG_NAMESPACE).unwrap();
        assert_eq!(config.decorators, ["pretty_print"]);
        assert_eq!(config.load_relations_parameter, "with");
        assert!(provider.publishables().is_empty());
    }

    #[test]
    fn test_full_stack_console_boot_records_publishable() {
        let dir = TempDir::new().unwrap();
        let mut host = AppHost::full_stack(dir.path()).unwrap().with_console(true);
        let mut provider = ResponderProvider::new(HostVariant::FullStack);
        provider.boot(&mut host).unwrap();

        assert_eq!(provider.publishables().len(), 1);
        let publishable = &provider.publishables()[0];
        assert_eq!(publishable.tag, "config");
        assert_eq!(publishable.destination, dir.path().join("responder.json"));

        assert!(publishable.write().unwrap());
        assert!(!publishable.write().unwrap());
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&publishable.destination).unwrap()).unwrap();
        assert_eq!(written["recursion_limit"], 5);
    }

    #[test]
    fn test_full_stack_boot_without_console() {
        let dir = TempDir::new().unwrap();
        let mut host = AppHost::full_stack(dir.path()).unwrap();
        let mut provider = ResponderProvider::new(HostVariant::FullStack);
        provider.boot(&mut host).unwrap();

        assert!(provider.publishables().is_empty());
        assert!(host.config().has(CONFIG_NAMESPACE));
    }
}

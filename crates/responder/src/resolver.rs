//! The contract resolver.
//!
//! A contract is a type, usually a trait object such as
//! `dyn ResponseFactory`. Each contract has at most one producer: a function
//! of the current [`Scope`] that builds a fresh instance. Producers are only
//! run when their contract is resolved and their results are never cached,
//! so anything derived from the request or the configuration is rebuilt on
//! every resolution.
//!
//! Registration takes `&mut Resolver`; once startup is done the resolver is
//! shared behind an `Arc` and can only be read.
//!
//! # Example
//!
//! ```rust
//! use responder::{RequestContext, ResponderConfig, Resolver, Scope};
//!
//! trait Greeting: Send + Sync {
//!     fn text(&self) -> String;
//! }
//!
//! struct Hello;
//! impl Greeting for Hello {
//!     fn text(&self) -> String {
//!         "hello".to_string()
//!     }
//! }
//!
//! let mut resolver = Resolver::new();
//! resolver.register::<dyn Greeting, _>(|_scope| Ok(Box::new(Hello)));
//!
//! let config = ResponderConfig::default();
//! let request = RequestContext::empty();
//! let scope = Scope::new(&resolver, &config, &request);
//! assert_eq!(scope.resolve::<dyn Greeting>().unwrap().text(), "hello");
//! ```

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;

use tracing::debug;

use crate::config::ResponderConfig;
use crate::error::{ResponderError, ResponderResult};
use crate::request::RequestContext;

/// Builds an instance of contract `C` for a scope.
pub type Producer<C> = Box<dyn Fn(&Scope<'_>) -> ResponderResult<Box<C>> + Send + Sync>;

struct Registration {
    contract: &'static str,
    producer: Box<dyn Any + Send + Sync>,
}

/// Maps contracts to their producers.
#[derive(Default)]
pub struct Resolver {
    producers: HashMap<TypeId, Registration>,
}

impl Resolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the producer for contract `C`, replacing any earlier one.
    pub fn register<C, F>(&mut self, producer: F) -> &mut Self
    where
        C: ?Sized + 'static,
        F: Fn(&Scope<'_>) -> ResponderResult<Box<C>> + Send + Sync + 'static,
    {
        let producer: Producer<C> = Box::new(producer);
        let contract = type_name::<C>();
        let previous = self.producers.insert(
            TypeId::of::<C>(),
            Registration {
                contract,
                producer: Box::new(producer),
            },
        );

        if previous.is_some() {
            debug!(contract, "Replaced producer");
        } else {
            debug!(contract, "Registered producer");
        }
        self
    }

    /// Runs the producer registered for contract `C`.
    ///
    /// Fails with [`ResponderError::UnregisteredContract`] when nothing is
    /// registered for `C`.
    pub fn resolve<C: ?Sized + 'static>(&self, scope: &Scope<'_>) -> ResponderResult<Box<C>> {
        let unregistered = || ResponderError::UnregisteredContract {
            contract: type_name::<C>().to_string(),
        };

        let registration = self.producers.get(&TypeId::of::<C>()).ok_or_else(unregistered)?;
        let producer = registration
            .producer
            .downcast_ref::<Producer<C>>()
            .ok_or_else(unregistered)?;

        producer(scope)
    }

    /// Returns true if a producer is registered for `C`.
    pub fn contains<C: ?Sized + 'static>(&self) -> bool {
        self.producers.contains_key(&TypeId::of::<C>())
    }

    /// Names of the registered contracts, sorted.
    pub fn contracts(&self) -> Vec<&'static str> {
        let mut contracts: Vec<_> = self.producers.values().map(|r| r.contract).collect();
        contracts.sort_unstable();
        contracts
    }

    /// Number of registered contracts.
    pub fn len(&self) -> usize {
        self.producers.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("contracts", &self.contracts())
            .finish()
    }
}

/// Everything a producer may look at: the resolver (to resolve the
/// contracts it depends on), the configuration and the current request.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    resolver: &'a Resolver,
    config: &'a ResponderConfig,
    request: &'a RequestContext,
}

impl<'a> Scope<'a> {
    /// Creates a scope.
    pub fn new(
        resolver: &'a Resolver,
        config: &'a ResponderConfig,
        request: &'a RequestContext,
    ) -> Self {
        Self {
            resolver,
            config,
            request,
        }
    }

    /// Resolves contract `C` within this scope.
    pub fn resolve<C: ?Sized + 'static>(&self) -> ResponderResult<Box<C>> {
        self.resolver.resolve::<C>(self)
    }

    /// The configuration in effect for this scope.
    pub fn config(&self) -> &'a ResponderConfig {
        self.config
    }

    /// The current request.
    pub fn request(&self) -> &'a RequestContext {
        self.request
    }

    /// The resolver this scope resolves through.
    pub fn resolver(&self) -> &'a Resolver {
        self.resolver
    }
}

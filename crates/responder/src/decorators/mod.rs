//! Response factory decorators.
//!
//! A decorator is a [`ResponseFactory`] that wraps exactly one other
//! factory. The configured `decorators` list is folded over the base factory:
//! the first identifier wraps the base directly, the last one ends up
//! outermost and sees every call first.
//!
//! ```text
//! decorators = [status_code, success_flag]
//!
//! success_flag ─▶ status_code ─▶ full_stack
//! ```

mod builtin;

pub use builtin::{
    EscapeHtmlDecorator, PrettyPrintDecorator, StatusCodeDecorator, SuccessFlagDecorator,
};

use std::sync::Arc;

use tracing::debug;

use crate::error::{ResponderError, ResponderResult};
use crate::registry::NamedRegistry;
use crate::responses::ResponseFactory;

/// Wraps an inner factory in a decorator.
pub type DecoratorConstructor =
    Arc<dyn Fn(Box<dyn ResponseFactory>) -> Box<dyn ResponseFactory> + Send + Sync>;

/// Decorators available to configuration, by identifier.
#[derive(Debug, Clone)]
pub struct DecoratorRegistry {
    entries: NamedRegistry<DecoratorConstructor>,
}

impl DecoratorRegistry {
    /// Creates a registry without any decorators.
    pub fn empty() -> Self {
        Self {
            entries: NamedRegistry::new("decorator"),
        }
    }

    /// Creates a registry with the built-in decorators.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register("status_code", |inner| Box::new(StatusCodeDecorator::new(inner)));
        registry.register("success_flag", |inner| Box::new(SuccessFlagDecorator::new(inner)));
        registry.register("pretty_print", |inner| Box::new(PrettyPrintDecorator::new(inner)));
        registry.register("escape_html", |inner| Box::new(EscapeHtmlDecorator::new(inner)));
        registry
    }

    /// Registers a decorator under `identifier`, replacing any previous one.
    pub fn register<F>(&mut self, identifier: impl Into<String>, constructor: F)
    where
        F: Fn(Box<dyn ResponseFactory>) -> Box<dyn ResponseFactory> + Send + Sync + 'static,
    {
        self.entries.insert(identifier, Arc::new(constructor));
    }

    /// Returns true if `identifier` is registered.
    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains(identifier)
    }

    /// Registered identifiers, sorted.
    pub fn identifiers(&self) -> Vec<&str> {
        self.entries.identifiers()
    }

    fn get(&self, identifier: &str) -> Option<&DecoratorConstructor> {
        self.entries.get(identifier)
    }
}

impl Default for DecoratorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Wraps `base` in the decorators named by `identifiers`, in order.
///
/// An empty list returns `base` unchanged. An identifier that is not
/// registered fails the whole chain; it is never skipped.
pub fn decorate<S: AsRef<str>>(
    base: Box<dyn ResponseFactory>,
    identifiers: &[S],
    registry: &DecoratorRegistry,
) -> ResponderResult<Box<dyn ResponseFactory>> {
    identifiers.iter().try_fold(base, |factory, identifier| {
        let identifier = identifier.as_ref();
        let constructor = registry.get(identifier).ok_or_else(|| {
            ResponderError::InvalidDecorator {
                identifier: identifier.to_string(),
            }
        })?;

        debug!(decorator = identifier, wraps = factory.name(), "Applying decorator");
        Ok(constructor(factory))
    })
}

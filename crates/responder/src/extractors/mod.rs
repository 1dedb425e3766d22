//! Axum extractors for the responder pipeline.
//!
//! - [`RequestScope`] - the current request's view of the resolver
//! - [`Included`] - the relations and fields the request asked for

mod parameters;
mod scope;

pub use parameters::Included;
pub use scope::RequestScope;
